use clinch::{CommandSpec, OptionSpec, ParameterErrorKind, ParserSpec, PositionalSpec};

fn main() {
    let command_line = CommandSpec::new("vcs")
        .version("vcs 0.3.0")
        .parser(ParserSpec::default().subcommands_case_insensitive(true))
        .standard_help_options()
        .option(
            OptionSpec::new(["-C"])
                .param_label("<path>")
                .description("Run as if started in <path>."),
        )
        .option(
            OptionSpec::flag(["--color"])
                .negatable(true)
                .description("Colour the output."),
        )
        .subcommand("commit", |commit| {
            commit
                .alias("ci")
                .description("Record changes to the repository.")
                .standard_help_options()
                .option(
                    OptionSpec::new(["-m", "--message"])
                        .required(true)
                        .multiple(true),
                )
                .option(OptionSpec::flag(["-a", "--all"]))
                .option(
                    OptionSpec::new(["--author"]).description("Override the commit author."),
                )
        })
        .subcommand("log", |log| {
            log.description("Show commit logs.")
                .standard_help_options()
                .option(
                    OptionSpec::new(["-n", "--max-count"])
                        .value_type::<usize>()
                        .default_value("10"),
                )
                .positional(PositionalSpec::new("REVISION").arity("0..1"))
        })
        .build();

    // ex: vcs --no-color ci -am "first line" -m "second line"
    // ex: vcs @args.txt log -n 3
    let result = match command_line.parse_env() {
        Ok(result) => result,
        Err(error) => {
            match error.kind() {
                ParameterErrorKind::UnmatchedArgument { suggestions, .. } if !suggestions.is_empty() => {
                    eprintln!("{}: {error}", error.command_name());
                }
                _ => eprintln!("Parse error: {error}"),
            }
            std::process::exit(1);
        }
    };

    if result.is_help_requested() {
        let chain: Vec<&str> = result.command_chain().iter().map(|command| command.name()).collect();
        println!("usage: {} [-h] [-V] ...", chain.join(" "));
        return;
    }

    let color = result.value::<bool>("--color").unwrap_or(true);
    println!("color: {color}");

    if let Some(path) = result.value::<String>("-C") {
        println!("working directory: {path}");
    }

    match result.subcommand() {
        Some(sub) if sub.command().name() == "commit" => {
            let message: Vec<String> = sub.values("--message");
            println!("Committing (all={}):", sub.has_matched_option("--all"));

            for line in message {
                println!("  {line}");
            }
        }
        Some(sub) if sub.command().name() == "log" => {
            let count: usize = sub.value("--max-count").unwrap_or(10);
            let revision = sub.value::<String>("REVISION").unwrap_or_else(|| "HEAD".to_string());
            println!("Showing {count} commit(s) from {revision}.");
        }
        _ => {
            println!("Nothing to do.");
        }
    }
}
