use clinch::{CommandSpec, OptionSpec, PositionalSpec, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Zstd,
}

impl ValueEnum for Compression {
    fn variants() -> &'static [Self] {
        &[Compression::None, Compression::Gzip, Compression::Zstd]
    }

    fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
        }
    }
}

fn main() {
    let command_line = CommandSpec::new("archive")
        .version("archive 0.3.0")
        .description("Bundle files into (or out of) an archive.")
        .standard_help_options()
        .option(OptionSpec::flag(["-c", "--create"]).description("Create a new archive."))
        .option(OptionSpec::flag(["-x", "--extract"]).description("Extract from an archive."))
        .option(OptionSpec::flag(["-v", "--verbose"]).description("List files as they are processed."))
        .option(
            OptionSpec::new(["-f", "--file"])
                .value_type::<PathBuf>()
                .required(true)
                .description("The archive file."),
        )
        .option(
            OptionSpec::new(["-z", "--compression"])
                .value_enum::<Compression>()
                .default_value("none")
                .description("The compression algorithm."),
        )
        .option(
            OptionSpec::new(["--exclude"])
                .split(",")
                .multiple(true)
                .description("Patterns to skip."),
        )
        .positional(
            PositionalSpec::new("FILE")
                .arity("0..*")
                .value_type::<PathBuf>()
                .description("The files to add."),
        )
        .build();

    // ex: archive -cvf out.tar --exclude=*.o,*.a -z gzip src docs
    let result = match command_line.parse_env() {
        Ok(result) => result,
        Err(error) => {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
    };

    if result.usage_help_requested() {
        println!("usage: archive [-h] [-V] [-cxv] -f=<file> [-z=<compression>] [--exclude=<exclude>] [FILE...]");
        return;
    }

    if result.version_help_requested() {
        println!("{}", result.command().version().unwrap_or_default());
        return;
    }

    let archive: PathBuf = result.value("--file").unwrap_or_default();
    let compression: Compression = result.value("--compression").unwrap_or(Compression::None);
    let files: Vec<PathBuf> = result.values("FILE");
    let excluded: Vec<String> = result.values("--exclude");
    let verbose = result.value::<bool>("--verbose").unwrap_or(false);

    match (result.has_matched_option("-c"), result.has_matched_option("-x")) {
        (true, false) => {
            println!("Creating '{}' ({compression:?}).", archive.display());

            for file in files.iter() {
                if verbose {
                    println!("  {}", file.display());
                }
            }

            if !excluded.is_empty() {
                println!("Excluding: {}", excluded.join(", "));
            }
        }
        (false, true) => {
            println!("Extracting '{}' ({compression:?}).", archive.display());
        }
        _ => {
            eprintln!("Exactly one of '--create' or '--extract' is expected.");
            std::process::exit(1);
        }
    }
}
