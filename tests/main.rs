use clinch::{
    CommandLine, CommandSpec, ConfigError, Error, OptionSpec, ParameterErrorKind, ParserSpec, PositionalSpec,
    Range, Slot,
};
use rstest::rstest;
use std::path::PathBuf;

#[macro_use]
extern crate assert_matches;

fn tar() -> CommandLine {
    CommandSpec::new("tar")
        .option(OptionSpec::flag(["-v", "--verbose"]))
        .option(OptionSpec::flag(["-x"]))
        .option(OptionSpec::new(["-f", "--file"]).value_type::<PathBuf>())
        .positional(PositionalSpec::new("FILE").arity("0..*"))
        .build_parser()
        .unwrap()
}

#[test]
fn builder_compiles() {
    CommandSpec::new("organization").build();
}

#[test]
fn parse_is_repeatable() {
    let command_line = tar();
    let first = command_line.parse_tokens(&["-v", "-f", "a.tar", "b"]).unwrap();
    let second = command_line.parse_tokens(&["b"]).unwrap();

    assert!(first.has_matched_option("-v"));
    assert!(!second.has_matched_option("-v"));
    assert_eq!(first.value::<PathBuf>("-f"), Some(PathBuf::from("a.tar")));
    assert_eq!(second.value::<PathBuf>("-f"), None);
}

#[rstest]
#[case(vec!["-v"])]
#[case(vec!["-f", "a.tar", "x", "y"])]
#[case(vec!["--file=a.tar", "--", "-v"])]
#[case(vec!["-vxf", "a.tar"])]
fn raw_values_round_trip(#[case] tokens: Vec<&str>) {
    let command_line = tar();
    let result = command_line.parse_tokens(&tokens).unwrap();
    let replay: Vec<String> = result
        .matched_options()
        .flat_map(|matched| {
            let name = command_line.arg(matched.id()).names()[0].to_string();
            std::iter::once(name).chain(matched.raw_values().iter().cloned())
        })
        .chain(std::iter::once("--".to_string()))
        .chain(result.matched_positionals().flat_map(|matched| matched.raw_values().to_vec()))
        .collect();

    let again = command_line.parse(&replay).unwrap();

    for matched in result.matched_options().chain(result.matched_positionals()) {
        let key = command_line.arg(matched.id()).display_name();
        assert_eq!(again.matched(key).unwrap().raw_values(), matched.raw_values());
    }
}

#[test]
fn unmatched_idempotence() {
    let command_line = CommandSpec::new("program")
        .parser(ParserSpec::default().unmatched_arguments_allowed(true))
        .option(OptionSpec::flag(["-v"]))
        .build_parser()
        .unwrap();

    let result = command_line.parse_tokens(&["-v", "--what", "x", "-q"]).unwrap();
    assert_eq!(result.unmatched(), ["--what", "x", "-q"]);

    let again = command_line.parse(result.unmatched()).unwrap();
    assert_eq!(again.unmatched(), result.unmatched());
    assert_eq!(again.matched_options().count(), 0);
}

#[rstest]
#[case("2", 2)]
#[case("1..3", 1)]
#[case("1..3", 3)]
#[case("0..*", 0)]
#[case("0..*", 5)]
fn arity_enforced(#[case] arity: &str, #[case] count: usize) {
    let command_line = CommandSpec::new("program")
        .option(OptionSpec::new(["-p"]).arity(arity))
        .build_parser()
        .unwrap();
    let values: Vec<String> = (0..count).map(|i| i.to_string()).collect();
    let mut tokens = vec!["-p".to_string()];
    tokens.extend(values.iter().cloned());

    let result = command_line.parse(&tokens).unwrap();

    let matched = result.matched_option("-p").unwrap();
    assert!(Range::parse(arity).unwrap().contains(matched.raw_values().len()));
    assert_eq!(matched.raw_values(), values);
}

#[rstest]
#[case("2", 1)]
#[case("1..3", 0)]
#[case("3..*", 2)]
fn arity_too_few(#[case] arity: &str, #[case] count: usize) {
    let command_line = CommandSpec::new("program")
        .option(OptionSpec::new(["-p"]).arity(arity))
        .build_parser()
        .unwrap();
    let mut tokens = vec!["-p".to_string()];
    tokens.extend((0..count).map(|i| i.to_string()));

    let error = command_line.parse(&tokens).unwrap_err();

    assert_matches!(
        error.into_kind(),
        ParameterErrorKind::MissingParameter { missing } if missing.len() == 1 && missing[0].name == "-p"
    );
}

#[test]
fn cluster_with_attached_value() {
    let command_line = tar();
    let result = command_line.parse_tokens(&["-vxf=out.txt"]).unwrap();

    assert_eq!(result.value::<bool>("-v"), Some(true));
    assert_eq!(result.value::<bool>("-x"), Some(true));
    assert_eq!(result.value::<PathBuf>("--file"), Some(PathBuf::from("out.txt")));
}

#[rstest]
#[case(false, None)]
#[case(true, Some("b"))]
fn overwrite_policy(#[case] allowed: bool, #[case] expected: Option<&str>) {
    let command_line = CommandSpec::new("program")
        .parser(ParserSpec::default().overwritten_options_allowed(allowed))
        .option(OptionSpec::new(["--name"]))
        .build_parser()
        .unwrap();

    let result = command_line.parse_tokens(&["--name", "a", "--name=b"]);

    match expected {
        Some(expected) => assert_eq!(result.unwrap().value::<String>("--name").unwrap(), expected),
        None => {
            let error = result.unwrap_err();
            assert_eq!(error.to_string(), "option '--name' should be specified only once.");
        }
    }
}

#[test]
fn end_of_options() {
    let command_line = tar();
    let result = command_line.parse_tokens(&["-v", "--", "-x"]).unwrap();

    assert!(result.has_matched_option("-v"));
    assert!(!result.has_matched_option("-x"));
    assert_eq!(result.values::<String>("FILE"), vec!["-x"]);
}

#[test]
fn missing_aggregated() {
    let command_line = CommandSpec::new("program")
        .option(OptionSpec::new(["--a"]).required(true))
        .option(OptionSpec::new(["--b"]).required(true))
        .option(OptionSpec::new(["--c"]))
        .build_parser()
        .unwrap();

    let error = command_line.parse_tokens(&["--c", "x"]).unwrap_err();

    assert_eq!(error.to_string(), "missing required parameters: '--a', '--b'");
    assert_matches!(error.into_kind(), ParameterErrorKind::MissingParameter { missing } if missing.len() == 2);
}

#[test]
fn subcommand_dispatch() {
    let command_line = CommandSpec::new("program")
        .option(OptionSpec::new(["--opt1"]))
        .subcommand("sub", |sub| sub.option(OptionSpec::new(["--opt2"])))
        .build_parser()
        .unwrap();

    let result = command_line
        .parse_tokens(&["--opt1", "val1", "sub", "--opt2", "val2"])
        .unwrap();

    let chain: Vec<&str> = result.command_chain().iter().map(|c| c.name()).collect();
    assert_eq!(chain, vec!["program", "sub"]);
    assert_eq!(result.value::<String>("--opt1").unwrap(), "val1");
    let sub = result.subcommand().unwrap();
    assert_eq!(sub.value::<String>("--opt2").unwrap(), "val2");
    assert_eq!(result.deepest().command().name(), "sub");
    assert_eq!(sub.original_args(), result.original_args());
}

#[test]
fn nested_subcommands() {
    let command_line = CommandSpec::new("cloud")
        .subcommand("compute", |compute| {
            compute.subcommand("instances", |instances| {
                instances.subcommand("list", |list| list.option(OptionSpec::new(["--zone"])))
            })
        })
        .build_parser()
        .unwrap();

    let result = command_line
        .parse_tokens(&["compute", "instances", "list", "--zone", "eu"])
        .unwrap();

    assert_eq!(result.command_chain().len(), 4);
    assert_eq!(result.deepest().value::<String>("--zone").unwrap(), "eu");
    let ids: Vec<usize> = command_line.commands().map(|c| c.id().index()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn help_requested() {
    let command_line = CommandSpec::new("program")
        .version("1.2.3")
        .standard_help_options()
        .positional(PositionalSpec::new("FILE"))
        .build_parser()
        .unwrap();

    assert!(command_line.parse_tokens(&[]).is_err());

    let result = command_line.parse_tokens(&["--help"]).unwrap();
    assert!(result.usage_help_requested());
    assert!(!result.version_help_requested());

    let result = command_line.parse_tokens(&["-V"]).unwrap();
    assert!(result.version_help_requested());
    assert_eq!(result.command().version(), Some("1.2.3"));
}

#[test]
fn negatable_and_defaults() {
    let command_line = CommandSpec::new("program")
        .option(OptionSpec::flag(["--cache"]).negatable(true))
        .option(OptionSpec::new(["--jobs", "-j"]).value_type::<u16>().default_value("4"))
        .build_parser()
        .unwrap();

    let result = command_line.parse_tokens(&["--no-cache"]).unwrap();
    assert_eq!(result.value::<bool>("--cache"), Some(false));
    assert_eq!(result.value::<u16>("-j"), Some(4));
    assert!(!result.has_matched_option("--jobs"));

    let result = command_line.parse_tokens(&["-j", "8"]).unwrap();
    assert_eq!(result.value::<bool>("--cache"), None);
    assert_eq!(result.value::<u16>("--jobs"), Some(8));
}

#[test]
fn conversion_error() {
    let command_line = CommandSpec::new("program")
        .positional(PositionalSpec::new("COUNT").value_type::<u32>())
        .build_parser()
        .unwrap();

    let error = command_line.parse_tokens(&["many"]).unwrap_err();

    assert!(error.to_string().starts_with("invalid value for 'COUNT': cannot convert 'many' to u32"));
    assert_matches!(
        error.kind(),
        ParameterErrorKind::TypeConversion { arg, .. } if arg.slot() == Slot::Positional(0)
    );
}

#[test]
fn at_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("args");
    std::fs::write(&path, "# build flags\n-v\n--file 'my archive.tar'\n").unwrap();
    let at = format!("@{}", path.display());
    let command_line = tar();

    let result = command_line.parse_tokens(&[&at, "@@literal"]).unwrap();

    assert!(result.has_matched_option("-v"));
    assert_eq!(result.value::<PathBuf>("-f"), Some(PathBuf::from("my archive.tar")));
    assert_eq!(result.values::<String>("FILE"), vec!["@literal"]);
}

#[test]
fn config_errors() {
    let duplicate = CommandSpec::new("program")
        .option(OptionSpec::new(["-a"]))
        .option(OptionSpec::flag(["-a"]))
        .build_parser();
    assert_matches!(duplicate, Err(ConfigError::DuplicateOption { name, .. }) if name == "-a");

    let arity = CommandSpec::new("program")
        .option(OptionSpec::new(["-a"]).arity("3..1"))
        .build_parser();
    assert_matches!(arity, Err(ConfigError::Format(_)));

    let error: Error = CommandSpec::new("program")
        .subcommand("x", |sub| sub)
        .subcommand("x", |sub| sub)
        .build_parser()
        .unwrap_err()
        .into();
    assert_matches!(error, Error::Config(ConfigError::DuplicateSubcommand { .. }));
}
