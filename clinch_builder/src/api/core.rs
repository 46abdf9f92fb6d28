use std::any::Any;

use crate::api::{
    BoxError, Converter, ConverterRegistry, OptionSpec, ParserSpec, PositionalSpec, ValueEnum,
    ValueType,
};
use crate::constant::{HELP_NAMES, VERSION_NAMES};
use crate::parser::{CommandLine, ConfigError};

/// A node in the command tree: its parameters, parser settings, converters, and subcommands.
///
/// A `CommandSpec` is declarative.
/// Compile it into a [`CommandLine`] (via [`CommandSpec::build_parser`] or [`CommandLine::new`]) to parse tokens.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::{CommandSpec, OptionSpec, PositionalSpec};
///
/// let command_line = CommandSpec::new("copy")
///     .option(OptionSpec::flag(["-r", "--recursive"]))
///     .positional(PositionalSpec::new("SOURCE"))
///     .positional(PositionalSpec::new("TARGET"))
///     .build_parser()
///     .unwrap();
///
/// let result = command_line.parse_tokens(&["-r", "a.txt", "b.txt"]).unwrap();
/// assert!(result.has_matched_option("--recursive"));
/// assert_eq!(result.value::<String>("TARGET").unwrap(), "b.txt");
/// ```
#[derive(Debug, Clone)]
pub struct CommandSpec {
    name: String,
    aliases: Vec<String>,
    version: Option<String>,
    description: Option<String>,
    options: Vec<OptionSpec>,
    positionals: Vec<PositionalSpec>,
    subcommands: Vec<CommandSpec>,
    parser: ParserSpec,
    // The effective converters, and the subset registered directly on this node.
    converters: ConverterRegistry,
    own_converters: ConverterRegistry,
}

impl CommandSpec {
    /// Create a command named `name`, with default [`ParserSpec`] settings and the built-in converters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::default(),
            version: None,
            description: None,
            options: Vec::default(),
            positionals: Vec::default(),
            subcommands: Vec::default(),
            parser: ParserSpec::default(),
            converters: ConverterRegistry::with_builtins(),
            own_converters: ConverterRegistry::empty(),
        }
    }

    /// Add an alternate name, matched like the name itself when this command is a subcommand.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Document the version.
    /// If repeated, only the final version applies.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Document the command.
    /// If repeated, only the final description applies.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Add an option.
    ///
    /// The order of options does not affect matching (options are matched by name).
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add a positional parameter.
    ///
    /// Positional parameters without an explicit index are indexed in the order they are added.
    pub fn positional(mut self, positional: PositionalSpec) -> Self {
        self.positionals.push(positional);
        self
    }

    /// Replace the parser settings of this command.
    ///
    /// Subcommands registered before this call keep the settings they were registered with.
    ///
    /// ### Example
    /// ```
    /// # use clinch_builder as clinch;
    /// use clinch::{CommandSpec, OptionSpec, ParserSpec};
    ///
    /// let command_line = CommandSpec::new("program")
    ///     .subcommand("before", |sub| sub.option(OptionSpec::new(["-x"])))
    ///     .parser(ParserSpec::default().overwritten_options_allowed(true))
    ///     .subcommand("after", |sub| sub.option(OptionSpec::new(["-x"])))
    ///     .build_parser()
    ///     .unwrap();
    ///
    /// assert!(command_line.parse_tokens(&["before", "-x", "1", "-x", "2"]).is_err());
    /// assert!(command_line.parse_tokens(&["after", "-x", "1", "-x", "2"]).is_ok());
    /// ```
    pub fn parser(mut self, parser: ParserSpec) -> Self {
        self.parser = parser;
        self
    }

    /// Register (or replace) the converter for values of type `T` on this command.
    ///
    /// Subcommands registered before this call do not receive it.
    pub fn register_converter<T, E, F>(mut self, function: F) -> Self
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let converter = Converter::new(function);
        self.converters.insert(ValueType::of::<T>(), converter.clone());
        self.own_converters.insert(ValueType::of::<T>(), converter);
        self
    }

    /// Register (or replace) the name matching converter for the enum `T` on this command.
    pub fn register_enum<T: ValueEnum>(mut self) -> Self {
        self.converters.register_enum::<T>();
        self.own_converters.register_enum::<T>();
        self
    }

    /// Add the `-h, --help` (usage help) and `-V, --version` (version help) flags.
    pub fn standard_help_options(self) -> Self {
        self.option(
            OptionSpec::flag(HELP_NAMES)
                .usage_help(true)
                .description("Show this help message and exit."),
        )
        .option(
            OptionSpec::flag(VERSION_NAMES)
                .version_help(true)
                .description("Print version information and exit."),
        )
    }

    /// Add a subcommand named `name`, configured by `setup`.
    ///
    /// The subcommand starts from a copy of this command's current parser settings and converters.
    ///
    /// ### Example
    /// ```
    /// # use clinch_builder as clinch;
    /// use clinch::{CommandSpec, OptionSpec};
    ///
    /// let command_line = CommandSpec::new("git")
    ///     .option(OptionSpec::flag(["-v"]))
    ///     .subcommand("commit", |sub| {
    ///         sub.alias("ci").option(OptionSpec::new(["-m", "--message"]))
    ///     })
    ///     .build_parser()
    ///     .unwrap();
    ///
    /// let result = command_line.parse_tokens(&["-v", "ci", "-m", "fix"]).unwrap();
    /// let commit = result.subcommand().unwrap();
    /// assert_eq!(commit.command().name(), "commit");
    /// assert_eq!(commit.value::<String>("-m").unwrap(), "fix");
    /// ```
    pub fn subcommand<F>(mut self, name: impl Into<String>, setup: F) -> Self
    where
        F: FnOnce(CommandSpec) -> CommandSpec,
    {
        let mut child = CommandSpec::new(name);
        child.parser = self.parser.clone();
        child.converters = self.converters.clone();
        self.subcommands.push(setup(child));
        self
    }

    /// Add a pre-built subcommand.
    ///
    /// Its parser settings are replaced by a copy of this command's current settings.
    /// Converters it registered itself are layered over a copy of this command's converters.
    pub fn add_subcommand(mut self, mut subcommand: CommandSpec) -> Self {
        subcommand.parser = self.parser.clone();
        subcommand.converters = self.converters.clone().overlay(&subcommand.own_converters);
        self.subcommands.push(subcommand);
        self
    }

    /// Compile the command tree.
    /// This finalizes the configuration and checks for errors (ex: a repeated option name).
    pub fn build_parser(self) -> Result<CommandLine, ConfigError> {
        CommandLine::new(self)
    }

    /// Compile the command tree.
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> CommandLine {
        match self.build_parser() {
            Ok(command_line) => command_line,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn into_parts(self) -> CommandParts {
        CommandParts {
            name: self.name,
            aliases: self.aliases,
            version: self.version,
            description: self.description,
            options: self.options,
            positionals: self.positionals,
            subcommands: self.subcommands,
            parser: self.parser,
            converters: self.converters,
        }
    }
}

/// A `CommandSpec` taken apart for compilation.
pub(crate) struct CommandParts {
    pub name: String,
    pub aliases: Vec<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub options: Vec<OptionSpec>,
    pub positionals: Vec<PositionalSpec>,
    pub subcommands: Vec<CommandSpec>,
    pub parser: ParserSpec,
    pub converters: ConverterRegistry,
}
