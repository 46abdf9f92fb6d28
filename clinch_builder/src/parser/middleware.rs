use std::collections::{HashMap, HashSet};
use std::env;

use crate::api::{
    ArgSpec, CommandParts, CommandSpec, ConverterRegistry, OptionSpec, ParserSpec, PositionalSpec,
};
use crate::matcher::Interpreter;
use crate::model::Range;
use crate::parser::{ConfigError, ParameterError, ParseResult};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Identifies a command node within a [`CommandLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    /// The root command.
    pub fn root() -> Self {
        CommandId(0)
    }

    /// The position in [`CommandLine::commands`] (depth first, in declaration order).
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The position of a parameter within its command, by kind and declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// The n-th declared option.
    Option(usize),
    /// The n-th declared positional parameter.
    Positional(usize),
}

/// Identifies a parameter within a [`CommandLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgId {
    command: CommandId,
    slot: Slot,
}

impl ArgId {
    pub(crate) fn new(command: CommandId, slot: Slot) -> Self {
        Self { command, slot }
    }

    /// The command declaring the parameter.
    pub fn command(&self) -> CommandId {
        self.command
    }

    /// The parameter's position within its command.
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OptionName {
    pub index: usize,
    pub negated: bool,
}

/// A compiled command node.
#[derive(Debug)]
pub struct Command {
    id: CommandId,
    parent: Option<CommandId>,
    name: String,
    aliases: Vec<String>,
    version: Option<String>,
    description: Option<String>,
    options: Vec<OptionSpec>,
    positionals: Vec<PositionalSpec>,
    option_names: HashMap<String, OptionName>,
    subcommands: Vec<CommandId>,
    subcommand_names: HashMap<String, CommandId>,
    parser: ParserSpec,
    converters: ConverterRegistry,
}

impl Command {
    fn compile(id: CommandId, parent: Option<CommandId>, parts: CommandParts) -> Result<Self, ConfigError> {
        let CommandParts {
            name,
            aliases,
            version,
            description,
            mut options,
            mut positionals,
            parser,
            converters,
            ..
        } = parts;

        for option in options.iter_mut() {
            if let Some(error) = option.take_deferred_error() {
                return Err(error);
            }
        }

        for positional in positionals.iter_mut() {
            if let Some(error) = positional.take_deferred_error() {
                return Err(error);
            }
        }

        let case_insensitive = parser.is_options_case_insensitive();
        let mut option_names = HashMap::default();

        for (index, option) in options.iter().enumerate() {
            if option.names().is_empty() {
                return Err(ConfigError::UnnamedOption {
                    command: name.clone(),
                });
            }

            if (option.is_usage_help() || option.is_version_help()) && option.arity_of().max_count() != Some(0) {
                return Err(ConfigError::ValuedHelpOption {
                    command: name.clone(),
                    name: option.longest_name().to_string(),
                });
            }

            let negated_names = option.negated_names();
            let names = option
                .names()
                .iter()
                .map(|n| (n, false))
                .chain(negated_names.iter().map(|n| (n, true)));

            for (option_name, negated) in names {
                if option_name.is_empty() || option_name.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidOptionName {
                        command: name.clone(),
                        name: option_name.clone(),
                    });
                }

                let key = normalize(option_name, case_insensitive);

                if option_names
                    .insert(key, OptionName { index, negated })
                    .is_some()
                {
                    return Err(ConfigError::DuplicateOption {
                        command: name.clone(),
                        name: option_name.clone(),
                    });
                }
            }
        }

        let mut labels = HashSet::new();

        for positional in &positionals {
            if !labels.insert(positional.label()) {
                return Err(ConfigError::DuplicatePositional {
                    command: name.clone(),
                    label: positional.label().to_string(),
                });
            }
        }

        assign_indices(&mut positionals);

        Ok(Self {
            id,
            parent,
            name,
            aliases,
            version,
            description,
            options,
            positionals,
            option_names,
            subcommands: Vec::default(),
            subcommand_names: HashMap::default(),
            parser,
            converters,
        })
    }

    fn register_subcommand(
        &mut self,
        id: CommandId,
        name: &str,
        aliases: &[String],
    ) -> Result<(), ConfigError> {
        let case_insensitive = self.parser.is_subcommands_case_insensitive();

        for subcommand_name in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            if self
                .subcommand_names
                .insert(normalize(subcommand_name, case_insensitive), id)
                .is_some()
            {
                return Err(ConfigError::DuplicateSubcommand {
                    command: self.name.clone(),
                    name: subcommand_name.to_string(),
                });
            }
        }

        self.subcommands.push(id);
        Ok(())
    }

    /// The identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// The command this one is a subcommand of.
    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The options, in declaration order.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// The positional parameters, in declaration order, with their indices resolved.
    pub fn positionals(&self) -> &[PositionalSpec] {
        &self.positionals
    }

    /// The subcommands, in declaration order.
    pub fn subcommands(&self) -> &[CommandId] {
        &self.subcommands
    }

    /// The parser settings.
    pub fn parser(&self) -> &ParserSpec {
        &self.parser
    }

    /// The converters.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// The parameter in `slot`.
    ///
    /// ### Panics
    /// When `slot` is not declared on this command.
    pub fn arg(&self, slot: Slot) -> ArgSpec<'_> {
        match slot {
            Slot::Option(i) => ArgSpec::Option(&self.options[i]),
            Slot::Positional(i) => ArgSpec::Positional(&self.positionals[i]),
        }
    }

    /// Find an option by any of its names (including `--no-` names of negatable options).
    pub fn find_option(&self, name: &str) -> Option<ArgId> {
        self.lookup_option(name)
            .map(|found| ArgId::new(self.id, Slot::Option(found.index)))
    }

    /// Find a positional parameter by its label.
    pub fn find_positional(&self, label: &str) -> Option<ArgId> {
        self.positionals
            .iter()
            .position(|p| p.label() == label)
            .map(|i| ArgId::new(self.id, Slot::Positional(i)))
    }

    /// Find a parameter by an option name, or else a positional label.
    pub fn find_arg(&self, key: &str) -> Option<ArgId> {
        self.find_option(key).or_else(|| self.find_positional(key))
    }

    /// Find a subcommand by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<CommandId> {
        self.subcommand_names
            .get(&normalize(name, self.parser.is_subcommands_case_insensitive()))
            .copied()
    }

    pub(crate) fn lookup_option(&self, name: &str) -> Option<OptionName> {
        self.option_names
            .get(&normalize(name, self.parser.is_options_case_insensitive()))
            .copied()
    }

    /// Every option name (including `--no-` names), in no particular order.
    pub(crate) fn option_names(&self) -> impl Iterator<Item = &str> {
        self.option_names.keys().map(String::as_str)
    }

    /// Every subcommand name and alias, in no particular order.
    pub(crate) fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommand_names.keys().map(String::as_str)
    }
}

fn normalize(name: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    }
}

// Positional parameters without an explicit index follow one another.
fn assign_indices(positionals: &mut [PositionalSpec]) {
    let mut next = 0;

    for positional in positionals.iter_mut() {
        if positional.index_of().is_some() {
            continue;
        }

        let arity = positional.arity_of();
        let index = match arity.max_count() {
            Some(max) => Range::new(next, next.saturating_add(std::cmp::max(max, 1) - 1)),
            None => Range::at_least(next),
        };
        positional.assign_index(index);
        next = next.saturating_add(match arity.max_count() {
            Some(max) => std::cmp::max(max, 1),
            None => std::cmp::max(arity.min_count(), 1),
        });
    }
}

/// A compiled command tree, ready to parse tokens.
///
/// Parsing does not modify the command line, so one `CommandLine` may serve any number of (concurrent) parses.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::{CommandLine, CommandSpec, OptionSpec};
///
/// let command_line = CommandLine::new(
///     CommandSpec::new("program").option(OptionSpec::new(["--count"]).value_type::<u32>()),
/// )
/// .unwrap();
///
/// let result = command_line.parse_tokens(&["--count", "3"]).unwrap();
/// assert_eq!(result.value::<u32>("--count"), Some(3));
///
/// let result = command_line.parse_tokens(&["--count=4"]).unwrap();
/// assert_eq!(result.value::<u32>("--count"), Some(4));
/// ```
#[derive(Debug)]
pub struct CommandLine {
    commands: Vec<Command>,
}

impl CommandLine {
    /// Compile `spec` (and its subcommands).
    /// This finalizes the configuration and checks for errors (ex: a repeated option name).
    pub fn new(spec: CommandSpec) -> Result<Self, ConfigError> {
        let mut commands = Vec::default();
        compile(spec, None, &mut commands)?;
        Ok(Self { commands })
    }

    /// The root command.
    pub fn root(&self) -> &Command {
        &self.commands[0]
    }

    /// The command identified by `id`.
    ///
    /// ### Panics
    /// When `id` belongs to another `CommandLine`.
    pub fn command(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }

    /// The parameter identified by `id`.
    ///
    /// ### Panics
    /// When `id` belongs to another `CommandLine`.
    pub fn arg(&self, id: ArgId) -> ArgSpec<'_> {
        self.command(id.command).arg(id.slot)
    }

    /// Every command, root first.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Parse the `tokens` (not including the program name).
    ///
    /// Parsing runs in the following phases:
    /// 1. `@file` tokens are expanded (per the root command's settings).
    /// 2. Tokens are matched to options, positional parameters, and subcommands, converting values as they are matched.
    /// 3. Required parameters are validated across the matched command chain (unless help was requested).
    /// 4. Default values of parameters which were never matched are converted.
    ///
    /// The first problem aborts the parse.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<ParseResult<'_>, ParameterError> {
        self.parse(tokens.iter())
    }

    /// Parse the `args` (not including the program name).
    /// See [`CommandLine::parse_tokens`].
    pub fn parse<I>(&self, args: I) -> Result<ParseResult<'_>, ParameterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let original: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Parsing {} token(s) for '{}'.", original.len(), self.root().name());
        }

        let states = Interpreter::new(self).run(original.clone())?;
        Ok(ParseResult::assemble(self, states, original))
    }

    /// Parse the Cli [`env::args`] (skipping the program name).
    pub fn parse_env(&self) -> Result<ParseResult<'_>, ParameterError> {
        self.parse(env::args().skip(1))
    }
}

fn compile(
    spec: CommandSpec,
    parent: Option<CommandId>,
    commands: &mut Vec<Command>,
) -> Result<CommandId, ConfigError> {
    let id = CommandId(commands.len());
    let mut parts = spec.into_parts();
    let subcommands = std::mem::take(&mut parts.subcommands);
    let command = Command::compile(id, parent, parts)?;
    commands.push(command);

    for subcommand in subcommands {
        let name = subcommand.name().to_string();
        let aliases = subcommand.aliases().to_vec();
        let child = compile(subcommand, Some(id), commands)?;
        commands[id.0].register_subcommand(child, &name, &aliases)?;
    }

    Ok(id)
}
