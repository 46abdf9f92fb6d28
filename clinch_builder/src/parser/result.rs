use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{ArgSpec, Value};
use crate::matcher::MatchState;
use crate::parser::{ArgId, Command, CommandId, CommandLine, Slot};

/// Everything matched for one parameter during a parse.
#[derive(Debug, Clone)]
pub struct MatchedArg {
    id: ArgId,
    occurrences: usize,
    raw_values: Vec<String>,
    values: Vec<Value>,
}

impl MatchedArg {
    pub(crate) fn new(id: ArgId) -> Self {
        Self {
            id,
            occurrences: 0,
            raw_values: Vec::default(),
            values: Vec::default(),
        }
    }

    pub(crate) fn record_occurrence(&mut self) {
        self.occurrences += 1;
    }

    pub(crate) fn push(&mut self, raw: Option<String>, value: Value) {
        if let Some(raw) = raw {
            self.raw_values.push(raw);
        }

        self.values.push(value);
    }

    pub(crate) fn clear_values(&mut self) {
        self.raw_values.clear();
        self.values.clear();
    }

    /// The parameter.
    pub fn id(&self) -> ArgId {
        self.id
    }

    /// How many times the parameter was matched.
    /// For options, the number of times it appeared; for positional parameters, the number of tokens it took.
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// The value tokens, after quote trimming and splitting, in order.
    /// Flags matched without a value contribute no raw value.
    pub fn raw_values(&self) -> &[String] {
        &self.raw_values
    }

    /// The converted values, in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The last converted value as a `T`.
    pub fn value<T: Any + Clone>(&self) -> Option<T> {
        self.values.last().and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Every converted value which is a `T`.
    pub fn values_as<T: Any + Clone>(&self) -> Vec<T> {
        downcast_all(&self.values)
    }
}

fn downcast_all<T: Any + Clone>(values: &[Value]) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| v.downcast_ref::<T>())
        .cloned()
        .collect()
}

/// The outcome of a successful parse, for one command of the matched chain.
///
/// The result for the root command links to the result of the matched subcommand (if any), and so on.
/// Values are looked up by key: any name of an option, or the label of a positional parameter.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::{CommandSpec, OptionSpec, PositionalSpec};
///
/// let command_line = CommandSpec::new("program")
///     .option(OptionSpec::new(["-n"]).value_type::<u32>().default_value("1"))
///     .option(OptionSpec::new(["-t", "--tag"]).multiple(true))
///     .positional(PositionalSpec::new("FILE").arity("0..*"))
///     .build_parser()
///     .unwrap();
///
/// let result = command_line.parse_tokens(&["-t", "a", "x.txt", "--tag=b", "y.txt"]).unwrap();
/// assert_eq!(result.value::<u32>("-n"), Some(1));
/// assert!(!result.has_matched_option("-n"));
/// assert_eq!(result.values::<String>("--tag"), vec!["a", "b"]);
/// assert_eq!(result.values::<String>("FILE"), vec!["x.txt", "y.txt"]);
/// assert_eq!(result.matched_option("-t").unwrap().occurrences(), 2);
/// ```
#[derive(Debug)]
pub struct ParseResult<'cl> {
    command_line: &'cl CommandLine,
    command: CommandId,
    matched: Vec<MatchedArg>,
    defaults: HashMap<Slot, Vec<Value>>,
    unmatched: Vec<String>,
    usage_help_requested: bool,
    version_help_requested: bool,
    original_args: Arc<[String]>,
    subcommand: Option<Box<ParseResult<'cl>>>,
}

impl<'cl> ParseResult<'cl> {
    pub(crate) fn assemble(
        command_line: &'cl CommandLine,
        states: Vec<MatchState>,
        original_args: Vec<String>,
    ) -> Self {
        let original_args: Arc<[String]> = original_args.into();
        let mut subcommand: Option<Box<ParseResult<'cl>>> = None;

        for state in states.into_iter().rev() {
            let result = ParseResult {
                command_line,
                command: state.command,
                matched: state.matched,
                defaults: state.defaults,
                unmatched: state.unmatched,
                usage_help_requested: state.usage_help_requested,
                version_help_requested: state.version_help_requested,
                original_args: original_args.clone(),
                subcommand: subcommand.take(),
            };
            subcommand = Some(Box::new(result));
        }

        match subcommand {
            Some(root) => *root,
            None => unreachable!("internal error - a parse always matches the root command"),
        }
    }

    /// The command line this result was parsed by.
    pub fn command_line(&self) -> &'cl CommandLine {
        self.command_line
    }

    /// The command this result is for.
    pub fn command(&self) -> &'cl Command {
        self.command_line.command(self.command)
    }

    /// The result of the matched subcommand.
    pub fn subcommand(&self) -> Option<&ParseResult<'cl>> {
        self.subcommand.as_deref()
    }

    /// The result of the deepest matched subcommand (or this result).
    pub fn deepest(&self) -> &ParseResult<'cl> {
        match &self.subcommand {
            Some(subcommand) => subcommand.deepest(),
            None => self,
        }
    }

    /// The chain of matched commands, from this command down to the deepest matched subcommand.
    pub fn command_chain(&self) -> Vec<&'cl Command> {
        let mut chain = vec![self.command()];
        let mut current = self;

        while let Some(subcommand) = current.subcommand() {
            chain.push(subcommand.command());
            current = subcommand;
        }

        chain
    }

    /// The matched options, in order of first match.
    pub fn matched_options(&self) -> impl Iterator<Item = &MatchedArg> {
        self.matched
            .iter()
            .filter(|m| matches!(m.id.slot(), Slot::Option(_)))
    }

    /// The matched positional parameters, in order of first match.
    pub fn matched_positionals(&self) -> impl Iterator<Item = &MatchedArg> {
        self.matched
            .iter()
            .filter(|m| matches!(m.id.slot(), Slot::Positional(_)))
    }

    /// The matched option known by `name`.
    pub fn matched_option(&self, name: &str) -> Option<&MatchedArg> {
        self.command()
            .find_option(name)
            .and_then(|id| self.matched_slot(id.slot()))
    }

    /// The n-th declared positional parameter, if it was matched.
    pub fn matched_positional(&self, index: usize) -> Option<&MatchedArg> {
        self.matched_slot(Slot::Positional(index))
    }

    /// The matched parameter known by `key`.
    pub fn matched(&self, key: &str) -> Option<&MatchedArg> {
        self.command()
            .find_arg(key)
            .and_then(|id| self.matched_slot(id.slot()))
    }

    fn matched_slot(&self, slot: Slot) -> Option<&MatchedArg> {
        self.matched.iter().find(|m| m.id.slot() == slot)
    }

    /// Whether the option known by `name` was matched.
    pub fn has_matched_option(&self, name: &str) -> bool {
        self.matched_option(name).is_some()
    }

    /// Whether the n-th declared positional parameter was matched.
    pub fn has_matched_positional(&self, index: usize) -> bool {
        self.matched_positional(index).is_some()
    }

    /// The parameter known by `key`.
    pub fn arg(&self, key: &str) -> Option<ArgSpec<'cl>> {
        let command = self.command();
        command.find_arg(key).map(|id| command.arg(id.slot()))
    }

    /// The converted default values of the parameter known by `key`, when it was not matched.
    pub fn default_values(&self, key: &str) -> Option<&[Value]> {
        self.command()
            .find_arg(key)
            .and_then(|id| self.defaults.get(&id.slot()))
            .map(Vec::as_slice)
    }

    /// The last value of the parameter known by `key` as a `T`: matched, or else its default.
    pub fn value<T: Any + Clone>(&self, key: &str) -> Option<T> {
        match self.matched(key) {
            Some(matched) => matched.value::<T>(),
            None => self
                .default_values(key)
                .and_then(|values| values.last())
                .and_then(|v| v.downcast_ref::<T>())
                .cloned(),
        }
    }

    /// Every value of the parameter known by `key` as a `T`: matched, or else its default.
    pub fn values<T: Any + Clone>(&self, key: &str) -> Vec<T> {
        match self.matched(key) {
            Some(matched) => matched.values_as::<T>(),
            None => self
                .default_values(key)
                .map(downcast_all::<T>)
                .unwrap_or_default(),
        }
    }

    /// The tokens left unmatched in this command, in their original order.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    /// The tokens given to the parse, before `@file` expansion.
    pub fn original_args(&self) -> &[String] {
        &self.original_args
    }

    /// Whether a usage help option of this command was matched.
    pub fn usage_help_requested(&self) -> bool {
        self.usage_help_requested
    }

    /// Whether a version help option of this command was matched.
    pub fn version_help_requested(&self) -> bool {
        self.version_help_requested
    }

    /// Whether usage or version help was requested by this command or any matched subcommand.
    pub fn is_help_requested(&self) -> bool {
        self.usage_help_requested
            || self.version_help_requested
            || self
                .subcommand
                .as_ref()
                .map(|s| s.is_help_requested())
                .unwrap_or(false)
    }
}
