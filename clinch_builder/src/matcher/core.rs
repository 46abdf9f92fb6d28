use crate::api::{ArgSpec, ParserSpec, Value};
use crate::matcher::at_file;
use crate::matcher::cluster::{self, ClusterError, Piece};
use crate::matcher::model::{split_value, trim_quotes, MatchState, ValueBuffer};
use crate::matcher::suggest;
use crate::parser::{
    ArgId, Command, CommandId, CommandLine, Missing, ParameterError, ParameterErrorKind, Slot,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum OptionMatch {
    Single {
        index: usize,
        negated: bool,
        attached: Option<String>,
    },
    Cluster(Vec<Piece>),
}

/// Matches tokens against a [`CommandLine`], one token at a time.
///
/// The matched state of each command in the chain lives in the interpreter (never in the command line).
#[derive(Debug)]
pub(crate) struct Interpreter<'cl> {
    command_line: &'cl CommandLine,
    tokens: Vec<String>,
    cursor: usize,
    chain: Vec<MatchState>,
    end_of_options: bool,
}

impl<'cl> Interpreter<'cl> {
    pub(crate) fn new(command_line: &'cl CommandLine) -> Self {
        Self {
            command_line,
            tokens: Vec::default(),
            cursor: 0,
            chain: vec![MatchState::new(CommandId::root())],
            end_of_options: false,
        }
    }

    /// Interpret `args`, producing the match state of every command in the matched chain (root first).
    pub(crate) fn run(mut self, args: Vec<String>) -> Result<Vec<MatchState>, ParameterError> {
        let root = self.command_line.root();
        self.tokens = if root.parser().is_expand_at_files() {
            at_file::expand(args, root.parser()).map_err(|kind| error_in(root, kind))?
        } else {
            args
        };

        while self.cursor < self.tokens.len() {
            let token = self.tokens[self.cursor].clone();
            self.cursor += 1;
            self.step(token)?;
        }

        self.validate()?;
        self.apply_defaults()?;
        Ok(self.chain)
    }

    fn current(&self) -> &'cl Command {
        self.command_line.command(self.state().command)
    }

    fn state(&self) -> &MatchState {
        match self.chain.last() {
            Some(state) => state,
            None => unreachable!("internal error - the chain always holds the root command"),
        }
    }

    fn state_mut(&mut self) -> &mut MatchState {
        match self.chain.last_mut() {
            Some(state) => state,
            None => unreachable!("internal error - the chain always holds the root command"),
        }
    }

    fn error(&self, kind: ParameterErrorKind) -> ParameterError {
        error_in(self.current(), kind)
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.cursor).map(String::as_str)
    }

    fn step(&mut self, token: String) -> Result<(), ParameterError> {
        let command = self.current();
        let parser = command.parser();

        if !self.end_of_options && token == parser.end_of_options_delimiter_str() {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Token '{token}' ends the options of '{}'.", command.name());
            }

            self.end_of_options = true;
            return Ok(());
        }

        if !self.end_of_options {
            match self.resolve_option(command, &token)? {
                Some(OptionMatch::Single {
                    index,
                    negated,
                    attached,
                }) => return self.match_option(index, negated, attached),
                Some(OptionMatch::Cluster(pieces)) => return self.match_cluster(pieces),
                None => {}
            }

            if resembles_option(&token) && !parser.is_unmatched_options_are_positional_params() {
                return self.unmatched(token);
            }

            if let Some(subcommand) = command.find_subcommand(&token) {
                if !self.positional_needs_value() {
                    self.descend(subcommand);
                    return Ok(());
                }
            }
        }

        self.match_positional(token)
    }

    // Exact name, then the name before the separator, then a cluster of short options.
    fn resolve_option(
        &self,
        command: &'cl Command,
        token: &str,
    ) -> Result<Option<OptionMatch>, ParameterError> {
        if let Some(found) = command.lookup_option(token) {
            return Ok(Some(OptionMatch::Single {
                index: found.index,
                negated: found.negated,
                attached: None,
            }));
        }

        let separator = command.parser().separator_str();

        if !separator.is_empty() {
            if let Some((name, value)) = token.split_once(separator) {
                if let Some(found) = command.lookup_option(name) {
                    return Ok(Some(OptionMatch::Single {
                        index: found.index,
                        negated: found.negated,
                        attached: Some(value.to_string()),
                    }));
                }
            }
        }

        match decompose_cluster(command, token) {
            Ok(Some(pieces)) => Ok(Some(OptionMatch::Cluster(pieces))),
            Ok(None) => Ok(None),
            Err(ClusterError::UnexpectedValue { option, value }) => {
                Err(self.error(ParameterErrorKind::UnexpectedValue {
                    arg: ArgId::new(command.id(), Slot::Option(option)),
                    name: command.options()[option].longest_name().to_string(),
                    value,
                }))
            }
        }
    }

    fn is_option_name(&self, command: &Command, token: &str) -> bool {
        if command.lookup_option(token).is_some() {
            return true;
        }

        let separator = command.parser().separator_str();
        let attached = !separator.is_empty()
            && token
                .split_once(separator)
                .map(|(name, _)| command.lookup_option(name).is_some())
                .unwrap_or(false);

        attached || !matches!(decompose_cluster(command, token), Ok(None))
    }

    fn accepts_required(&self, command: &Command, token: &str) -> bool {
        let parser = command.parser();
        token != parser.end_of_options_delimiter_str()
            && (parser.is_allow_options_as_option_parameters() || !self.is_option_name(command, token))
    }

    fn accepts_optional(&self, command: &Command, token: &str) -> bool {
        token != command.parser().end_of_options_delimiter_str()
            && !self.is_option_name(command, token)
            && !resembles_option(token)
            && command.find_subcommand(token).is_none()
    }

    fn match_option(
        &mut self,
        index: usize,
        negated: bool,
        attached: Option<String>,
    ) -> Result<(), ParameterError> {
        let command = self.current();
        let option = &command.options()[index];
        let id = ArgId::new(command.id(), Slot::Option(index));
        let arity = option.arity_of();
        let has_attached = attached.is_some();
        let mut buffer = ValueBuffer::new(arity);

        if let Some(value) = attached {
            if arity.max_count() == Some(0) {
                return Err(self.error(ParameterErrorKind::UnexpectedValue {
                    arg: id,
                    name: option.longest_name().to_string(),
                    value,
                }));
            }

            buffer.push(value);
        }

        while buffer.needs_more() {
            match self.peek() {
                Some(next) if self.accepts_required(command, next) => {
                    let value = next.to_string();
                    self.cursor += 1;
                    buffer.push(value);
                }
                _ => {
                    return Err(self.error(ParameterErrorKind::MissingParameter {
                        missing: vec![Missing {
                            arg: id,
                            name: option.longest_name().to_string(),
                        }],
                    }));
                }
            }
        }

        // An attached value ends the occurrence; only required values follow it.
        if !has_attached {
            while buffer.is_open() {
                match self.peek() {
                    Some(next) if self.accepts_optional(command, next) => {
                        let value = next.to_string();
                        self.cursor += 1;
                        buffer.push(value);
                    }
                    _ => break,
                }
            }
        }

        let raw = match buffer.close() {
            Ok(raw) => raw,
            Err(error) => unreachable!("internal error - the buffer is filled within its arity: {error}"),
        };
        self.record_option(index, negated, raw)
    }

    fn match_cluster(&mut self, pieces: Vec<Piece>) -> Result<(), ParameterError> {
        for piece in pieces {
            match piece {
                Piece::Present(index) => self.record_option(index, false, Vec::default())?,
                Piece::Attached(index, value) => self.match_option(index, false, Some(value))?,
                Piece::Trailing(index) => self.match_option(index, false, None)?,
            }
        }

        Ok(())
    }

    fn record_option(
        &mut self,
        index: usize,
        negated: bool,
        raw: Vec<String>,
    ) -> Result<(), ParameterError> {
        let command = self.current();
        let parser = command.parser();
        let option = &command.options()[index];
        let spec = ArgSpec::Option(option);
        let slot = Slot::Option(index);
        let id = ArgId::new(command.id(), slot);
        let mut values: Vec<(Option<String>, Value)> = Vec::default();

        if raw.is_empty() {
            match option.fallback_value_str() {
                Some(fallback) => {
                    for piece in prepare(fallback, spec, parser) {
                        let value = convert(command, spec, id, &piece)?;
                        values.push((None, negate(value, negated)));
                    }
                }
                None if option.value_type_of().is::<bool>() => {
                    values.push((None, Value::new(!negated)));
                }
                None => {}
            }
        } else {
            for token in &raw {
                for piece in prepare(token, spec, parser) {
                    let value = convert(command, spec, id, &piece)?;
                    values.push((Some(piece), negate(value, negated)));
                }
            }
        }

        let accumulates = option.is_multiple() || option.arity_of().max_count().map_or(true, |max| max > 1);

        if self.state().occurrences(slot) > 0 && !accumulates && !parser.is_overwritten_options_allowed() {
            return Err(self.error(ParameterErrorKind::OverwrittenOption {
                arg: id,
                name: option.longest_name().to_string(),
            }));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Matched option '{}' of '{}' with {} value(s).",
                option.longest_name(),
                command.name(),
                values.len()
            );
        }

        let state = self.state_mut();
        let entry = state.entry(slot);

        if entry.occurrences() > 0 && !accumulates {
            entry.clear_values();
        }

        entry.record_occurrence();

        for (raw, value) in values {
            entry.push(raw, value);
        }

        if option.is_usage_help() {
            state.usage_help_requested = true;
        }

        if option.is_version_help() {
            state.version_help_requested = true;
        }

        Ok(())
    }

    // The last declared positional parameter which claims the cursor and still has room.
    fn claim_positional(&self, command: &Command) -> Option<usize> {
        let state = self.state();
        let cursor = state.positional_cursor;
        command
            .positionals()
            .iter()
            .enumerate()
            .rev()
            .find(|(i, positional)| {
                positional.index_of().map_or(false, |index| index.contains(cursor))
                    && positional
                        .arity_of()
                        .allows_more(state.occurrences(Slot::Positional(*i)))
            })
            .map(|(i, _)| i)
    }

    // Whether a positional parameter at the cursor still needs values to satisfy its arity.
    fn positional_needs_value(&self) -> bool {
        let command = self.current();
        let state = self.state();
        let cursor = state.positional_cursor;
        command.positionals().iter().enumerate().any(|(i, positional)| {
            positional.index_of().map_or(false, |index| index.contains(cursor))
                && state.occurrences(Slot::Positional(i)) < positional.arity_of().min_count()
        })
    }

    fn match_positional(&mut self, token: String) -> Result<(), ParameterError> {
        let command = self.current();
        let index = match self.claim_positional(command) {
            Some(index) => index,
            None => return self.unmatched(token),
        };
        let parser = command.parser();
        let positional = &command.positionals()[index];
        let spec = ArgSpec::Positional(positional);
        let slot = Slot::Positional(index);
        let id = ArgId::new(command.id(), slot);
        let mut values = Vec::default();

        for piece in prepare(&token, spec, parser) {
            let value = convert(command, spec, id, &piece)?;
            values.push((piece, value));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Matched positional '{}' of '{}' with '{token}'.",
                positional.label(),
                command.name()
            );
        }

        let state = self.state_mut();
        let entry = state.entry(slot);
        entry.record_occurrence();

        for (raw, value) in values {
            entry.push(Some(raw), value);
        }

        state.positional_cursor += 1;

        if parser.is_stop_at_positional() {
            self.end_of_options = true;
        }

        Ok(())
    }

    fn descend(&mut self, subcommand: CommandId) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Descending from '{}' into subcommand '{}'.",
                self.current().name(),
                self.command_line.command(subcommand).name()
            );
        }

        self.chain.push(MatchState::new(subcommand));
    }

    fn unmatched(&mut self, token: String) -> Result<(), ParameterError> {
        let command = self.current();
        let parser = command.parser();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Token '{token}' is unmatched in '{}'.", command.name());
        }

        if parser.is_stop_at_unmatched() {
            let rest: Vec<String> = self.tokens.drain(self.cursor..).collect();
            let state = self.state_mut();
            state.unmatched.push(token);
            state.unmatched.extend(rest);
            Ok(())
        } else if parser.is_unmatched_arguments_allowed() {
            self.state_mut().unmatched.push(token);
            Ok(())
        } else {
            let suggestions = suggestions(command, &token);
            let mut unmatched = vec![token];
            unmatched.extend(self.tokens[self.cursor..].iter().cloned());
            Err(self.error(ParameterErrorKind::UnmatchedArgument {
                index: self.cursor - 1,
                unmatched,
                suggestions,
            }))
        }
    }

    fn validate(&self) -> Result<(), ParameterError> {
        if self
            .chain
            .iter()
            .any(|state| state.usage_help_requested || state.version_help_requested)
        {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Help was requested; skipping required parameter validation.");
            }

            return Ok(());
        }

        let mut missing = Vec::default();

        for state in &self.chain {
            let command = self.command_line.command(state.command);

            for (i, option) in command.options().iter().enumerate() {
                let slot = Slot::Option(i);

                if option.is_required() && state.occurrences(slot) == 0 {
                    missing.push(Missing {
                        arg: ArgId::new(command.id(), slot),
                        name: option.longest_name().to_string(),
                    });
                }
            }

            for (i, positional) in command.positionals().iter().enumerate() {
                let slot = Slot::Positional(i);
                let count = state.occurrences(slot);
                let min = positional.arity_of().min_count();
                let short = if positional.is_required() {
                    count < std::cmp::max(min, 1)
                } else {
                    count > 0 && count < min
                };

                if short {
                    missing.push(Missing {
                        arg: ArgId::new(command.id(), slot),
                        name: positional.label().to_string(),
                    });
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(self.error(ParameterErrorKind::MissingParameter { missing }))
        }
    }

    fn apply_defaults(&mut self) -> Result<(), ParameterError> {
        for state in self.chain.iter_mut() {
            let command = self.command_line.command(state.command);
            let parser = command.parser();
            let options = command
                .options()
                .iter()
                .enumerate()
                .map(|(i, option)| (Slot::Option(i), ArgSpec::Option(option)));
            let positionals = command
                .positionals()
                .iter()
                .enumerate()
                .map(|(i, positional)| (Slot::Positional(i), ArgSpec::Positional(positional)));

            for (slot, spec) in options.chain(positionals) {
                let default = match spec.default_value() {
                    Some(default) if state.occurrences(slot) == 0 => default,
                    _ => continue,
                };
                let id = ArgId::new(command.id(), slot);
                let mut values = Vec::default();

                for piece in prepare(default, spec, parser) {
                    values.push(convert(command, spec, id, &piece)?);
                }

                state.defaults.insert(slot, values);
            }
        }

        Ok(())
    }
}

fn error_in(command: &Command, kind: ParameterErrorKind) -> ParameterError {
    ParameterError::new(command.id(), command.name(), kind)
}

/// Whether `token` is shaped like an option (ex: `-x`, `--name`), as opposed to a negative number.
fn resembles_option(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => !is_number(rest),
        _ => false,
    }
}

/// Decompose `token` as a cluster of registered short options (ex: `-vxf`), when clustering is allowed.
fn decompose_cluster(command: &Command, token: &str) -> Result<Option<Vec<Piece>>, ClusterError> {
    let parser = command.parser();

    if !parser.is_posix_clustered_short_options_allowed()
        || !token.starts_with('-')
        || token.starts_with("--")
        || token.chars().count() <= 2
    {
        return Ok(None);
    }

    let lookup = |c: char| {
        command
            .lookup_option(&format!("-{c}"))
            .filter(|found| !found.negated)
            .map(|found| (found.index, command.options()[found.index].arity_of()))
    };

    cluster::decompose(&token[1..], parser.separator_str(), lookup)
}

fn is_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && text.chars().all(|c| c.is_ascii_digit() || c == '.')
}

// Splitting and quote trimming turn one value token into its final values.
// A quoted token is only unquoted before splitting when quoted sections may be split.
fn prepare(token: &str, spec: ArgSpec<'_>, parser: &ParserSpec) -> Vec<String> {
    let trim = |value: &str| {
        if parser.is_trim_quotes() {
            trim_quotes(value).to_string()
        } else {
            value.to_string()
        }
    };

    match spec.split_regex() {
        Some(regex) if parser.is_split_quoted_strings() => {
            split_value(&trim(token), regex, true).iter().map(|part| trim(part)).collect()
        }
        Some(regex) => split_value(token, regex, false).iter().map(|part| trim(part)).collect(),
        None => vec![trim(token)],
    }
}

fn convert(command: &Command, spec: ArgSpec<'_>, id: ArgId, token: &str) -> Result<Value, ParameterError> {
    let value_type = spec.value_type();
    let converter = match spec
        .own_converter()
        .or_else(|| command.converters().get(&value_type))
    {
        Some(converter) => converter,
        None => {
            return Err(error_in(
                command,
                ParameterErrorKind::MissingConverter {
                    arg: id,
                    name: spec.display_name().to_string(),
                    type_name: value_type.name(),
                },
            ));
        }
    };

    converter.apply(token, command.parser()).map_err(|source| {
        error_in(
            command,
            ParameterErrorKind::TypeConversion {
                arg: id,
                name: spec.display_name().to_string(),
                token: token.to_string(),
                type_name: value_type.name(),
                source,
            },
        )
    })
}

fn negate(value: Value, negated: bool) -> Value {
    match value.downcast_ref::<bool>() {
        Some(b) if negated => Value::new(!b),
        _ => value,
    }
}

fn suggestions(command: &Command, token: &str) -> Vec<String> {
    if token.starts_with('-') {
        let separator = command.parser().separator_str();
        let name = if separator.is_empty() {
            token
        } else {
            token.split_once(separator).map(|(name, _)| name).unwrap_or(token)
        };
        suggest::similar(name, command.option_names())
    } else {
        suggest::similar(token, command.subcommand_names())
    }
}
