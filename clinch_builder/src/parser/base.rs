use std::path::PathBuf;
use thiserror::Error;

use crate::api::BoxError;
use crate::model::FormatError;
use crate::parser::{ArgId, CommandId};

/// A problem with the command configuration, found while compiling it into a [`CommandLine`](crate::CommandLine).
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    /// An arity or index range could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A split regex could not be compiled.
    #[error("invalid split regex '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern text.
        pattern: String,
        /// The regex compiler's error.
        #[source]
        source: regex::Error,
    },

    /// An option was declared without any names.
    #[error("option without names in command '{command}'.")]
    UnnamedOption {
        /// The command name.
        command: String,
    },

    /// An option name is empty or contains whitespace.
    #[error("invalid option name '{name}' in command '{command}'.")]
    InvalidOptionName {
        /// The command name.
        command: String,
        /// The option name.
        name: String,
    },

    /// Two options share a name.
    #[error("cannot duplicate the option '{name}' in command '{command}'.")]
    DuplicateOption {
        /// The command name.
        command: String,
        /// The option name.
        name: String,
    },

    /// Two positional parameters share a label.
    #[error("cannot duplicate the positional parameter '{label}' in command '{command}'.")]
    DuplicatePositional {
        /// The command name.
        command: String,
        /// The positional label.
        label: String,
    },

    /// Two subcommands share a name or alias.
    #[error("cannot duplicate the subcommand '{name}' in command '{command}'.")]
    DuplicateSubcommand {
        /// The command name.
        command: String,
        /// The subcommand name or alias.
        name: String,
    },

    /// A help option takes values.
    #[error("help option '{name}' in command '{command}' must not take values.")]
    ValuedHelpOption {
        /// The command name.
        command: String,
        /// The option name.
        name: String,
    },
}

/// A problem with the tokens given to [`CommandLine::parse`](crate::CommandLine::parse).
///
/// Refers to the deepest command being processed when the problem was found.
#[derive(Debug)]
pub struct ParameterError {
    command: CommandId,
    command_name: String,
    kind: ParameterErrorKind,
}

impl ParameterError {
    pub(crate) fn new(command: CommandId, command_name: impl Into<String>, kind: ParameterErrorKind) -> Self {
        Self {
            command,
            command_name: command_name.into(),
            kind,
        }
    }

    /// The command being processed.
    pub fn command(&self) -> CommandId {
        self.command
    }

    /// The name of the command being processed.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// What went wrong.
    pub fn kind(&self) -> &ParameterErrorKind {
        &self.kind
    }

    /// Take the kind, dropping the command context.
    pub fn into_kind(self) -> ParameterErrorKind {
        self.kind
    }
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

// The kind's own cause (ex: a converter's error) is the cause of the whole parameter error.
impl std::error::Error for ParameterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

/// A missing parameter, for [`ParameterErrorKind::MissingParameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Missing {
    /// The parameter.
    pub arg: ArgId,
    /// The parameter's display name.
    pub name: String,
}

/// The kinds of [`ParameterError`].
#[derive(Debug, Error)]
pub enum ParameterErrorKind {
    /// Required parameters (or required values of an option) are missing.
    #[error("missing required parameter{}: {}", plural(.missing.len()), quote_all(.missing.iter().map(|m| m.name.as_str())))]
    MissingParameter {
        /// Every missing parameter.
        missing: Vec<Missing>,
    },

    /// A single occurrence option was matched more than once.
    #[error("option '{name}' should be specified only once.")]
    OverwrittenOption {
        /// The option.
        arg: ArgId,
        /// The option's display name.
        name: String,
    },

    /// A token matched nothing.
    #[error("unmatched argument{} from index {index}: {}{}", plural(.unmatched.len()), quote_all(.unmatched.iter().map(String::as_str)), did_you_mean(.suggestions))]
    UnmatchedArgument {
        /// The position of the first unmatched token (after `@file` expansion).
        index: usize,
        /// The unmatched token and everything after it.
        unmatched: Vec<String>,
        /// Similar names known to the command.
        suggestions: Vec<String>,
    },

    /// A converter rejected a token.
    #[error("invalid value for '{name}': cannot convert '{token}' to {type_name}: {source}")]
    TypeConversion {
        /// The parameter.
        arg: ArgId,
        /// The parameter's display name.
        name: String,
        /// The rejected token.
        token: String,
        /// The target type.
        type_name: &'static str,
        /// The converter's own error.
        #[source]
        source: BoxError,
    },

    /// No converter exists for the parameter's type.
    #[error("no converter registered for '{name}' of type {type_name}.")]
    MissingConverter {
        /// The parameter.
        arg: ArgId,
        /// The parameter's display name.
        name: String,
        /// The target type.
        type_name: &'static str,
    },

    /// A value was attached to an option which takes none.
    #[error("option '{name}' should be specified without '{value}' parameter.")]
    UnexpectedValue {
        /// The option.
        arg: ArgId,
        /// The option's display name.
        name: String,
        /// The attached value.
        value: String,
    },

    /// An `@file` exists but could not be read.
    #[error("cannot read argument file '{}': {source}", .path.display())]
    AtFileRead {
        /// The file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `@file`s are nested too deeply.
    #[error("argument file '{}' is nested too deeply (depth {depth}).", .path.display())]
    AtFileRecursion {
        /// The file.
        path: PathBuf,
        /// The nesting depth.
        depth: usize,
    },
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn quote_all<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|item| format!("'{item}'"))
        .collect::<Vec<String>>()
        .join(", ")
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::default()
    } else {
        format!(" (did you mean {}?)", quote_all(suggestions.iter().map(String::as_str)))
    }
}

/// Any parameter problem: either with the configuration or with the parsed tokens.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`ParameterError`].
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

impl From<FormatError> for Error {
    fn from(error: FormatError) -> Self {
        Error::Config(ConfigError::Format(error))
    }
}
