use crate::constant::*;

/// Parser settings for one command node.
///
/// Subcommands receive a copy of their parent's settings at the moment they are registered.
/// Changing the parent afterwards does not reach subcommands that were already registered.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::ParserSpec;
///
/// let parser = ParserSpec::default()
///     .stop_at_positional(true)
///     .separator(":");
/// assert!(parser.is_stop_at_positional());
/// assert_eq!(parser.separator_str(), ":");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSpec {
    posix_clustered_short_options_allowed: bool,
    overwritten_options_allowed: bool,
    unmatched_arguments_allowed: bool,
    unmatched_options_are_positional_params: bool,
    stop_at_unmatched: bool,
    stop_at_positional: bool,
    case_insensitive_enum_values_allowed: bool,
    trim_quotes: bool,
    split_quoted_strings: bool,
    end_of_options_delimiter: String,
    separator: String,
    expand_at_files: bool,
    at_file_comment_char: Option<char>,
    use_simplified_at_files: bool,
    allow_options_as_option_parameters: bool,
    options_case_insensitive: bool,
    subcommands_case_insensitive: bool,
}

impl Default for ParserSpec {
    fn default() -> Self {
        Self {
            posix_clustered_short_options_allowed: true,
            overwritten_options_allowed: false,
            unmatched_arguments_allowed: false,
            unmatched_options_are_positional_params: false,
            stop_at_unmatched: false,
            stop_at_positional: false,
            case_insensitive_enum_values_allowed: false,
            trim_quotes: false,
            split_quoted_strings: false,
            end_of_options_delimiter: DEFAULT_END_OF_OPTIONS.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            expand_at_files: true,
            at_file_comment_char: Some(DEFAULT_AT_FILE_COMMENT),
            use_simplified_at_files: false,
            allow_options_as_option_parameters: false,
            options_case_insensitive: false,
            subcommands_case_insensitive: false,
        }
    }
}

impl ParserSpec {
    /// Allow `-xvf` to be decomposed into `-x -v -f` (default `true`).
    pub fn posix_clustered_short_options_allowed(mut self, value: bool) -> Self {
        self.posix_clustered_short_options_allowed = value;
        self
    }

    /// Allow a single-value option to be specified more than once, keeping the last value (default `false`).
    pub fn overwritten_options_allowed(mut self, value: bool) -> Self {
        self.overwritten_options_allowed = value;
        self
    }

    /// Collect tokens which match nothing instead of failing (default `false`).
    pub fn unmatched_arguments_allowed(mut self, value: bool) -> Self {
        self.unmatched_arguments_allowed = value;
        self
    }

    /// Treat option-shaped tokens which match no option as positional parameters (default `false`).
    pub fn unmatched_options_are_positional_params(mut self, value: bool) -> Self {
        self.unmatched_options_are_positional_params = value;
        self
    }

    /// Stop at the first unmatched token, collecting it and everything after it (default `false`).
    /// Implies [`ParserSpec::unmatched_arguments_allowed`].
    pub fn stop_at_unmatched(mut self, value: bool) -> Self {
        self.stop_at_unmatched = value;

        if value {
            self.unmatched_arguments_allowed = true;
        }

        self
    }

    /// The first positional parameter ends option parsing (default `false`).
    pub fn stop_at_positional(mut self, value: bool) -> Self {
        self.stop_at_positional = value;
        self
    }

    /// Match [`ValueEnum`](crate::ValueEnum) names ignoring ASCII case (default `false`).
    pub fn case_insensitive_enum_values_allowed(mut self, value: bool) -> Self {
        self.case_insensitive_enum_values_allowed = value;
        self
    }

    /// Strip one pair of surrounding quotes from values (default `false`).
    pub fn trim_quotes(mut self, value: bool) -> Self {
        self.trim_quotes = value;
        self
    }

    /// Let split regexes split inside quoted sections of a value (default `false`).
    pub fn split_quoted_strings(mut self, value: bool) -> Self {
        self.split_quoted_strings = value;
        self
    }

    /// The literal marker after which every token is positional (default `--`).
    pub fn end_of_options_delimiter(mut self, value: impl Into<String>) -> Self {
        self.end_of_options_delimiter = value.into();
        self
    }

    /// The separator between an option name and its attached value (default `=`).
    pub fn separator(mut self, value: impl Into<String>) -> Self {
        self.separator = value.into();
        self
    }

    /// Replace `@path` tokens by the contents of `path` (default `true`).
    pub fn expand_at_files(mut self, value: bool) -> Self {
        self.expand_at_files = value;
        self
    }

    /// The comment marker inside `@files`, or `None` to disable comments (default `#`).
    pub fn at_file_comment_char(mut self, value: Option<char>) -> Self {
        self.at_file_comment_char = value;
        self
    }

    /// Read `@files` as one argument per line instead of whitespace separated words (default `false`).
    pub fn use_simplified_at_files(mut self, value: bool) -> Self {
        self.use_simplified_at_files = value;
        self
    }

    /// Let a registered option name be consumed as a required value of the preceding option (default `false`).
    pub fn allow_options_as_option_parameters(mut self, value: bool) -> Self {
        self.allow_options_as_option_parameters = value;
        self
    }

    /// Match option names ignoring ASCII case (default `false`).
    pub fn options_case_insensitive(mut self, value: bool) -> Self {
        self.options_case_insensitive = value;
        self
    }

    /// Match subcommand names and aliases ignoring ASCII case (default `false`).
    pub fn subcommands_case_insensitive(mut self, value: bool) -> Self {
        self.subcommands_case_insensitive = value;
        self
    }

    #[allow(missing_docs)]
    pub fn is_posix_clustered_short_options_allowed(&self) -> bool {
        self.posix_clustered_short_options_allowed
    }

    #[allow(missing_docs)]
    pub fn is_overwritten_options_allowed(&self) -> bool {
        self.overwritten_options_allowed
    }

    #[allow(missing_docs)]
    pub fn is_unmatched_arguments_allowed(&self) -> bool {
        self.unmatched_arguments_allowed || self.stop_at_unmatched
    }

    #[allow(missing_docs)]
    pub fn is_unmatched_options_are_positional_params(&self) -> bool {
        self.unmatched_options_are_positional_params
    }

    #[allow(missing_docs)]
    pub fn is_stop_at_unmatched(&self) -> bool {
        self.stop_at_unmatched
    }

    #[allow(missing_docs)]
    pub fn is_stop_at_positional(&self) -> bool {
        self.stop_at_positional
    }

    #[allow(missing_docs)]
    pub fn is_case_insensitive_enum_values_allowed(&self) -> bool {
        self.case_insensitive_enum_values_allowed
    }

    #[allow(missing_docs)]
    pub fn is_trim_quotes(&self) -> bool {
        self.trim_quotes
    }

    #[allow(missing_docs)]
    pub fn is_split_quoted_strings(&self) -> bool {
        self.split_quoted_strings
    }

    #[allow(missing_docs)]
    pub fn end_of_options_delimiter_str(&self) -> &str {
        &self.end_of_options_delimiter
    }

    #[allow(missing_docs)]
    pub fn separator_str(&self) -> &str {
        &self.separator
    }

    #[allow(missing_docs)]
    pub fn is_expand_at_files(&self) -> bool {
        self.expand_at_files
    }

    #[allow(missing_docs)]
    pub fn at_file_comment(&self) -> Option<char> {
        self.at_file_comment_char
    }

    #[allow(missing_docs)]
    pub fn is_use_simplified_at_files(&self) -> bool {
        self.use_simplified_at_files
    }

    #[allow(missing_docs)]
    pub fn is_allow_options_as_option_parameters(&self) -> bool {
        self.allow_options_as_option_parameters
    }

    #[allow(missing_docs)]
    pub fn is_options_case_insensitive(&self) -> bool {
        self.options_case_insensitive
    }

    #[allow(missing_docs)]
    pub fn is_subcommands_case_insensitive(&self) -> bool {
        self.subcommands_case_insensitive
    }
}
