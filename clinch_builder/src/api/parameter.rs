use regex::Regex;
use std::any::Any;

use crate::api::{BoxError, Converter, ValueEnum, ValueType};
use crate::constant::NEGATION_PREFIX;
use crate::model::Range;
use crate::parser::ConfigError;

/// The properties shared by options and positional parameters.
#[derive(Debug, Clone)]
pub(crate) struct ArgCore {
    arity: Option<Range>,
    value_type: ValueType,
    converter: Option<Converter>,
    required: Option<bool>,
    default_value: Option<String>,
    split: Option<Regex>,
    param_label: Option<String>,
    hide_param_syntax: bool,
    description: Option<String>,
    hidden: bool,
    multiple: bool,
}

impl ArgCore {
    fn new(value_type: ValueType) -> Self {
        Self {
            arity: None,
            value_type,
            converter: None,
            required: None,
            default_value: None,
            split: None,
            param_label: None,
            hide_param_syntax: false,
            description: None,
            hidden: false,
            multiple: false,
        }
    }
}

// Both `OptionSpec` and `PositionalSpec` carry an `ArgCore` (`core`) and a `deferred_error`.
macro_rules! arg_setters {
    () => {
        /// Set the arity from the compact range grammar (ex: `"1"`, `"0..1"`, `"1..*"`).
        /// A malformed range is reported when the command line is built.
        pub fn arity(mut self, arity: &str) -> Self {
            match Range::parse(arity) {
                Ok(range) => self.core.arity = Some(range),
                Err(error) => self.defer(ConfigError::from(error)),
            }

            self
        }

        /// Set the arity.
        pub fn arity_range(mut self, arity: Range) -> Self {
            self.core.arity = Some(arity);
            self
        }

        /// Convert values into `T`, using the converter registered on the command for `T`.
        pub fn value_type<T: Any>(mut self) -> Self {
            self.core.value_type = ValueType::of::<T>();
            self.core.converter = None;
            self
        }

        /// Convert values into the enum `T` by variant name.
        pub fn value_enum<T: ValueEnum>(mut self) -> Self {
            self.core.value_type = ValueType::of::<T>();
            self.core.converter = Some(Converter::value_enum::<T>());
            self
        }

        /// Convert values into `T` with `function`, ignoring any converter registered on the command.
        pub fn converter<T, E, F>(mut self, function: F) -> Self
        where
            T: Any + Send + Sync,
            E: Into<BoxError>,
            F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        {
            self.core.value_type = ValueType::of::<T>();
            self.core.converter = Some(Converter::new(function));
            self
        }

        /// Mark as required (or not).
        pub fn required(mut self, required: bool) -> Self {
            self.core.required = Some(required);
            self
        }

        /// The value to report when never matched.
        /// It is converted like any matched value.
        pub fn default_value(mut self, value: impl Into<String>) -> Self {
            self.core.default_value = Some(value.into());
            self
        }

        /// Split each value into multiple values with the regex `pattern`.
        pub fn split(mut self, pattern: &str) -> Self {
            match Regex::new(pattern) {
                Ok(regex) => self.core.split = Some(regex),
                Err(source) => self.defer(ConfigError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                }),
            }

            self
        }

        /// The placeholder shown for values in help output.
        pub fn param_label(mut self, label: impl Into<String>) -> Self {
            self.core.param_label = Some(label.into());
            self
        }

        /// Show the param label verbatim in help output, without arity decoration.
        pub fn hide_param_syntax(mut self, hide: bool) -> Self {
            self.core.hide_param_syntax = hide;
            self
        }

        /// Document the parameter.
        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.core.description = Some(description.into());
            self
        }

        /// Hide the parameter from help output.
        pub fn hidden(mut self, hidden: bool) -> Self {
            self.core.hidden = hidden;
            self
        }

        /// Accumulate values over repeated matches, instead of treating a repeat as an overwrite.
        pub fn multiple(mut self, multiple: bool) -> Self {
            self.core.multiple = multiple;
            self
        }

        fn defer(&mut self, error: ConfigError) {
            // Only the first problem is reported.
            if self.deferred_error.is_none() {
                self.deferred_error.replace(error);
            }
        }

        pub(crate) fn take_deferred_error(&mut self) -> Option<ConfigError> {
            self.deferred_error.take()
        }

        /// The target type of the values.
        pub fn value_type_of(&self) -> ValueType {
            self.core.value_type
        }

        pub(crate) fn own_converter(&self) -> Option<&Converter> {
            self.core.converter.as_ref()
        }

        /// The raw default value.
        pub fn default_value_str(&self) -> Option<&str> {
            self.core.default_value.as_deref()
        }

        /// The split regex.
        pub fn split_regex(&self) -> Option<&Regex> {
            self.core.split.as_ref()
        }

        /// Whether help output should show the param label verbatim.
        pub fn is_hide_param_syntax(&self) -> bool {
            self.core.hide_param_syntax
        }

        /// The description.
        pub fn description_str(&self) -> Option<&str> {
            self.core.description.as_deref()
        }

        /// Whether the parameter is hidden from help output.
        pub fn is_hidden(&self) -> bool {
            self.core.hidden
        }

        /// Whether repeated matches accumulate values.
        pub fn is_multiple(&self) -> bool {
            self.core.multiple
        }
    };
}

/// A named option, such as `-v`, `--output=FILE` or `/x`.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::OptionSpec;
/// use std::path::PathBuf;
///
/// let verbose = OptionSpec::flag(["-v", "--verbose"]).multiple(true);
/// let output = OptionSpec::new(["-o", "--output"])
///     .value_type::<PathBuf>()
///     .required(true);
/// assert_eq!(output.longest_name(), "--output");
/// assert_eq!(verbose.arity_of().max_count(), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    names: Vec<String>,
    core: ArgCore,
    fallback_value: Option<String>,
    negatable: bool,
    usage_help: bool,
    version_help: bool,
    deferred_error: Option<ConfigError>,
}

impl OptionSpec {
    /// A value-taking option (`String`, arity `1`).
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            core: ArgCore::new(ValueType::of::<String>()),
            fallback_value: None,
            negatable: false,
            usage_help: false,
            version_help: false,
            deferred_error: None,
        }
    }

    /// A boolean flag (`bool`, arity `0`): its presence alone is the value.
    pub fn flag<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names).value_type::<bool>()
    }

    arg_setters!();

    /// The value recorded when the option is given without a value (for arities like `0..1`).
    pub fn fallback_value(mut self, value: impl Into<String>) -> Self {
        self.fallback_value = Some(value.into());
        self
    }

    /// Also accept `--no-<name>` for every `--<name>`, recording `false`.
    pub fn negatable(mut self, negatable: bool) -> Self {
        self.negatable = negatable;
        self
    }

    /// Matching this option requests usage help, and suspends required parameter validation.
    pub fn usage_help(mut self, usage_help: bool) -> Self {
        self.usage_help = usage_help;
        self
    }

    /// Matching this option requests version help, and suspends required parameter validation.
    pub fn version_help(mut self, version_help: bool) -> Self {
        self.version_help = version_help;
        self
    }

    /// All names, in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The longest name (the first of equal length), used in messages.
    pub fn longest_name(&self) -> &str {
        self.names
            .iter()
            .fold(None::<&String>, |longest, name| match longest {
                Some(l) if l.len() >= name.len() => Some(l),
                _ => Some(name),
            })
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The `--no-` forms of the long names, when negatable.
    pub fn negated_names(&self) -> Vec<String> {
        if !self.negatable {
            return Vec::default();
        }

        self.names
            .iter()
            .filter_map(|name| name.strip_prefix("--"))
            .map(|stem| format!("{NEGATION_PREFIX}{stem}"))
            .collect()
    }

    /// The arity of a single occurrence.
    ///
    /// Unless configured, `0` for `bool` options and `1` otherwise.
    pub fn arity_of(&self) -> Range {
        match self.core.arity {
            Some(arity) => arity,
            None if self.core.value_type.is::<bool>() => Range::exactly(0),
            None => Range::exactly(1),
        }
    }

    /// Whether the option must be matched.
    pub fn is_required(&self) -> bool {
        self.core.required.unwrap_or(false)
    }

    /// The placeholder shown for values in help output.
    pub fn param_label_str(&self) -> String {
        match &self.core.param_label {
            Some(label) => label.clone(),
            None => format!("<{}>", self.longest_name().trim_start_matches(['-', '/', '+'])),
        }
    }

    /// The fallback value.
    pub fn fallback_value_str(&self) -> Option<&str> {
        self.fallback_value.as_deref()
    }

    /// Whether `--no-` forms are accepted.
    pub fn is_negatable(&self) -> bool {
        self.negatable
    }

    /// Whether this option requests usage help.
    pub fn is_usage_help(&self) -> bool {
        self.usage_help
    }

    /// Whether this option requests version help.
    pub fn is_version_help(&self) -> bool {
        self.version_help
    }
}

/// A positional parameter, occupying a span of the positional index space.
///
/// Without an explicit [`PositionalSpec::index`], positional parameters are indexed one after another, in declaration order.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::PositionalSpec;
///
/// let source = PositionalSpec::new("SOURCE");
/// let targets = PositionalSpec::new("TARGET").arity("1..*");
/// assert!(source.is_required());
/// assert_eq!(targets.arity_of().min_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PositionalSpec {
    label: String,
    index: Option<Range>,
    core: ArgCore,
    deferred_error: Option<ConfigError>,
}

impl PositionalSpec {
    /// A positional parameter (`String`) identified by `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            index: None,
            core: ArgCore::new(ValueType::of::<String>()),
            deferred_error: None,
        }
    }

    arg_setters!();

    /// Set the claimed positional index range from the compact range grammar (ex: `"0"`, `"1..*"`).
    pub fn index(mut self, index: &str) -> Self {
        match Range::parse(index) {
            Ok(range) => self.index = Some(range),
            Err(error) => self.defer(ConfigError::from(error)),
        }

        self
    }

    /// Set the claimed positional index range.
    pub fn index_range(mut self, index: Range) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn assign_index(&mut self, index: Range) {
        self.index = Some(index);
    }

    /// The label identifying this positional parameter.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The claimed index range.
    /// Always set once the command line is built.
    pub fn index_of(&self) -> Option<Range> {
        self.index
    }

    /// The arity.
    ///
    /// Unless configured: `1` for a single index, otherwise as many values as the index span (at least `0`).
    pub fn arity_of(&self) -> Range {
        match (self.core.arity, self.index) {
            (Some(arity), _) => arity,
            (None, Some(index)) => match index.span() {
                Some(1) => Range::exactly(1),
                Some(span) => Range::new(0, span),
                None => Range::at_least(0),
            },
            (None, None) => Range::exactly(1),
        }
    }

    /// Whether the positional parameter must be matched.
    ///
    /// Unless configured, required when the arity minimum is above zero.
    pub fn is_required(&self) -> bool {
        self.core
            .required
            .unwrap_or_else(|| self.arity_of().min_count() > 0)
    }

    /// The placeholder shown for values in help output.
    pub fn param_label_str(&self) -> String {
        match &self.core.param_label {
            Some(label) => label.clone(),
            None => format!("<{}>", self.label),
        }
    }
}

/// A borrowed view over either kind of parameter.
#[derive(Debug, Clone, Copy)]
pub enum ArgSpec<'a> {
    /// A named option.
    Option(&'a OptionSpec),
    /// A positional parameter.
    Positional(&'a PositionalSpec),
}

impl<'a> ArgSpec<'a> {
    /// The name used in messages: the longest option name, or the positional label.
    pub fn display_name(&self) -> &'a str {
        match self {
            ArgSpec::Option(option) => option.longest_name(),
            ArgSpec::Positional(positional) => positional.label(),
        }
    }

    /// The names of an option (empty for positional parameters).
    pub fn names(&self) -> &'a [String] {
        match self {
            ArgSpec::Option(option) => option.names(),
            ArgSpec::Positional(_) => &[],
        }
    }

    /// The arity.
    pub fn arity(&self) -> Range {
        match self {
            ArgSpec::Option(option) => option.arity_of(),
            ArgSpec::Positional(positional) => positional.arity_of(),
        }
    }

    /// The target type of the values.
    pub fn value_type(&self) -> ValueType {
        match self {
            ArgSpec::Option(option) => option.value_type_of(),
            ArgSpec::Positional(positional) => positional.value_type_of(),
        }
    }

    /// Whether the parameter must be matched.
    pub fn required(&self) -> bool {
        match self {
            ArgSpec::Option(option) => option.is_required(),
            ArgSpec::Positional(positional) => positional.is_required(),
        }
    }

    /// The raw default value.
    pub fn default_value(&self) -> Option<&'a str> {
        match self {
            ArgSpec::Option(option) => option.default_value_str(),
            ArgSpec::Positional(positional) => positional.default_value_str(),
        }
    }

    /// The split regex.
    pub fn split_regex(&self) -> Option<&'a Regex> {
        match self {
            ArgSpec::Option(option) => option.split_regex(),
            ArgSpec::Positional(positional) => positional.split_regex(),
        }
    }

    /// Whether repeated matches accumulate values.
    pub fn multiple(&self) -> bool {
        match self {
            ArgSpec::Option(option) => option.is_multiple(),
            ArgSpec::Positional(positional) => positional.is_multiple(),
        }
    }

    /// The placeholder shown for values in help output.
    pub fn param_label(&self) -> String {
        match self {
            ArgSpec::Option(option) => option.param_label_str(),
            ArgSpec::Positional(positional) => positional.param_label_str(),
        }
    }

    /// Whether help output should show the param label verbatim.
    pub fn hide_param_syntax(&self) -> bool {
        match self {
            ArgSpec::Option(option) => option.is_hide_param_syntax(),
            ArgSpec::Positional(positional) => positional.is_hide_param_syntax(),
        }
    }

    /// Whether this is a named option.
    pub fn is_option(&self) -> bool {
        matches!(self, ArgSpec::Option(_))
    }

    pub(crate) fn own_converter(&self) -> Option<&'a Converter> {
        match self {
            ArgSpec::Option(option) => option.own_converter(),
            ArgSpec::Positional(positional) => positional.own_converter(),
        }
    }
}
