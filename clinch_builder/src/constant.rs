pub(crate) const DEFAULT_END_OF_OPTIONS: &str = "--";
pub(crate) const DEFAULT_SEPARATOR: &str = "=";
pub(crate) const DEFAULT_AT_FILE_COMMENT: char = '#';
pub(crate) const AT_FILE_PREFIX: char = '@';
pub(crate) const MAX_AT_FILE_DEPTH: usize = 32;

pub(crate) const HELP_NAMES: [&str; 2] = ["-h", "--help"];
pub(crate) const VERSION_NAMES: [&str; 2] = ["-V", "--version"];
pub(crate) const NEGATION_PREFIX: &str = "--no-";

pub(crate) const MAX_SUGGESTIONS: usize = 3;
