//! `clinch` is a declarative command line interpreter for Rust.
//!
//! Describe a command tree once, then interpret any number of argument lists against it.
//! `clinch` prioritizes the following concerns:
//! * *Declarative configuration*:
//! Commands, options, positional parameters and subcommands are plain values ([`CommandSpec`], [`OptionSpec`], [`PositionalSpec`]).
//! The configuration is checked once, when it is compiled into a [`CommandLine`].
//! * *Arity driven matching*:
//! Every parameter declares how many values each occurrence consumes (its [`Range`] arity, ex: `1`, `0..1`, `2..*`).
//! Tokens are matched strictly against these ranges.
//! * *Typed values*:
//! Values are converted as they are matched, via the [`ConverterRegistry`].
//! Built-in converters cover the primitive types, `String`, `char` and `PathBuf`; enums and custom types may be registered.
//! * *POSIX conventions*:
//! Clustered short options (`-vxf=out.txt`), attached values (`--file=out.txt`), the end-of-options delimiter (`--`), and `@file` argument files.
//! * *Isolated results*:
//! The [`CommandLine`] is never mutated by parsing.
//! Each parse produces its own [`ParseResult`], with one nested result per matched subcommand.
//!
//! # Usage
//! A simple archive tool, with clustered flags and typed values:
//! ```no_run
#![doc = include_str!("../demos/archive.rs")]
//! ```
//!
//! ```console
//! $ archive -cvf out.tar -z gzip src docs
//! Creating 'out.tar' (Gzip).
//!   src
//!   docs
//!
//! $ archive -cv src
//! Parse error: missing required parameter: '--file'
//!
//! $ archive -cvf out.tar --compresion zstd
//! Parse error: unmatched arguments from index 2: '--compresion', 'zstd' (did you mean '--compression'?)
//! ```
//!
//! # Commands & Parameters
//! Configure `clinch` by starting with a [`CommandSpec`] and adding [`OptionSpec`]s and [`PositionalSpec`]s.
//! * Options are matched by name (ex: `-f` or `--file`), in any order.
//! A flag ([`OptionSpec::flag`]) takes no values and records `true` when present.
//! * Positional parameters are matched by position.
//! Each has an index range; without an explicit [`PositionalSpec::index`], indices are assigned in declaration order.
//!
//! Compile the tree with [`CommandSpec::build`] (or [`CommandSpec::build_parser`]), then parse with [`CommandLine::parse_env`] (or [`CommandLine::parse`]).
//! Read values from the [`ParseResult`] via [`ParseResult::value`] and [`ParseResult::values`], keyed by any option name or positional label.
//! Parameters which were not matched report their default value, if any.
//!
//! ### Parser settings
//! The lexical rules are configured per command via [`ParserSpec`] (ex: whether unmatched arguments are tolerated, the end-of-options delimiter, case insensitivity).
//! Subcommands start from a copy of their parent's settings, taken when the subcommand is added.
//!
//! ### Sub-commands
//! A subcommand is matched when a token names it (or one of its aliases), after which tokens are matched against the subcommand only.
//!
//! ```no_run
#![doc = include_str!("../demos/vcs.rs")]
//! ```
//!
//! ```console
//! $ vcs --no-color ci -am "first line" -m "second line"
//! color: false
//! Committing (all=true):
//!   first line
//!   second line
//!
//! $ vcs comit
//! vcs: unmatched argument from index 0: 'comit' (did you mean 'commit'?)
//! ```
//!
//! ### Argument files
//! A token `@path` is replaced by the arguments read from `path` (recursively, with cycles skipped).
//! Use `@@` to pass a literal argument beginning with `@`.
//!
//! # Errors
//! Configuration problems are reported as a [`ConfigError`] when compiling.
//! Parse problems are reported as a [`ParameterError`], whose [`ParameterErrorKind`] details the problem.
//! Both are covered by the crate [`Error`].
//!
//! # Features
//! * `tracing_debug`: emit debug logs of the matching process, via [tracing](https://docs.rs/tracing).
pub use clinch_builder::*;
