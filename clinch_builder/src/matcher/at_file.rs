use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ParserSpec;
use crate::constant::{AT_FILE_PREFIX, MAX_AT_FILE_DEPTH};
use crate::parser::ParameterErrorKind;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum AtToken<'t> {
    Literal(&'t str),
    File(&'t Path),
}

fn classify(token: &str) -> AtToken<'_> {
    match token.strip_prefix(AT_FILE_PREFIX) {
        // '@@x' is the escape for the literal '@x'.
        Some(rest) if rest.starts_with(AT_FILE_PREFIX) => AtToken::Literal(rest),
        Some(rest) if !rest.is_empty() => AtToken::File(Path::new(rest)),
        _ => AtToken::Literal(token),
    }
}

/// Replace every `@path` token by the arguments read from `path`, recursively.
pub(crate) fn expand(
    tokens: Vec<String>,
    parser: &ParserSpec,
) -> Result<Vec<String>, ParameterErrorKind> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut stack = Vec::default();
    expand_into(tokens, parser, &mut stack, &mut expanded)?;
    Ok(expanded)
}

fn expand_into(
    tokens: Vec<String>,
    parser: &ParserSpec,
    stack: &mut Vec<PathBuf>,
    expanded: &mut Vec<String>,
) -> Result<(), ParameterErrorKind> {
    for token in tokens {
        let path = match classify(&token) {
            AtToken::Literal(literal) => {
                expanded.push(literal.to_string());
                continue;
            }
            AtToken::File(path) => path,
        };

        if !path.exists() {
            // Not a file: keep the token as is.
            expanded.push(token.clone());
            continue;
        }

        let canonical = fs::canonicalize(path).map_err(|source| ParameterErrorKind::AtFileRead {
            path: path.to_path_buf(),
            source,
        })?;

        if stack.contains(&canonical) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Skipping argument file '{}', which is already being expanded.", path.display());
            }

            continue;
        }

        if stack.len() >= MAX_AT_FILE_DEPTH {
            return Err(ParameterErrorKind::AtFileRecursion {
                path: path.to_path_buf(),
                depth: stack.len() + 1,
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| ParameterErrorKind::AtFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let arguments = if parser.is_use_simplified_at_files() {
            simplified_arguments(&contents, parser.at_file_comment())
        } else {
            quoted_arguments(&contents, parser.at_file_comment())
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Expanding argument file '{}' into {} argument(s).",
                path.display(),
                arguments.len()
            );
        }

        stack.push(canonical);
        expand_into(arguments, parser, stack, expanded)?;
        stack.pop();
    }

    Ok(())
}

// One argument per line.
fn simplified_arguments(contents: &str, comment: Option<char>) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| match comment {
            Some(c) => !line.starts_with(c),
            None => true,
        })
        .map(str::to_string)
        .collect()
}

// Whitespace separated words, where quotes group words and are removed.
fn quoted_arguments(contents: &str, comment: Option<char>) -> Vec<String> {
    let mut arguments = Vec::default();
    let mut current = String::default();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if q == '"' && c == '\\' && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => {
                if c.is_whitespace() {
                    if in_word {
                        arguments.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                } else if !in_word && Some(c) == comment {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                } else if c == '"' || c == '\'' {
                    quote = Some(c);
                    in_word = true;
                } else {
                    current.push(c);
                    in_word = true;
                }
            }
        }
    }

    if in_word {
        arguments.push(current);
    }

    arguments
}
