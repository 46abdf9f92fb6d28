use thiserror::Error;

use crate::model::Range;

/// One option out of a clustered short option token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// Matched without any value, and without consuming following tokens.
    Present(usize),
    /// Matched with a value attached inside the cluster.
    Attached(usize, String),
    /// Matched last in the cluster; values come from the following tokens.
    Trailing(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ClusterError {
    #[error("option {option} takes no value but was given '{value}'.")]
    UnexpectedValue { option: usize, value: String },
}

#[derive(Debug)]
enum State<'t> {
    // Expecting the next option character.
    Scan(&'t str),
    // An option taking values was found; `rest` follows its character.
    Valued {
        option: usize,
        arity: Range,
        rest: &'t str,
    },
    Done,
}

/// Decompose the `body` of a clustered token (the text after its leading `-`) into options.
///
/// `lookup` resolves a single character to the option index and arity of `-<c>`.
/// Returns `Ok(None)` when some character in option position is not an option.
///
/// Characters are consumed left to right:
/// * A flag (max arity `0`) matches and continues the scan.
///   A separator directly after it is an error, since its value would be discarded.
/// * An option requiring values (min arity above `0`) takes the rest of the token as its value, minus a leading separator.
///   With nothing left, it takes its values from the following tokens.
/// * An option with optional values takes a rest starting with the separator as its value.
///   Otherwise the rest is decomposed as further options when possible, and taken as the value when not.
pub(crate) fn decompose<F>(
    body: &str,
    separator: &str,
    lookup: F,
) -> Result<Option<Vec<Piece>>, ClusterError>
where
    F: Fn(char) -> Option<(usize, Range)>,
{
    decompose_with(body, separator, &lookup)
}

type Lookup<'l> = &'l dyn Fn(char) -> Option<(usize, Range)>;

fn decompose_with(
    body: &str,
    separator: &str,
    lookup: Lookup<'_>,
) -> Result<Option<Vec<Piece>>, ClusterError> {
    let mut pieces = Vec::default();
    let mut state = State::Scan(body);

    loop {
        state = match state {
            State::Scan(text) => {
                let mut chars = text.chars();
                let c = match chars.next() {
                    Some(c) => c,
                    None => return Ok(Some(pieces)),
                };
                let rest = chars.as_str();
                let (option, arity) = match lookup(c) {
                    Some(found) => found,
                    None => return Ok(None),
                };

                if arity.max_count() == Some(0) {
                    if !separator.is_empty() && rest.starts_with(separator) {
                        return Err(ClusterError::UnexpectedValue {
                            option,
                            value: rest[separator.len()..].to_string(),
                        });
                    }

                    pieces.push(Piece::Present(option));

                    if rest.is_empty() {
                        State::Done
                    } else {
                        State::Scan(rest)
                    }
                } else {
                    State::Valued {
                        option,
                        arity,
                        rest,
                    }
                }
            }
            State::Valued {
                option,
                arity,
                rest,
            } => {
                if rest.is_empty() {
                    pieces.push(Piece::Trailing(option));
                } else if let Some(value) = strip_separator(rest, separator) {
                    pieces.push(Piece::Attached(option, value.to_string()));
                } else if arity.min_count() > 0 {
                    pieces.push(Piece::Attached(option, rest.to_string()));
                } else {
                    match decompose_with(rest, separator, lookup) {
                        Ok(Some(more)) => {
                            pieces.push(Piece::Present(option));
                            pieces.extend(more);
                        }
                        Ok(None) | Err(_) => {
                            pieces.push(Piece::Attached(option, rest.to_string()));
                        }
                    }
                }

                State::Done
            }
            State::Done => return Ok(Some(pieces)),
        };
    }
}

fn strip_separator<'t>(text: &'t str, separator: &str) -> Option<&'t str> {
    if separator.is_empty() {
        None
    } else {
        text.strip_prefix(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // -f: flag, -r: requires one value, -o: optional value, -p: requires two values.
    fn lookup(c: char) -> Option<(usize, Range)> {
        match c {
            'f' => Some((0, Range::exactly(0))),
            'r' => Some((1, Range::exactly(1))),
            'o' => Some((2, Range::optional())),
            'p' => Some((3, Range::exactly(2))),
            'g' => Some((4, Range::exactly(0))),
            _ => None,
        }
    }

    fn run(body: &str) -> Result<Option<Vec<Piece>>, ClusterError> {
        decompose(body, "=", lookup)
    }

    #[rstest]
    // flag: first, middle, last
    #[case("fg", vec![Piece::Present(0), Piece::Present(4)])]
    #[case("gfg", vec![Piece::Present(4), Piece::Present(0), Piece::Present(4)])]
    #[case("gf", vec![Piece::Present(4), Piece::Present(0)])]
    #[case("f", vec![Piece::Present(0)])]
    // required value: first, middle, last
    #[case("rfg", vec![Piece::Attached(1, "fg".to_string())])]
    #[case("r=fg", vec![Piece::Attached(1, "fg".to_string())])]
    #[case("frg", vec![Piece::Present(0), Piece::Attached(1, "g".to_string())])]
    #[case("fr=out.txt", vec![Piece::Present(0), Piece::Attached(1, "out.txt".to_string())])]
    #[case("fgr", vec![Piece::Present(0), Piece::Present(4), Piece::Trailing(1)])]
    #[case("r", vec![Piece::Trailing(1)])]
    #[case("r=", vec![Piece::Attached(1, "".to_string())])]
    #[case("fp=a", vec![Piece::Present(0), Piece::Attached(3, "a".to_string())])]
    // optional value: first, middle, last
    #[case("ofg", vec![Piece::Present(2), Piece::Present(0), Piece::Present(4)])]
    #[case("oxyz", vec![Piece::Attached(2, "xyz".to_string())])]
    #[case("ofx", vec![Piece::Attached(2, "fx".to_string())])]
    #[case("o=fg", vec![Piece::Attached(2, "fg".to_string())])]
    #[case("fog", vec![Piece::Present(0), Piece::Present(2), Piece::Present(4)])]
    #[case("fo1", vec![Piece::Present(0), Piece::Attached(2, "1".to_string())])]
    #[case("fgo", vec![Piece::Present(0), Piece::Present(4), Piece::Trailing(2)])]
    #[case("or", vec![Piece::Present(2), Piece::Trailing(1)])]
    #[case("oo", vec![Piece::Present(2), Piece::Trailing(2)])]
    fn decomposes(#[case] body: &str, #[case] expected: Vec<Piece>) {
        assert_eq!(run(body).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("x")]
    #[case("fx")]
    #[case("fgx")]
    #[case("5")]
    fn not_a_cluster(#[case] body: &str) {
        assert_eq!(run(body).unwrap(), None);
    }

    #[rstest]
    #[case("f=true", 0, "true")]
    #[case("gf=", 0, "")]
    #[case("g=x", 4, "x")]
    fn flag_with_value(#[case] body: &str, #[case] option: usize, #[case] value: &str) {
        assert_eq!(
            run(body).unwrap_err(),
            ClusterError::UnexpectedValue {
                option,
                value: value.to_string(),
            }
        );
    }

    #[test]
    fn optional_value_nested_error_becomes_value() {
        // "f=x" would be an error as options, so it is the value instead.
        assert_eq!(
            run("of=x").unwrap(),
            Some(vec![Piece::Attached(2, "f=x".to_string())])
        );
    }

    #[test]
    fn custom_separator() {
        assert_eq!(
            decompose("fr:a", ":", lookup).unwrap(),
            Some(vec![Piece::Present(0), Piece::Attached(1, "a".to_string())])
        );
        assert_eq!(
            decompose("fr=a", ":", lookup).unwrap(),
            Some(vec![Piece::Present(0), Piece::Attached(1, "=a".to_string())])
        );
    }

    #[test]
    fn empty_separator() {
        assert_eq!(
            decompose("rx", "", lookup).unwrap(),
            Some(vec![Piece::Attached(1, "x".to_string())])
        );
    }

    #[test]
    fn multibyte() {
        assert_eq!(run("fé").unwrap(), None);
        assert_eq!(
            run("ré").unwrap(),
            Some(vec![Piece::Attached(1, "é".to_string())])
        );
    }
}
