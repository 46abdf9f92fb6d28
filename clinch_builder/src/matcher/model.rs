use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

use crate::api::Value;
use crate::model::Range;
use crate::parser::{ArgId, CommandId, MatchedArg, Slot};

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum CloseError {
    #[error("too few values provided (provided={provided}, expected={expected}).")]
    TooFewValues { provided: usize, expected: usize },

    #[error("too many values provided (provided={provided}, expected={expected}).")]
    TooManyValues { provided: usize, expected: usize },
}

/// Collects the value tokens of one option occurrence against its arity.
#[derive(Debug)]
pub(super) struct ValueBuffer {
    arity: Range,
    values: Vec<String>,
}

impl ValueBuffer {
    pub(super) fn new(arity: Range) -> Self {
        Self {
            arity,
            values: Vec::default(),
        }
    }

    pub(super) fn push(&mut self, value: String) {
        self.values.push(value);
    }

    pub(super) fn is_open(&self) -> bool {
        self.arity.allows_more(self.values.len())
    }

    pub(super) fn needs_more(&self) -> bool {
        self.values.len() < self.arity.min_count()
    }

    pub(super) fn close(self) -> Result<Vec<String>, CloseError> {
        if self.needs_more() {
            return Err(CloseError::TooFewValues {
                provided: self.values.len(),
                expected: self.arity.min_count(),
            });
        }

        match self.arity.max_count() {
            Some(max) if self.values.len() > max => Err(CloseError::TooManyValues {
                provided: self.values.len(),
                expected: max,
            }),
            _ => Ok(self.values),
        }
    }
}

/// Everything matched against one command of the chain.
#[derive(Debug)]
pub(crate) struct MatchState {
    pub(crate) command: CommandId,
    pub(crate) matched: Vec<MatchedArg>,
    slots: HashMap<Slot, usize>,
    pub(crate) defaults: HashMap<Slot, Vec<Value>>,
    pub(crate) positional_cursor: usize,
    pub(crate) unmatched: Vec<String>,
    pub(crate) usage_help_requested: bool,
    pub(crate) version_help_requested: bool,
}

impl MatchState {
    pub(crate) fn new(command: CommandId) -> Self {
        Self {
            command,
            matched: Vec::default(),
            slots: HashMap::default(),
            defaults: HashMap::default(),
            positional_cursor: 0,
            unmatched: Vec::default(),
            usage_help_requested: false,
            version_help_requested: false,
        }
    }

    pub(crate) fn occurrences(&self, slot: Slot) -> usize {
        self.slots
            .get(&slot)
            .map(|i| self.matched[*i].occurrences())
            .unwrap_or(0)
    }

    pub(crate) fn entry(&mut self, slot: Slot) -> &mut MatchedArg {
        let index = match self.slots.get(&slot) {
            Some(index) => *index,
            None => {
                self.matched.push(MatchedArg::new(ArgId::new(self.command, slot)));
                self.slots.insert(slot, self.matched.len() - 1);
                self.matched.len() - 1
            }
        };

        &mut self.matched[index]
    }
}

/// Strip one pair of surrounding double quotes.
pub(crate) fn trim_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Split `value` at every match of `regex`.
/// Unless `split_quoted` is set, matches inside a double quoted section are skipped.
pub(crate) fn split_value(value: &str, regex: &Regex, split_quoted: bool) -> Vec<String> {
    if split_quoted {
        return regex.split(value).map(str::to_string).collect();
    }

    let quoted = quoted_sections(value);
    let mut parts = Vec::default();
    let mut start = 0;

    for found in regex.find_iter(value) {
        if found.start() == found.end() {
            continue;
        }

        if quoted
            .iter()
            .any(|(open, close)| *open < found.start() && found.start() < *close)
        {
            continue;
        }

        parts.push(value[start..found.start()].to_string());
        start = found.end();
    }

    parts.push(value[start..].to_string());
    parts
}

// Byte offsets of each opening and closing quote; an unterminated section runs to the end.
fn quoted_sections(value: &str) -> Vec<(usize, usize)> {
    let mut sections = Vec::default();
    let mut open: Option<usize> = None;

    for (offset, c) in value.char_indices() {
        if c == '"' {
            match open.take() {
                Some(start) => sections.push((start, offset)),
                None => open = Some(offset),
            }
        }
    }

    if let Some(start) = open {
        sections.push((start, value.len()));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[rstest]
    #[case(Range::at_least(0), 0, true)]
    #[case(Range::at_least(0), 1, true)]
    #[case(Range::at_least(1), 0, false)]
    #[case(Range::at_least(1), 1, true)]
    #[case(Range::at_least(1), 2, true)]
    #[case(Range::at_least(10), 2, false)]
    #[case(Range::new(0, 2), 0, true)]
    #[case(Range::new(0, 2), 1, true)]
    #[case(Range::new(1, 2), 0, false)]
    #[case(Range::new(1, 2), 1, true)]
    #[case(Range::new(1, 2), 2, true)]
    #[case(Range::new(10, 20), 2, false)]
    fn value_buffer_lower(#[case] arity: Range, #[case] feed: usize, #[case] expected_ok: bool) {
        let mut buffer = ValueBuffer::new(arity);
        assert!(buffer.is_open());
        let tokens: Vec<String> = (0..feed).map(|i| i.to_string()).collect();

        for token in &tokens {
            buffer.push(token.clone());
        }

        assert_eq!(buffer.is_open(), arity.allows_more(feed));
        assert_eq!(buffer.needs_more(), !expected_ok);

        if expected_ok {
            assert_eq!(buffer.close().unwrap(), tokens);
        } else {
            assert_eq!(
                buffer.close().unwrap_err(),
                CloseError::TooFewValues {
                    provided: feed,
                    expected: arity.min_count(),
                }
            );
        }
    }

    #[rstest]
    #[case(Range::exactly(0), 0, true)]
    #[case(Range::exactly(0), 1, false)]
    #[case(Range::optional(), 0, true)]
    #[case(Range::optional(), 1, true)]
    #[case(Range::optional(), 2, false)]
    #[case(Range::new(0, 10), 20, false)]
    fn value_buffer_upper(#[case] arity: Range, #[case] feed: usize, #[case] expected_ok: bool) {
        let upper = arity.max_count().unwrap();
        let mut buffer = ValueBuffer::new(arity);
        assert_eq!(buffer.is_open(), upper > 0);
        let tokens: Vec<String> = (0..feed).map(|_| thread_rng().gen::<u16>().to_string()).collect();

        for token in &tokens {
            buffer.push(token.clone());
        }

        assert!(!buffer.needs_more());

        if expected_ok {
            assert_eq!(buffer.is_open(), upper > feed);
            assert_eq!(buffer.close().unwrap(), tokens);
        } else {
            assert_eq!(
                buffer.close().unwrap_err(),
                CloseError::TooManyValues {
                    provided: feed,
                    expected: upper,
                }
            );
        }
    }

    #[test]
    fn match_state_entry() {
        let mut state = MatchState::new(CommandId::root());
        assert_eq!(state.occurrences(Slot::Option(1)), 0);

        state.entry(Slot::Option(1)).record_occurrence();
        state.entry(Slot::Positional(0)).record_occurrence();
        state.entry(Slot::Option(1)).record_occurrence();

        assert_eq!(state.occurrences(Slot::Option(1)), 2);
        assert_eq!(state.occurrences(Slot::Positional(0)), 1);
        assert_eq!(state.matched.len(), 2);
        assert_eq!(state.matched[0].id(), ArgId::new(CommandId::root(), Slot::Option(1)));
    }

    #[rstest]
    #[case("abc", "abc")]
    #[case("\"abc\"", "abc")]
    #[case("\"\"", "")]
    #[case("\"", "\"")]
    #[case("\"abc", "\"abc")]
    #[case("'abc'", "'abc'")]
    fn trim(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(trim_quotes(value), expected);
    }

    #[rstest]
    #[case("a,b,c", false, vec!["a", "b", "c"])]
    #[case("a,\"b,c\",d", false, vec!["a", "\"b,c\"", "d"])]
    #[case("a,\"b,c\",d", true, vec!["a", "\"b", "c\"", "d"])]
    #[case("a,\"b,c", false, vec!["a", "\"b,c"])]
    #[case("", false, vec![""])]
    #[case("a,", false, vec!["a", ""])]
    fn split(#[case] value: &str, #[case] split_quoted: bool, #[case] expected: Vec<&str>) {
        let regex = Regex::new(",").unwrap();
        assert_eq!(split_value(value, &regex, split_quoted), expected);
    }
}
