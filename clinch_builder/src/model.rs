use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// The cardinality of values to match for an option/positional parameter.
///
/// For options, the range describes how many value tokens a single occurrence consumes.
/// For positional parameters, the same type describes both the arity and the index span.
///
/// Written compactly as `N`, `N..M` or `N..*` (see [`Range::parse`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    min: usize,
    max: Option<usize>,
}

/// The arity text could not be interpreted.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid range '{text}': {reason}.")]
pub struct FormatError {
    text: String,
    reason: &'static str,
}

impl FormatError {
    fn new(text: &str, reason: &'static str) -> Self {
        Self {
            text: text.to_string(),
            reason,
        }
    }

    /// The text which failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Range {
    /// `min..max` (inclusive).
    ///
    /// ### Panics
    /// When `max < min`.
    /// Use [`Range::parse`] for a fallible construction.
    pub fn new(min: usize, max: usize) -> Self {
        assert!(min <= max, "range max ({max}) must not be less than min ({min})");
        Self {
            min,
            max: Some(max),
        }
    }

    /// Precisely `n`.
    pub fn exactly(n: usize) -> Self {
        Self::new(n, n)
    }

    /// `n..*`.
    pub fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    /// `0..1`.
    pub fn optional() -> Self {
        Self::new(0, 1)
    }

    /// Parse the compact range grammar: `N`, `N..M`, `N..*`, or `*` (short for `0..*`).
    ///
    /// ### Example
    /// ```
    /// # use clinch_builder as clinch;
    /// use clinch::Range;
    ///
    /// assert_eq!(Range::parse("2").unwrap(), Range::exactly(2));
    /// assert_eq!(Range::parse("0..1").unwrap(), Range::optional());
    /// assert_eq!(Range::parse("1..*").unwrap(), Range::at_least(1));
    /// assert!(Range::parse("3..1").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(FormatError::new(text, "empty"));
        }

        if trimmed == "*" {
            return Ok(Self::at_least(0));
        }

        match trimmed.split_once("..") {
            Some((left, right)) => {
                let min = parse_bound(text, left)?;

                if right.trim() == "*" {
                    Ok(Self::at_least(min))
                } else {
                    let max = parse_bound(text, right)?;

                    if max < min {
                        Err(FormatError::new(text, "max is less than min"))
                    } else {
                        Ok(Self::new(min, max))
                    }
                }
            }
            None => Ok(Self::exactly(parse_bound(text, trimmed)?)),
        }
    }

    /// The minimum count.
    pub fn min_count(&self) -> usize {
        self.min
    }

    /// The maximum count, or `None` when unbounded.
    pub fn max_count(&self) -> Option<usize> {
        self.max
    }

    /// Whether the range has no upper bound (`N..*`).
    pub fn is_variable(&self) -> bool {
        self.max.is_none()
    }

    /// Whether `min <= count <= max`.
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min
            && match self.max {
                Some(max) => count <= max,
                None => true,
            }
    }

    /// Whether `count` is still below the maximum, meaning another value may be added.
    pub fn allows_more(&self, count: usize) -> bool {
        match self.max {
            Some(max) => count < max,
            None => true,
        }
    }

    /// The number of values in the span `max - min + 1`, or `None` when unbounded.
    pub(crate) fn span(&self) -> Option<usize> {
        self.max.map(|max| (max - self.min).saturating_add(1))
    }
}

fn parse_bound(text: &str, bound: &str) -> Result<usize, FormatError> {
    usize::from_str(bound.trim()).map_err(|_| FormatError::new(text, "bound is not a non-negative integer"))
}

impl FromStr for Range {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Range::parse(value)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{min}..{max}", min = self.min),
            None => write!(f, "{min}..*", min = self.min),
        }
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Range {
    fn cmp(&self, other: &Self) -> Ordering {
        // An unbounded max sorts after every bounded one.
        let max_key = |range: &Range| range.max.unwrap_or(usize::MAX);
        self.min
            .cmp(&other.min)
            .then_with(|| max_key(self).cmp(&max_key(other)))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::Range;
    use rand::{distributions::Standard, prelude::Distribution, Rng};

    impl Distribution<Range> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Range {
            let min: u8 = rng.gen();

            match rng.gen_range(0..2) {
                0 => Range::new(min as usize, min as usize + rng.gen::<u8>() as usize),
                1 => Range::at_least(min as usize),
                _ => unreachable!("internal error - impossible gen_range()"),
            }
        }
    }
}
