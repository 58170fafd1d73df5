use crate::error::RegroupError;
use regex::Regex;

/// Default pattern for the numeric identifier embedded in a filename
pub const DEFAULT_ID_REGEX: &str = r"\d{2,5}";

/// A compiled identifier pattern.
///
/// Holds two compiled forms of the same user pattern: a plain one used to
/// test whether a name carries an identifier at all, and an anchored
/// `^.*(?:pattern)` form whose match end marks the close of the full
/// identifier. The greedy `.*` makes the anchored form settle on the final
/// place the pattern can match.
#[derive(Debug, Clone)]
pub struct IdPattern {
    source: String,
    search: Regex,
    through_last: Regex,
}

impl IdPattern {
    pub fn new(pattern: &str) -> Result<Self, RegroupError> {
        let invalid = |source| RegroupError::InvalidPattern {
            what: "identifier",
            pattern: pattern.to_string(),
            source,
        };
        let search = Regex::new(pattern).map_err(invalid)?;
        let through_last = Regex::new(&format!("^(?s:.*)(?:{pattern})")).map_err(invalid)?;

        Ok(Self {
            source: pattern.to_string(),
            search,
            through_last,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The unanchored pattern, for filtering names that carry no identifier
    pub fn regex(&self) -> &Regex {
        &self.search
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.search.is_match(name)
    }

    /// The text of the last non-overlapping match of the pattern
    pub fn last_match<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.search.find_iter(name).last().map(|m| m.as_str())
    }

    /// Byte offset just past the full identifier of `name`, if any.
    ///
    /// For `a_long_group_1965_200_a.jpg` with `\d{2,5}` this is the offset
    /// after `200`.
    pub fn full_identifier_end(&self, name: &str) -> Option<usize> {
        self.through_last.find(name).map(|m| m.end())
    }

    /// The full identifier itself: every character up to and including the
    /// final identifier match
    pub fn full_identifier<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.full_identifier_end(name).map(|end| &name[..end])
    }
}

/// Zero-pad `value` to at least `width` digits. Wider values are kept whole.
pub fn format_id(value: u64, width: usize) -> String {
    format!("{value:0width$}")
}
