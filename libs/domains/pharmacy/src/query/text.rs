//! Case-insensitive text matching for name, description and address filters.
//!
//! A search term may be anchored: `^term` matches at the start of the stored
//! value, `term$` at the end, `^term$` the whole value. Everything else in the
//! term is literal, so user input never reaches the store as regex syntax.

/// How a term is matched against a stored string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPattern {
    Contains(String),
    Prefix(String),
    Suffix(String),
    Exact(String),
}

impl TextPattern {
    /// Read anchors off a raw search term; blank terms yield `None` (no filter).
    pub fn parse(raw: &str) -> Option<Self> {
        let term = raw.trim();
        let (prefix, rest) = match term.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, term),
        };
        let (suffix, core) = match rest.strip_suffix('$') {
            Some(core) => (true, core),
            None => (false, rest),
        };

        if core.is_empty() {
            return None;
        }

        let core = core.to_string();
        Some(match (prefix, suffix) {
            (true, true) => TextPattern::Exact(core),
            (true, false) => TextPattern::Prefix(core),
            (false, true) => TextPattern::Suffix(core),
            (false, false) => TextPattern::Contains(core),
        })
    }

    pub fn contains(term: impl Into<String>) -> Self {
        TextPattern::Contains(term.into())
    }

    pub fn term(&self) -> &str {
        match self {
            TextPattern::Contains(t)
            | TextPattern::Prefix(t)
            | TextPattern::Suffix(t)
            | TextPattern::Exact(t) => t,
        }
    }

    /// Escaped regular expression; pair with the `i` option when matching
    pub fn to_regex(&self) -> String {
        let escaped = regex::escape(self.term());
        match self {
            TextPattern::Contains(_) => escaped,
            TextPattern::Prefix(_) => format!("^{}", escaped),
            TextPattern::Suffix(_) => format!("{}$", escaped),
            TextPattern::Exact(_) => format!("^{}$", escaped),
        }
    }
}
