use regex::{Regex, RegexBuilder};

use super::ProductRecord;
use crate::error::PricingError;

/// Case-insensitive wildcard pattern for a single attribute value.
///
/// `*` matches any run of characters (including none), `?` exactly one.
/// A backslash makes the next character literal (`\*`, `\?`, `\\`); a trailing
/// backslash is itself literal. Everything else matches literally.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self, PricingError> {
        let regex = RegexBuilder::new(&glob_to_regex(pattern))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| PricingError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => push_literal(&mut out, chars.next().unwrap_or('\\')),
            other => push_literal(&mut out, other),
        }
    }

    out.push('$');
    out
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Attribute-name to pattern filter. Every term must hold for a record to
/// match; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    terms: Vec<(String, GlobPattern)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from `(attribute, pattern)` pairs. A repeated attribute
    /// keeps its last pattern.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |filter, (key, pattern)| filter.with(key, pattern.as_ref()))
    }

    pub fn with(mut self, attribute: impl Into<String>, pattern: &str) -> Result<Self, PricingError> {
        let attribute = attribute.into();
        let pattern = GlobPattern::new(pattern)?;

        match self.terms.iter_mut().find(|(name, _)| *name == attribute) {
            Some(term) => term.1 = pattern,
            None => self.terms.push((attribute, pattern)),
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &GlobPattern)> {
        self.terms.iter().map(|(name, pattern)| (name.as_str(), pattern))
    }

    /// Stops at the first attribute that is missing or does not match.
    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.terms.iter().all(|(name, pattern)| {
            record
                .attribute(name)
                .is_some_and(|value| pattern.is_match(value))
        })
    }

    pub fn retain_matching(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
