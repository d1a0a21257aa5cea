pub mod download;

use anyhow::{Result, bail};

use crate::pricing::Filter;

/// Build a [`Filter`] from `attribute=pattern` command line terms.
///
/// Only the first `=` separates name from pattern, so patterns may contain `=`.
pub fn filter_from_terms<S: AsRef<str>>(terms: &[S]) -> Result<Filter> {
    let mut pairs = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.as_ref();
        let Some((name, pattern)) = term.split_once('=') else {
            bail!("filter term '{term}' is not of the form attribute=pattern");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("filter term '{term}' has an empty attribute name");
        }
        pairs.push((name.to_string(), pattern.to_string()));
    }
    Ok(Filter::from_pairs(pairs)?)
}
