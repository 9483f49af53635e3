use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::{Error, Result};

static NON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());
static NON_ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\W_]+").unwrap());

const DELIMITERS: &[char] = &['[', ']', '"', '`', '\''];

/// Strip surrounding whitespace and identifier delimiters (`[..]`, `".."`, `` `..` ``)
pub fn strip_delimiters(name: &str) -> &str {
    name.trim().trim_matches(DELIMITERS).trim()
}

/// Collapse every run of non-identifier characters to `_`
pub fn to_valid_name(name: &str) -> String {
    NON_IDENTIFIER
        .replace_all(strip_delimiters(name), "_")
        .into_owned()
}

/// Short lowercase slug used as a table alias
pub fn to_alias(name: &str) -> String {
    NON_ALIAS
        .replace_all(&strip_delimiters(name).to_lowercase(), "_")
        .into_owned()
}

/// Like [`to_valid_name`], but fails when nothing usable is left
pub fn to_identifier(name: &str) -> Result<String> {
    let ident = to_valid_name(name);
    if ident.trim_matches('_').is_empty() {
        return Err(Error::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    Ok(ident)
}

/// `base`, or the first free `base_2`, `base_3`, ... if `base` is taken.
/// The returned name is added to `taken`.
pub fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while taken.contains(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    taken.insert(name.clone());
    name
}
