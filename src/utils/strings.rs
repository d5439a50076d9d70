//! Case conversion and substring extraction.
//!
//! Used by the route table builder to derive artifact class names and to pull
//! `{placeholder}` names out of route paths.

use thiserror::Error;

/// Error returned by [`extract_enclosed`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StringError {
    /// One of the delimiters was empty.
    #[error("The opening and end character cannot be empty!")]
    MissingDelimiter,
}

/// Convert `foo_bar` to `FooBar` (or `fooBar` when `capitalized` is false).
///
/// Dashes and spaces are treated like underscores so that names such as
/// `simple-micro service` still produce a usable identifier.
pub fn camel_case(input: &str, capitalized: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = capitalized;
    for c in input.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = true;
            continue;
        }
        if out.is_empty() && !capitalized {
            out.push(c.to_ascii_lowercase());
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    out
}

/// Return every substring found between `open` and `close`.
///
/// Only the first character of each delimiter is used. Enclosed values never
/// contain the closing character.
pub fn extract_enclosed(
    haystack: &str,
    open: &str,
    close: &str,
) -> Result<Vec<String>, StringError> {
    let (Some(open), Some(close)) = (open.chars().next(), close.chars().next()) else {
        return Err(StringError::MissingDelimiter);
    };

    let mut found = Vec::new();
    let mut rest = haystack;
    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len_utf8()..];
        match after.find(close) {
            Some(end) => {
                found.push(after[..end].to_string());
                rest = &after[end + close.len_utf8()..];
            }
            None => break,
        }
    }
    Ok(found)
}
