//! Path pattern compilation.
//!
//! Turns `/employees/{countryCode}` into an anchored regex with one named
//! group per placeholder. A run of trailing placeholders that all have
//! defaults becomes optional, together with the `/` in front of each.

use regex::Regex;
use std::collections::BTreeMap;

use crate::routing::RouterError;
use crate::utils::strings::extract_enclosed;

/// Requirement used when a placeholder has none.
pub const DEFAULT_REQUIREMENT: &str = "[^/]+";

/// Regex source and placeholder names of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    pub regex: String,
    pub variables: Vec<String>,
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Variable { prefix: &'a str, name: String },
}

/// Normalize a path so it starts with exactly one `/`.
pub fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Compile a path pattern.
pub fn compile(
    path: &str,
    defaults: &BTreeMap<String, String>,
    requirements: &BTreeMap<String, String>,
) -> Result<CompiledPath, RouterError> {
    let tokens = tokenize(path)?;

    let mut first_optional = tokens.len();
    for (i, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Variable { name, .. } if defaults.contains_key(name) => first_optional = i,
            _ => break,
        }
    }

    let mut regex = String::from("^");
    let mut variables = Vec::new();
    let mut open_groups = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Text(text) => regex.push_str(&regex::escape(text)),
            Token::Variable { prefix, name } => {
                let requirement = match requirements.get(name) {
                    Some(req) => check_requirement(name, req)?,
                    None => DEFAULT_REQUIREMENT.to_string(),
                };

                if i >= first_optional {
                    // A fully optional path keeps its leading slash.
                    if i == 0 {
                        regex.push_str(&regex::escape(prefix));
                        regex.push_str("(?:");
                    } else {
                        regex.push_str("(?:");
                        regex.push_str(&regex::escape(prefix));
                    }
                    open_groups += 1;
                } else {
                    regex.push_str(&regex::escape(prefix));
                }

                regex.push_str(&format!("(?P<{name}>{requirement})"));
                variables.push(name.clone());
            }
        }
    }

    regex.push_str(&")?".repeat(open_groups));
    regex.push('$');

    Regex::new(&regex).map_err(|e| RouterError::InvalidPattern {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    Ok(CompiledPath { regex, variables })
}

fn tokenize(path: &str) -> Result<Vec<Token<'_>>, RouterError> {
    let invalid = |reason: String| RouterError::InvalidPattern {
        path: path.to_string(),
        reason,
    };

    let names = extract_enclosed(path, "{", "}").map_err(|e| invalid(e.to_string()))?;
    if path.matches('{').count() != names.len() || path.matches('}').count() != names.len() {
        return Err(invalid("unbalanced braces".into()));
    }

    let mut tokens = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    let mut rest = path;

    for name in &names {
        if !is_valid_name(name) {
            return Err(invalid(format!("invalid placeholder name '{name}'")));
        }
        if seen.contains(&name.as_str()) {
            return Err(invalid(format!("placeholder '{name}' used more than once")));
        }
        seen.push(name);

        let placeholder = format!("{{{name}}}");
        let Some(start) = rest.find(&placeholder) else {
            return Err(invalid(format!("placeholder '{name}' not found")));
        };

        let mut text = &rest[..start];
        let mut prefix = "";
        if text.ends_with('/') {
            prefix = &text[text.len() - 1..];
            text = &text[..text.len() - 1];
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }
        tokens.push(Token::Variable {
            prefix,
            name: name.clone(),
        });
        rest = &rest[start + placeholder.len()..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    Ok(tokens)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_requirement(name: &str, requirement: &str) -> Result<String, RouterError> {
    let requirement = requirement.trim_start_matches('^').trim_end_matches('$');
    if requirement.is_empty() {
        return Err(RouterError::InvalidRequirement {
            variable: name.to_string(),
            reason: "requirement cannot be empty".into(),
        });
    }
    Regex::new(&format!("^(?:{requirement})$")).map_err(|e| RouterError::InvalidRequirement {
        variable: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(format!("(?:{requirement})"))
}
