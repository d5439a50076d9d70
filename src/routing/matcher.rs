//! Compiled route table.
//!
//! # Responsibilities
//! - Hold one anchored regex per route, in registration order
//! - Resolve `(method, path, headers)` to the route's attributes plus captured params
//! - Report the verbs allowed on a path when only the verb is wrong
//!
//! # Design Decisions
//! - First match wins (registration order)
//! - Paths are percent-decoded before matching, so params arrive decoded
//! - A route whose condition fails is skipped and does not count towards 405
//! - `HEAD` is served by `GET` routes
//! - Immutable after construction, shared via `Arc`

use axum::http::HeaderMap;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::routing::definition::{
    HttpMethod, RouteAttributes, RouteCondition, RouteDefinition, ROUTE,
};
use crate::routing::path;
use crate::routing::RouterError;

/// A route in its serializable, compiled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub regex: String,
    pub variables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RouteCondition>,
    pub attributes: RouteAttributes,
}

impl CompiledRoute {
    pub fn compile(route: &RouteDefinition) -> Result<Self, RouterError> {
        let compiled = path::compile(&route.path, &route.defaults, &route.requirements)?;
        if let Some(condition) = &route.condition {
            compile_condition(condition)?;
        }
        Ok(Self {
            name: route.name.clone(),
            method: route.method,
            path: route.path.clone(),
            regex: compiled.regex,
            variables: compiled.variables,
            condition: route.condition.clone(),
            attributes: route.attributes(),
        })
    }
}

fn compile_condition(condition: &RouteCondition) -> Result<Regex, RouterError> {
    Regex::new(&condition.pattern).map_err(|e| RouterError::InvalidCondition {
        header: condition.header.clone(),
        reason: e.to_string(),
    })
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute {
    pub name: String,
    pub attributes: RouteAttributes,
}

/// Why a request did not match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no route matches the request")]
    NotFound,

    #[error("method not allowed, expected one of: {}", allowed.join(", "))]
    MethodNotAllowed { allowed: Vec<String> },
}

#[derive(Debug)]
struct Entry {
    route: CompiledRoute,
    regex: Regex,
    condition: Option<Regex>,
}

impl Entry {
    fn satisfies(&self, headers: &HeaderMap) -> bool {
        let (Some(condition), Some(regex)) = (&self.route.condition, &self.condition) else {
            return true;
        };
        let value = headers
            .get(condition.header.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        regex.is_match(value)
    }
}

/// Immutable route matcher.
#[derive(Debug)]
pub struct Matcher {
    routes: Vec<Entry>,
}

impl Matcher {
    /// Compile route definitions in registration order.
    pub fn compile(routes: &[RouteDefinition]) -> Result<Self, RouterError> {
        let compiled = routes
            .iter()
            .map(CompiledRoute::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_compiled(compiled)
    }

    /// Instantiate from already compiled routes (e.g. loaded from cache).
    pub fn from_compiled(routes: Vec<CompiledRoute>) -> Result<Self, RouterError> {
        let routes = routes
            .into_iter()
            .map(|route| {
                let regex = Regex::new(&route.regex).map_err(|e| RouterError::InvalidPattern {
                    path: route.path.clone(),
                    reason: e.to_string(),
                })?;
                let condition = route.condition.as_ref().map(compile_condition).transpose()?;
                Ok(Entry {
                    route,
                    regex,
                    condition,
                })
            })
            .collect::<Result<Vec<_>, RouterError>>()?;
        Ok(Self { routes })
    }

    pub fn routes(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter().map(|entry| &entry.route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a path without request headers. Conditional routes only match
    /// when their pattern accepts an empty header.
    pub fn match_route(&self, method: &str, path: &str) -> Result<MatchedRoute, MatchError> {
        self.match_request(method, path, &HeaderMap::new())
    }

    /// Resolve a request.
    ///
    /// Captured placeholders overlay the route defaults; `_route` is set to
    /// the route name.
    pub fn match_request(
        &self,
        method: &str,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<MatchedRoute, MatchError> {
        let path = percent_decode_str(path).decode_utf8_lossy();
        let mut allowed: Vec<String> = Vec::new();

        for entry in &self.routes {
            let route = &entry.route;
            let Some(captures) = entry.regex.captures(&path) else {
                continue;
            };
            if !entry.satisfies(headers) {
                continue;
            }

            if !route.method.accepts(method) {
                let verb = route.method.as_str().to_string();
                if !allowed.contains(&verb) {
                    allowed.push(verb);
                }
                continue;
            }

            let mut attributes = route.attributes.clone();
            for name in &route.variables {
                if let Some(value) = captures.name(name).filter(|m| !m.as_str().is_empty()) {
                    attributes.insert(name.clone(), Value::String(value.as_str().to_string()));
                }
            }
            attributes.insert(ROUTE.into(), Value::String(route.name.clone()));

            return Ok(MatchedRoute {
                name: route.name.clone(),
                attributes,
            });
        }

        if allowed.is_empty() {
            Err(MatchError::NotFound)
        } else {
            Err(MatchError::MethodNotAllowed { allowed })
        }
    }
}
