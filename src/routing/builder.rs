//! Route table builder.
//!
//! # Responsibilities
//! - Accumulate route definitions (verb, path, target, options)
//! - Merge table-wide default params and requirements into each route
//! - Build a `Matcher`, in memory or through the compiled artifact cache
//!
//! # Design Decisions
//! - Table-wide defaults and the base URL are applied at build time, so the
//!   order of builder calls does not matter
//! - Caller-specific defaults and requirements win over table-wide ones
//! - The cache is only used in production with a cache directory

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::schema::Environment;
use crate::observability::metrics;
use crate::routing::cache::{self, CompiledRouteTable, RouteCache};
use crate::routing::definition::{HttpMethod, RouteDefinition, RouteOptions};
use crate::routing::matcher::{CompiledRoute, Matcher};
use crate::routing::path;
use crate::routing::RouterError;

/// Accumulates routes and builds the matcher.
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    app_name: String,
    environment: Environment,
    cache_dir: Option<PathBuf>,
    fingerprint_check: bool,
    base_url: String,
    default_params: BTreeMap<String, String>,
    default_requirements: BTreeMap<String, String>,
    routes: Vec<RouteDefinition>,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self {
            app_name: "Boot".to_string(),
            environment: Environment::Dev,
            cache_dir: None,
            fingerprint_check: true,
            base_url: String::new(),
            default_params: BTreeMap::new(),
            default_requirements: BTreeMap::new(),
            routes: Vec::new(),
        }
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Verify a cached artifact against the current routes before using it.
    /// When disabled, the artifact on disk is trusted as is.
    pub fn fingerprint_check(mut self, enabled: bool) -> Self {
        self.fingerprint_check = enabled;
        self
    }

    /// Prefix prepended to every route path.
    pub fn base_url(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.base_url = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn default_route_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn default_route_requirements<I, K, V>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_requirements
            .extend(requirements.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn get(self, path: &str, service_id: &str, method: &str, options: RouteOptions) -> Self {
        self.add(HttpMethod::Get, path, service_id, method, options)
    }

    pub fn post(self, path: &str, service_id: &str, method: &str, options: RouteOptions) -> Self {
        self.add(HttpMethod::Post, path, service_id, method, options)
    }

    pub fn put(self, path: &str, service_id: &str, method: &str, options: RouteOptions) -> Self {
        self.add(HttpMethod::Put, path, service_id, method, options)
    }

    pub fn delete(self, path: &str, service_id: &str, method: &str, options: RouteOptions) -> Self {
        self.add(HttpMethod::Delete, path, service_id, method, options)
    }

    pub fn patch(self, path: &str, service_id: &str, method: &str, options: RouteOptions) -> Self {
        self.add(HttpMethod::Patch, path, service_id, method, options)
    }

    /// Register a route. A route with the same name is replaced.
    pub fn add(
        mut self,
        method: HttpMethod,
        path: &str,
        service_id: &str,
        method_name: &str,
        options: RouteOptions,
    ) -> Self {
        let RouteOptions {
            name,
            defaults,
            requirements,
            condition,
            policy,
        } = options;

        if let Some(pos) = self.routes.iter().position(|r| r.name == name) {
            tracing::debug!(route = %name, "Replacing previously registered route");
            self.routes.remove(pos);
        }

        self.routes.push(RouteDefinition {
            name,
            method,
            path: path::normalize(path),
            service_id: service_id.to_string(),
            method_name: method_name.to_string(),
            defaults,
            requirements,
            condition,
            policy,
        });
        self
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Routes as they will be compiled: base URL and table defaults applied.
    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.routes
            .iter()
            .map(|route| {
                let mut route = route.clone();
                route.path = self.prefixed(&route.path);

                let mut defaults = self.default_params.clone();
                defaults.extend(route.defaults);
                route.defaults = defaults;

                let mut requirements = self.default_requirements.clone();
                requirements.extend(route.requirements);
                route.requirements = requirements;
                route
            })
            .collect()
    }

    fn prefixed(&self, path: &str) -> String {
        match (self.base_url.is_empty(), path) {
            (true, _) => path.to_string(),
            (false, "/") => self.base_url.clone(),
            (false, _) => format!("{}{}", self.base_url, path),
        }
    }

    /// Whether the artifact cache is in play.
    pub fn is_optimized(&self) -> bool {
        self.environment.is_production() && self.cache_dir.is_some()
    }

    /// Build the matcher.
    pub fn build(&self) -> Result<Matcher, RouterError> {
        let definitions = self.definitions();

        let Some(dir) = self.cache_dir.as_ref().filter(|_| self.is_optimized()) else {
            metrics::record_route_cache("disabled");
            return Matcher::compile(&definitions);
        };

        let cache = RouteCache::new(
            dir,
            cache::class_name(&self.app_name, self.environment.as_str(), definitions.len()),
        );

        let mut compiled: Option<Vec<CompiledRoute>> = None;
        match cache.load() {
            Ok(Some(table)) => {
                if !self.fingerprint_check {
                    return load_cached(&cache, table);
                }

                let current = compile_all(&definitions)?;
                if table.verify(&cache::fingerprint(&current)?)? {
                    return load_cached(&cache, table);
                }

                metrics::record_route_cache("stale");
                tracing::warn!(
                    artifact = %cache.path().display(),
                    "Compiled route table is stale, recompiling"
                );
                compiled = Some(current);
            }
            Ok(None) => metrics::record_route_cache("miss"),
            Err(e) => {
                metrics::record_route_cache("unreadable");
                tracing::warn!(
                    artifact = %cache.path().display(),
                    error = %e,
                    "Compiled route table is unreadable, recompiling"
                );
            }
        }

        let routes = match compiled {
            Some(routes) => routes,
            None => compile_all(&definitions)?,
        };
        let table = CompiledRouteTable::new(cache.class_name().to_string(), routes)?;
        let path = cache.store(&table)?;
        tracing::info!(
            artifact = %path.display(),
            routes = table.routes.len(),
            "Compiled route table written"
        );

        Matcher::from_compiled(table.routes)
    }
}

fn load_cached(cache: &RouteCache, table: CompiledRouteTable) -> Result<Matcher, RouterError> {
    metrics::record_route_cache("hit");
    tracing::debug!(artifact = %cache.path().display(), "Loaded compiled route table");
    Matcher::from_compiled(table.routes)
}

fn compile_all(definitions: &[RouteDefinition]) -> Result<Vec<CompiledRoute>, RouterError> {
    definitions.iter().map(CompiledRoute::compile).collect()
}
