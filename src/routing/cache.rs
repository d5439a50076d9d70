//! Compiled route table artifact.
//!
//! # Responsibilities
//! - Derive the artifact name from app, environment and route count
//! - Fingerprint the compiled table so stale artifacts can be detected
//! - Load and persist the artifact as JSON
//!
//! # Design Decisions
//! - Writes go to a temp file in the same directory, then rename
//! - Concurrent writers race; the last rename wins
//! - A missing artifact is not an error

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::routing::matcher::CompiledRoute;
use crate::routing::RouterError;
use crate::utils::strings::camel_case;

/// Artifact class name: `Compiled{App}{Env}{count}Router`.
pub fn class_name(app_name: &str, environment: &str, route_count: usize) -> String {
    format!(
        "Compiled{}{}{}Router",
        camel_case(app_name, true),
        camel_case(environment, true),
        route_count
    )
}

/// Content fingerprint of a compiled route table.
pub fn fingerprint(routes: &[CompiledRoute]) -> Result<String, RouterError> {
    let bytes = serde_json::to_vec(routes).map_err(RouterError::CacheFormat)?;
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes).to_string())
}

/// Serialized form of the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRouteTable {
    pub class_name: String,
    pub fingerprint: String,
    pub routes: Vec<CompiledRoute>,
}

impl CompiledRouteTable {
    pub fn new(class_name: String, routes: Vec<CompiledRoute>) -> Result<Self, RouterError> {
        let fingerprint = fingerprint(&routes)?;
        Ok(Self {
            class_name,
            fingerprint,
            routes,
        })
    }

    /// Whether both the stored fingerprint and the routes actually held
    /// match `expected`.
    pub fn verify(&self, expected: &str) -> Result<bool, RouterError> {
        Ok(self.fingerprint == expected && fingerprint(&self.routes)? == expected)
    }
}

/// Location of one artifact on disk.
#[derive(Debug, Clone)]
pub struct RouteCache {
    dir: PathBuf,
    class_name: String,
}

impl RouteCache {
    pub fn new(dir: impl Into<PathBuf>, class_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            class_name: class_name.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.class_name))
    }

    /// Read the artifact, `None` when it does not exist.
    pub fn load(&self) -> Result<Option<CompiledRouteTable>, RouterError> {
        let path = self.path();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RouterError::CacheIo { path, source: e }),
        };
        let table = serde_json::from_slice(&content).map_err(RouterError::CacheFormat)?;
        Ok(Some(table))
    }

    /// Persist the artifact atomically.
    pub fn store(&self, table: &CompiledRouteTable) -> Result<PathBuf, RouterError> {
        let path = self.path();
        let io_err = |source: io::Error| RouterError::CacheIo {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let content = serde_json::to_vec_pretty(table).map_err(RouterError::CacheFormat)?;

        let tmp = temp_path(&self.dir, &self.class_name);
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&content)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        Ok(path)
    }
}

fn temp_path(dir: &Path, class_name: &str) -> PathBuf {
    dir.join(format!(".{}.{}.tmp", class_name, Uuid::new_v4().simple()))
}
