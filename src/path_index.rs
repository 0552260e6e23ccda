//! Package discovery
//!
//! Scans package roots once and records where every `.msg` and `.srv` file
//! lives. A directory directly below a root is a package iff it contains
//! [`PACKAGE_DESCRIPTOR`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{Result, SchemaError};

/// File that marks a directory as a package
pub const PACKAGE_DESCRIPTOR: &str = "package.xml";

/// Sub-directory and extension of message definitions
pub const MSG_DIR: &str = "msg";
pub const MSG_EXT: &str = "msg";

/// Sub-directory and extension of service definitions
pub const SRV_DIR: &str = "srv";
pub const SRV_EXT: &str = "srv";

/// Immutable `full name -> path` maps for messages and services
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    msgs: BTreeMap<String, PathBuf>,
    srvs: BTreeMap<String, PathBuf>,
}

impl PathIndex {
    /// Scan `roots` in order.
    ///
    /// When the same full name exists under several roots the first one
    /// wins. An unreadable root is an error.
    pub fn scan<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        let mut index = Self::default();

        for root in roots {
            let root = root.as_ref();
            debug!("Scanning package root {}", root.display());

            for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
                let entry = entry.map_err(|e| walk_error(root, e))?;
                let pkg_path = entry.path();
                if !entry.file_type().is_dir() || !is_package(pkg_path) {
                    continue;
                }
                let Some(pkg_name) = pkg_path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };

                trace!("Found package {} at {}", pkg_name, pkg_path.display());
                collect_definitions(&mut index.msgs, pkg_name, &pkg_path.join(MSG_DIR), MSG_EXT);
                collect_definitions(&mut index.srvs, pkg_name, &pkg_path.join(SRV_DIR), SRV_EXT);
            }
        }

        debug!(
            "Indexed {} messages and {} services",
            index.msgs.len(),
            index.srvs.len()
        );
        Ok(index)
    }

    /// Path of a message definition
    pub fn msg_path(&self, full_name: &str) -> Option<&Path> {
        self.msgs.get(full_name).map(PathBuf::as_path)
    }

    /// Path of a service definition
    pub fn srv_path(&self, full_name: &str) -> Option<&Path> {
        self.srvs.get(full_name).map(PathBuf::as_path)
    }

    /// All message full names, sorted
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.msgs.keys().map(String::as_str)
    }

    /// All service full names, sorted
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.srvs.keys().map(String::as_str)
    }

    pub fn message_count(&self) -> usize {
        self.msgs.len()
    }

    pub fn service_count(&self) -> usize {
        self.srvs.len()
    }
}

/// Whether `dir` directly contains the package descriptor
pub fn is_package(dir: &Path) -> bool {
    dir.join(PACKAGE_DESCRIPTOR).is_file()
}

fn collect_definitions(
    map: &mut BTreeMap<String, PathBuf>,
    pkg_name: &str,
    dir: &Path,
    ext: &str,
) {
    if !dir.is_dir() {
        return;
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map(|e| e != ext).unwrap_or(true) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let full_name = format!("{}/{}", pkg_name, stem);
        if let Some(existing) = map.get(&full_name) {
            debug!(
                "{} at {} is shadowed by {}",
                full_name,
                path.display(),
                existing.display()
            );
            continue;
        }
        map.insert(full_name, path.to_path_buf());
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> SchemaError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
    SchemaError::io(path, source)
}
