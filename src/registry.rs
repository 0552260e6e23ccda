//! Definition Registry
//!
//! Resolves `package/Type` names to fully fingerprinted specs. Messages are
//! memoized for the lifetime of the registry; services are rebuilt on every
//! load but register their request/response messages like any other.
//!
//! Loading takes `&mut self`. To share one registry between threads, wrap
//! it in a `Mutex`: loads are then serialized and each full name is
//! computed at most once.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::{debug, trace};

use crate::config::RosmsgConfig;
use crate::error::{DefinitionKind, Result, SchemaError};
use crate::fingerprint::{self, DefinitionResolver};
use crate::parser;
use crate::path_index::PathIndex;
use crate::schema::{split_full_name, MsgSpec, SrvSpec};

/// Line separating the request and response sections of a service
pub const SERVICE_SEPARATOR: &str = "---";

/// The main definition registry
pub struct SchemaRegistry {
    /// Where definitions live on disk
    index: PathIndex,
    /// Fingerprinted messages by full name
    messages: HashMap<String, Arc<MsgSpec>>,
    /// Messages whose fingerprint is being computed, outermost first
    resolving: Vec<String>,
}

impl SchemaRegistry {
    /// Index the given package roots, in precedence order
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        Ok(Self::with_index(PathIndex::scan(roots)?))
    }

    /// Build a registry over the roots named by a configuration
    pub fn from_config(config: &RosmsgConfig) -> Result<Self> {
        let roots = config.package_roots();
        Self::new(roots.as_slice())
    }

    /// Use an already-built index
    pub fn with_index(index: PathIndex) -> Self {
        Self {
            index,
            messages: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// The package index this registry resolves against
    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    /// Load a message by full name, from cache or from its indexed file
    pub fn load_msg(&mut self, full_name: &str) -> Result<Arc<MsgSpec>> {
        if let Some(spec) = self.messages.get(full_name) {
            trace!("Cache hit for message: {}", full_name);
            return Ok(spec.clone());
        }

        let path = self
            .index
            .msg_path(full_name)
            .ok_or_else(|| SchemaError::NotFound {
                kind: DefinitionKind::Message,
                full_name: full_name.to_string(),
            })?
            .to_path_buf();

        self.load_msg_from_file(&path, full_name)
    }

    /// Load a message from an explicit file, replacing any cached entry
    pub fn load_msg_from_file(&mut self, path: &Path, full_name: &str) -> Result<Arc<MsgSpec>> {
        debug!("Loading message {} from {}", full_name, path.display());
        let text = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        self.load_msg_from_string(&text, full_name)
    }

    /// Load a message from source text, replacing any cached entry.
    ///
    /// This is how callers override an on-disk definition at run time.
    pub fn load_msg_from_string(&mut self, text: &str, full_name: &str) -> Result<Arc<MsgSpec>> {
        let (package_name, _) = split_full_name(full_name)?;
        let parsed = parser::parse(text, package_name).map_err(|e| e.with_name(full_name))?;
        let mut spec = MsgSpec::new(full_name, parsed.fields, parsed.constants, text)?;

        self.resolving.push(full_name.to_string());
        let md5sum = fingerprint::msg_md5(&spec, self);
        self.resolving.pop();
        spec.md5sum = Some(md5sum?);

        trace!("Computed md5sum for {}: {:?}", full_name, spec.md5sum);
        let spec = Arc::new(spec);
        self.register(spec.clone());
        Ok(spec)
    }

    /// Load a service by full name from its indexed file.
    ///
    /// Services are not cached.
    pub fn load_srv(&mut self, full_name: &str) -> Result<SrvSpec> {
        let path = self
            .index
            .srv_path(full_name)
            .ok_or_else(|| SchemaError::NotFound {
                kind: DefinitionKind::Service,
                full_name: full_name.to_string(),
            })?
            .to_path_buf();

        self.load_srv_from_file(&path, full_name)
    }

    /// Load a service from an explicit file
    pub fn load_srv_from_file(&mut self, path: &Path, full_name: &str) -> Result<SrvSpec> {
        debug!("Loading service {} from {}", full_name, path.display());
        let text = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        self.load_srv_from_string(&text, full_name)
    }

    /// Load a service from source text.
    ///
    /// The request and response sections are registered as the messages
    /// `<full_name>Request` and `<full_name>Response`.
    pub fn load_srv_from_string(&mut self, text: &str, full_name: &str) -> Result<SrvSpec> {
        let (package_name, short_name) = split_full_name(full_name)?;
        let (request_text, response_text) = split_service(text, full_name)?;

        let request = self.load_msg_from_string(&request_text, &format!("{}Request", full_name))?;
        let response =
            self.load_msg_from_string(&response_text, &format!("{}Response", full_name))?;
        let md5sum = fingerprint::srv_md5(&request, &response, self)?;

        Ok(SrvSpec {
            package_name: package_name.to_string(),
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            text: text.to_string(),
            md5sum,
            request,
            response,
        })
    }

    /// Insert a spec under its full name, replacing any previous entry
    pub fn register(&mut self, spec: Arc<MsgSpec>) {
        self.messages.insert(spec.full_name.clone(), spec);
    }

    /// Get a cached message without loading it
    pub fn get(&self, full_name: &str) -> Option<Arc<MsgSpec>> {
        self.messages.get(full_name).cloned()
    }

    /// Check if a message is cached
    pub fn contains(&self, full_name: &str) -> bool {
        self.messages.contains_key(full_name)
    }

    /// Full names of every cached message, sorted
    pub fn cached_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Indexed message names, sorted
    pub fn message_names(&self) -> Vec<&str> {
        self.index.message_names().collect()
    }

    /// Indexed service names, sorted
    pub fn service_names(&self) -> Vec<&str> {
        self.index.service_names().collect()
    }

    pub fn msg_path(&self, full_name: &str) -> Option<&Path> {
        self.index.msg_path(full_name)
    }

    pub fn srv_path(&self, full_name: &str) -> Option<&Path> {
        self.index.srv_path(full_name)
    }

    /// Indexed names resembling `query`, best match first
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &str)> = self
            .index
            .message_names()
            .chain(self.index.service_names())
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
            .collect();

        // Sort by score descending, then by name for stable output
        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        results.dedup_by(|a, b| a.1 == b.1);

        results
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

impl DefinitionResolver for SchemaRegistry {
    fn resolve_msg(&mut self, full_name: &str) -> Result<Arc<MsgSpec>> {
        if self.resolving.iter().any(|name| name == full_name) {
            let mut chain = self.resolving.clone();
            chain.push(full_name.to_string());
            return Err(SchemaError::CyclicDefinition { chain });
        }
        self.load_msg(full_name)
    }
}

/// Split service text on its separator line into request and response text
fn split_service(text: &str, full_name: &str) -> Result<(String, String)> {
    let mut sections: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.lines() {
        if parser::strip_comment(line).trim() == SERVICE_SEPARATOR {
            sections.push(Vec::new());
        } else if let Some(section) = sections.last_mut() {
            section.push(line);
        }
    }

    if sections.len() != 2 {
        return Err(SchemaError::MalformedService {
            full_name: full_name.to_string(),
            separators: sections.len() - 1,
        });
    }

    let response = sections.pop().unwrap_or_default().join("\n");
    let request = sections.pop().unwrap_or_default().join("\n");
    Ok((request, response))
}
