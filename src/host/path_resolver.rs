//! Default fallback resolver.
//!
//! Maps `Acme\Billing\Invoice` to `<project-dir>/Acme/Billing/Invoice.<source-extension>`
//! and loads the first readable match. This is plain resolution with no
//! proxy involved, used when the cache has nothing for a name.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::discovery::structure::relative_path_for;
use crate::host::{Definitions, ResolveError, Resolver};

#[derive(Debug, Clone)]
pub struct PathResolver {
    project_dirs: Vec<PathBuf>,
    source_extension: String,
    separator: char,
    definitions: Arc<Definitions>,
}

impl PathResolver {
    pub fn new(config: &ConfigStore, definitions: Arc<Definitions>) -> Self {
        let config = config.config();
        Self {
            project_dirs: config.project_dirs.clone(),
            source_extension: config.source_extension.clone(),
            separator: config.namespace_separator,
            definitions,
        }
    }
}

impl Resolver for PathResolver {
    fn resolve(&self, name: &str) -> Result<bool, ResolveError> {
        let Some(relative) = relative_path_for(name, &self.source_extension, self.separator) else {
            return Ok(false);
        };

        for dir in &self.project_dirs {
            let path = dir.join(&relative);
            match fs::read_to_string(&path) {
                Ok(source) => {
                    self.definitions.define(name, &source);
                    tracing::trace!(name, path = %path.display(), "Resolved from source");
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(ResolveError::new(name, e)),
            }
        }
        Ok(false)
    }
}
