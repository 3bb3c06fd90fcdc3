//! File-system structure discovery.
//!
//! Walks every project directory with the `ignore` crate (so `.gitignore`
//! is respected), keeps files carrying the source extension and derives
//! each structure's identity from its path relative to the project dir.
//! Results are sorted by identity so repeated runs agree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::ConfigStore;
use crate::discovery::structure::{identity_for_path, relative_path_for, StructureDescriptor, StructureIdentity};
use crate::discovery::{DiscoveryError, StructureDiscovery};

/// Discovers structures from source files under the project directories.
#[derive(Debug, Clone)]
pub struct FsDiscovery {
    project_dirs: Vec<PathBuf>,
    source_extension: String,
    separator: char,
}

impl FsDiscovery {
    /// Create a discovery over `project_dirs` using the store's extension and separator.
    pub fn new(project_dirs: &[PathBuf], config: &ConfigStore) -> Self {
        let config = config.config();
        Self {
            project_dirs: project_dirs.to_vec(),
            source_extension: config.source_extension.clone(),
            separator: config.namespace_separator,
        }
    }

    fn walk_dir(&self, root: &Path, out: &mut Vec<StructureDescriptor>) -> Result<(), DiscoveryError> {
        if !root.is_dir() {
            return Err(DiscoveryError::MissingProjectDir(root.to_path_buf()));
        }

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };

            match identity_for_path(relative, &self.source_extension, self.separator) {
                Some(identity) => out.push(StructureDescriptor::new(identity, path.to_path_buf())),
                None if path.extension().is_some_and(|ext| ext == self.source_extension.as_str()) => {
                    tracing::warn!(path = %path.display(), "Source file has no usable identity");
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl StructureDiscovery for FsDiscovery {
    fn list_all(&self) -> Result<Vec<StructureDescriptor>, DiscoveryError> {
        let mut found = Vec::new();
        for dir in &self.project_dirs {
            self.walk_dir(dir, &mut found)?;
        }

        let mut seen: HashMap<&StructureIdentity, &Path> = HashMap::new();
        for descriptor in &found {
            if let Some(first) = seen.insert(descriptor.identity(), &descriptor.source_path) {
                return Err(DiscoveryError::DuplicateIdentity {
                    identity: descriptor.identity().clone(),
                    first: first.to_path_buf(),
                    second: descriptor.source_path.clone(),
                });
            }
        }

        found.sort_by(|a, b| a.identity().cmp(b.identity()));
        tracing::debug!(count = found.len(), "Structures discovered");
        Ok(found)
    }

    fn locate(&self, identity: &StructureIdentity) -> Option<PathBuf> {
        let relative = relative_path_for(identity.as_str(), &self.source_extension, self.separator)?;
        self.project_dirs
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|path| path.is_file())
    }
}
