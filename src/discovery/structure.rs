//! Structure identities and descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Fully-qualified, stable name of a source structure.
///
/// Segments are joined by the configured namespace separator. Identical
/// structures always produce identical identities across runs, which is
/// what makes the identity usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureIdentity(String);

impl StructureIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Join namespace segments with `separator`.
    pub fn from_segments<S: AsRef<str>>(segments: &[S], separator: char) -> Self {
        let mut name = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                name.push(separator);
            }
            name.push_str(segment.as_ref());
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StructureIdentity {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for StructureIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A discovered source structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDescriptor {
    identity: StructureIdentity,
    /// Absolute path of the structure's source file.
    pub source_path: PathBuf,
}

impl StructureDescriptor {
    pub fn new(identity: StructureIdentity, source_path: PathBuf) -> Self {
        Self { identity, source_path }
    }

    pub fn identity(&self) -> &StructureIdentity {
        &self.identity
    }
}

/// Derive the identity of the source file at `relative` (relative to its project dir).
///
/// Returns `None` for paths that cannot be mapped back: non-UTF-8 components,
/// components containing the separator, a missing stem, or the wrong extension.
pub fn identity_for_path(relative: &Path, extension: &str, separator: char) -> Option<StructureIdentity> {
    if relative.extension()? != extension {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
    for component in parent.components() {
        match component {
            std::path::Component::Normal(part) => segments.push(part.to_str()?),
            _ => return None,
        }
    }
    segments.push(relative.file_stem()?.to_str()?);

    if segments.iter().any(|s| s.is_empty() || s.contains(separator)) {
        return None;
    }
    Some(StructureIdentity::from_segments(&segments, separator))
}

/// Relative source path a name would live at: segments as directories, last one as file stem.
///
/// Inverse of [`identity_for_path`]. Returns `None` for names with empty
/// segments or segments that are not plain path components.
pub fn relative_path_for(name: &str, extension: &str, separator: char) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for segment in name.split(separator) {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains(['/', '\\']) {
            return None;
        }
        path.push(segment);
    }
    path.set_extension(extension);
    Some(path)
}
