use anyhow::{anyhow, bail, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An absolute path to a prim, e.g. `/world/geo/mesh`
///
/// Paths are the stable identifiers of the scene graph: tree indices come and
/// go with invalidation, but a path can always be re-resolved against the
/// current stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimPath(String);

impl PrimPath {
    /// Parse and validate a prim path
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            bail!("Prim path is empty");
        }
        if !path.starts_with('/') {
            bail!("Prim path must be absolute: {}", path);
        }
        if path.len() > 1 && path.ends_with('/') {
            bail!("Prim path has a trailing separator: {}", path);
        }
        if path.len() > 1 && path[1..].split('/').any(|segment| segment.is_empty()) {
            bail!("Prim path has an empty segment: {}", path);
        }
        Ok(Self(path))
    }

    /// The absolute root path `/`
    pub fn absolute_root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the absolute root `/`
    pub fn is_absolute_root(&self) -> bool {
        self.0 == "/"
    }

    /// The last path segment (empty for `/`)
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The parent path, or `None` for `/`
    pub fn parent(&self) -> Option<PrimPath> {
        if self.is_absolute_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::absolute_root()),
            Some(pos) => Some(Self(self.0[..pos].to_string())),
            None => None,
        }
    }

    /// Append a child segment
    pub fn child(&self, name: &str) -> Result<PrimPath> {
        if name.is_empty() || name.contains('/') {
            return Err(anyhow!("Invalid prim name: {:?}", name));
        }
        if self.is_absolute_root() {
            Ok(Self(format!("/{}", name)))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Number of segments (`/` = 0, `/world` = 1)
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Iterate over the path segments from the top down
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `prefix` is this path or one of its ancestors
    pub fn has_prefix(&self, prefix: &PrimPath) -> bool {
        if prefix.is_absolute_root() || self == prefix {
            return true;
        }
        self.0.starts_with(prefix.as_str()) && self.0.as_bytes().get(prefix.0.len()) == Some(&b'/')
    }
}

impl FromStr for PrimPath {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PrimPath {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PrimPath> for String {
    fn from(path: PrimPath) -> Self {
        path.0
    }
}

impl AsRef<str> for PrimPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
