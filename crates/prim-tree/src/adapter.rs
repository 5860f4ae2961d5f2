//! Uniform row-shaped view over the scene-graph API

use log::{trace, warn};
use stage::{AttributeInfo, PrimPath, SceneGraph};

use crate::classify::{classify, AttributeMeta, ColorClass};
use crate::error::{TreeError, TreeResult};
use crate::tree::SceneNode;

/// Read-only adapter from a [`SceneGraph`] to [`SceneNode`] rows
///
/// Holds a borrowed stage; it never mutates it and never caches anything,
/// so an adapter is cheap to create per call.
pub struct SceneNodeAdapter<'a, S: SceneGraph + ?Sized> {
    stage: &'a S,
}

impl<'a, S: SceneGraph + ?Sized> SceneNodeAdapter<'a, S> {
    pub fn new(stage: &'a S) -> Self {
        Self { stage }
    }

    /// The root prim's path
    pub fn root(&self) -> TreeResult<PrimPath> {
        self.stage.root().map_err(stage_failure)
    }

    /// Look up a prim by path
    pub fn resolve(&self, path: &PrimPath) -> TreeResult<SceneNode> {
        let metadata = self
            .stage
            .metadata(path)
            .map_err(stage_failure)?
            .ok_or_else(|| TreeError::NotFound(path.clone()))?;
        let children = self
            .stage
            .children(path)
            .map_err(stage_failure)?
            .ok_or_else(|| TreeError::NotFound(path.clone()))?;
        let tag = ColorClass::strongest(
            self.attributes(path)?
                .iter()
                .map(|attribute| classify(&AttributeMeta::from(attribute))),
        );

        trace!("Resolved {} ({} children, {})", path, children.len(), tag);
        Ok(SceneNode::from_metadata(
            path.clone(),
            metadata,
            tag,
            children,
            path.parent().filter(|p| !p.is_absolute_root()),
        ))
    }

    /// The direct children of a prim, one level deep
    ///
    /// Leaves yield an empty list.
    pub fn children(&self, path: &PrimPath) -> TreeResult<Vec<SceneNode>> {
        let child_paths = self
            .stage
            .children(path)
            .map_err(stage_failure)?
            .ok_or_else(|| TreeError::NotFound(path.clone()))?;
        child_paths
            .iter()
            .map(|child| self.resolve(child))
            .collect()
    }

    /// Whether a prim has any children, without resolving them
    pub fn has_children(&self, path: &PrimPath) -> TreeResult<bool> {
        self.stage
            .children(path)
            .map_err(stage_failure)?
            .map(|children| !children.is_empty())
            .ok_or_else(|| TreeError::NotFound(path.clone()))
    }

    /// Attributes of a prim in authored order
    pub fn attributes(&self, path: &PrimPath) -> TreeResult<Vec<AttributeInfo>> {
        self.stage
            .attributes(path)
            .map_err(stage_failure)?
            .ok_or_else(|| TreeError::NotFound(path.clone()))
    }

    /// Classify a single attribute
    pub fn classify(meta: &AttributeMeta) -> ColorClass {
        classify(meta)
    }
}

fn stage_failure(err: anyhow::Error) -> TreeError {
    warn!("Scene graph call failed: {:#}", err);
    TreeError::unavailable(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage::{InMemoryStage, PrimSpec, Value};

    fn stage() -> InMemoryStage {
        let mesh = PrimSpec::new("mesh", "Mesh").with_attribute(
            AttributeInfo::new("foo", "string", Value::String("bar".into())).custom(),
        );
        let geo = PrimSpec::new("geo", "Xform")
            .with_attribute(AttributeInfo::new(
                "xformOp:translate",
                "double3",
                Value::Vec3([0.0; 3]),
            ))
            .with_child(mesh);
        InMemoryStage::new("adapter", PrimSpec::new("world", "Xform").with_child(geo))
    }

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    #[test]
    fn test_resolve() {
        let stage = stage();
        let adapter = SceneNodeAdapter::new(&stage);

        let geo = adapter.resolve(&path("/world/geo")).unwrap();
        assert_eq!(geo.name, "geo");
        assert_eq!(geo.type_name, "Xform");
        assert_eq!(geo.tag, ColorClass::Transform);
        assert_eq!(geo.parent, Some(path("/world")));
        assert_eq!(geo.children, vec![path("/world/geo/mesh")]);

        let world = adapter.resolve(&path("/world")).unwrap();
        assert_eq!(world.parent, None);
        assert_eq!(world.tag, ColorClass::Default);
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let stage = stage();
        let adapter = SceneNodeAdapter::new(&stage);
        let missing = path("/does/not/exist");
        assert_eq!(
            adapter.resolve(&missing),
            Err(TreeError::NotFound(missing.clone()))
        );
        assert_eq!(adapter.children(&missing), Err(TreeError::NotFound(missing)));
    }

    #[test]
    fn test_children_one_level() {
        let stage = stage();
        let adapter = SceneNodeAdapter::new(&stage);

        let children = adapter.children(&path("/world")).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path, path("/world/geo"));

        let leaf = adapter.children(&path("/world/geo/mesh")).unwrap();
        assert!(leaf.is_empty());
        assert!(!adapter.has_children(&path("/world/geo/mesh")).unwrap());
        assert!(adapter.has_children(&path("/world/geo")).unwrap());
    }

    #[test]
    fn test_closed_stage_is_unavailable() {
        let mut stage = stage();
        stage.close();
        let adapter = SceneNodeAdapter::new(&stage);
        assert!(matches!(
            adapter.resolve(&path("/world")),
            Err(TreeError::StageUnavailable(_))
        ));
        assert!(matches!(adapter.root(), Err(TreeError::StageUnavailable(_))));
    }
}
