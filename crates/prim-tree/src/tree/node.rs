//! Core node types for the tree model

use stage::{PrimMetadata, PrimPath, PrimPurpose, VariantSetInfo};
use std::fmt;

use crate::classify::ColorClass;

/// Opaque handle for one row of the tree model
///
/// Made up of a `slot` into the model's arena and a `generation`. Slots are
/// recycled once their rows are invalidated; the generation is bumped at the
/// same time, so a handle kept across an invalidation no longer matches and
/// is rejected as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeIndex {
    slot: u32,
    generation: u32,
}

impl TreeIndex {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        TreeIndex { slot, generation }
    }

    /// The arena slot
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// The generation of the slot this handle was issued for
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for TreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeIndex({}, {})", self.slot, self.generation)
    }
}

/// Row-shaped view of one prim
///
/// A snapshot taken when the row was materialised; the stage owns the prim
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Stable identifier in the scene graph
    pub path: PrimPath,
    /// The prim name
    pub name: String,
    /// Schema type name (`Xform`, `Mesh`, ...)
    pub type_name: String,
    /// Colour classification of the row
    pub tag: ColorClass,
    /// Parent path, `None` for the root prim
    pub parent: Option<PrimPath>,
    /// Child paths in traversal order
    pub children: Vec<PrimPath>,
    pub kind: String,
    pub purpose: Option<PrimPurpose>,
    pub active: bool,
    pub has_payload: bool,
    pub payload_loaded: bool,
    pub variant_sets: Vec<VariantSetInfo>,
}

impl SceneNode {
    pub(crate) fn from_metadata(
        path: PrimPath,
        metadata: PrimMetadata,
        tag: ColorClass,
        children: Vec<PrimPath>,
        parent: Option<PrimPath>,
    ) -> Self {
        Self {
            name: metadata.name,
            type_name: metadata.type_name,
            tag,
            parent,
            children,
            kind: metadata.kind,
            purpose: metadata.purpose,
            active: metadata.active,
            has_payload: metadata.has_payload,
            payload_loaded: metadata.payload_loaded,
            variant_sets: metadata.variant_sets,
            path,
        }
    }

    /// Whether the prim has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// `set: selection` pairs, comma separated
    pub fn variant_summary(&self) -> String {
        self.variant_sets
            .iter()
            .map(|set| format!("{}: {}", set.name, set.selection.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.type_name, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> SceneNode {
        SceneNode::from_metadata(
            PrimPath::new("/world/lookdev").unwrap(),
            PrimMetadata {
                name: "lookdev".into(),
                type_name: "Scope".into(),
                kind: String::new(),
                purpose: None,
                active: true,
                has_payload: false,
                payload_loaded: false,
                variant_sets: vec![
                    VariantSetInfo {
                        name: "shading".into(),
                        variants: vec!["red".into(), "blue".into()],
                        selection: Some("blue".into()),
                    },
                    VariantSetInfo {
                        name: "lod".into(),
                        variants: vec![],
                        selection: None,
                    },
                ],
            },
            ColorClass::Default,
            vec![],
            Some(PrimPath::new("/world").unwrap()),
        )
    }

    #[test]
    fn test_tree_index() {
        let index = TreeIndex::new(3, 7);
        assert_eq!(index.slot(), 3);
        assert_eq!(index.generation(), 7);
        assert_ne!(index, TreeIndex::new(3, 8));
        assert_eq!(index.to_string(), "TreeIndex(3, 7)");
    }

    #[test]
    fn test_scene_node() {
        let node = node();
        assert!(node.is_leaf());
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.variant_summary(), "shading: blue, lod: ");
        assert_eq!(node.to_string(), "lookdev (Scope) - default");
    }
}
