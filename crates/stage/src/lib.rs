// Scene-graph access for the prim editor
// This crate provides the read API the tree model consumes, the editing API
// the property panels drive, and an in-memory composed stage implementing both.

mod edit;
mod path;
mod prim;
mod spec;
mod stage;
mod value;

pub use edit::StageEdit;
pub use path::PrimPath;
pub use prim::{
    AttributeInfo, PrimMetadata, PrimPurpose, TimeSample, VariantSetInfo, KIND_VALUES,
};
pub use spec::{PayloadSpec, PrimSpec, VariantSetSpec, VariantSpec};
pub use stage::{EditableSceneGraph, InMemoryStage, SceneGraph};
pub use value::Value;
