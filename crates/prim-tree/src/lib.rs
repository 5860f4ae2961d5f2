//! Prim Tree Library
//!
//! A lazily loaded, index-addressable tree model over a composed USD-style
//! stage, for hosting in hierarchical tree views.
//!
//! # Core Concepts
//!
//! - **SceneNodeAdapter**: uniform row-shaped view over the scene-graph API
//! - **ColorClass**: display classification of attributes
//! - **TreeModel**: materialises children on demand and hands out
//!   [`TreeIndex`](tree::TreeIndex) handles that go stale on invalidation
//! - **ModelObserver**: scoped change notifications for views
//!
//! # Example
//!
//! ```no_run
//! use prim_tree::prelude::*;
//! use stage::InMemoryStage;
//!
//! let stage = InMemoryStage::open("shot.json").expect("Failed to open stage");
//!
//! let mut model = TreeModel::new();
//! let root = model.bind_stage(&stage).expect("Failed to bind stage");
//!
//! // Children are fetched on first access
//! for child in model.expand(&stage, root).expect("Failed to expand root") {
//!     let node = model.node(child).unwrap();
//!     println!("{} ({})", node.name, node.tag);
//! }
//! ```

pub mod adapter;
pub mod classify;
pub mod columns;
pub mod error;
pub mod events;
pub mod properties;
pub mod tree;

pub use adapter::SceneNodeAdapter;
pub use classify::{classify, AttributeMeta, ColorClass};
pub use columns::{CellValue, Column, Role};
pub use error::{TreeError, TreeResult};
pub use events::{ModelEvent, ModelObserver};
pub use properties::{PropertyRow, TimeSampleRow};
pub use tree::{SceneNode, TreeIndex, TreeModel};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::tree::prelude::*;
    pub use crate::{
        CellValue, ColorClass, Column, ModelEvent, ModelObserver, Role, SceneNodeAdapter,
        TreeError, TreeResult,
    };
}
