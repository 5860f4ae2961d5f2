//! Index-addressable tree over a composed stage
//!
//! [`TreeModel`] materialises rows lazily and hands out generation-checked
//! [`TreeIndex`] handles. The [`Tree`] and [`TreeTraversal`] traits walk
//! whatever has been materialised so far.

pub mod model;
mod node;
mod traits;

pub use model::{CachedTree, TreeModel};
pub use node::{SceneNode, TreeIndex};
pub use traits::{TraversalOrder, Tree, TreeTraversal, TreeWalker};

/// Re-export common types for convenience
pub mod prelude {
    pub use super::{
        CachedTree, SceneNode, TraversalOrder, Tree, TreeIndex, TreeModel, TreeTraversal,
    };
}
