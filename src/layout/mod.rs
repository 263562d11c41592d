//! Layout transform: parses declarative layout input into [`LayoutNode`] trees
//! and crawls them to assign ids, inherit default options, and normalise
//! option values.
//!
//! Downstream code imports layout types from here while the implementation
//! details live in the private submodules.

mod core;
pub mod options;
mod transform;

pub use self::core::{LayoutNode, LayoutType, NodeData, NodeId, RootLayout, merge_options};
pub use transform::{LayoutTransform, LayoutTreeTransform};
