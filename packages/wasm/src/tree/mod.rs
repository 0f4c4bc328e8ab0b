//! Graph normalization into a strict rooted tree.
//!
//! - `node`: person/marriage node types and their serialized shape
//! - `normalize`: root selection and recursive re-expansion
//! - `flat`: pre-order arena with one-to-many person lookup

mod flat;
mod node;
mod normalize;

pub use flat::{FlatNode, FlatTree, SlotKind};
pub use node::{MarriageNode, PersonNode, TreeNode};
pub use normalize::{FamilyTree, normalize};
