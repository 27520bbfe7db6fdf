//! The AST node model: a tagged-union [`kind::NodeKind`] wrapped by an
//! arena-owned [`node::Node`], built through [`node::AstArena`].
//!
//! Kept as its own crate, separate from `cxy-parser`, because the node
//! model is a component in its own right: the parser consumes it, but so
//! will any later pass (formatter, semantic analysis) without needing to
//! depend on the parser itself.

pub mod kind;
pub mod node;

pub use kind::{
    AssignOp, BinaryOp, CastKind, FieldInit, ImportItem, ImportKind, Literal, MatchArm, NodeKind, PathSegment,
    StringPart, SwitchCase, UnaryOp,
};
pub use node::{flags, AstArena, Node, NodeId};
