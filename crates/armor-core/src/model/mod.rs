//! In-memory model: API nodes and the normalized context that owns them.

pub mod context;
pub mod node;

pub use context::NormalizedContext;
pub use node::{AccessSpec, ApiNode, ConstQualifier, NodeKind, StorageClass, VirtualQualifier};
