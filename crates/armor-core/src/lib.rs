//! ARMOR core — header-to-normalized-API-tree pipeline and structural diff
//! engine.
//!
//! The pipeline:
//! 1. A front-end (see `armor-frontend`) parses a header into the
//!    declaration tree defined in [`source`].
//! 2. The [`build`] tree builder projects those declarations into a
//!    [`model::NormalizedContext`] of position-independent API nodes keyed
//!    by stable unique identifiers.
//! 3. The [`diff`] engine compares two contexts into a tagged difference
//!    tree, and the describer turns that tree into per-API change records
//!    with a compatibility verdict.
//! 4. The [`report`] emitters group the records and render HTML and JSON.

pub mod build;
pub mod diff;
pub mod errors;
pub mod logging;
pub mod model;
pub mod qualname;
pub mod report;
pub mod source;
pub mod typeinfo;

pub use build::{build_context, TreeBuilder};
pub use diff::{describe_changes, diff_trees, AtomicChange, DiffRecord, DiffTag};
pub use errors::{ArmorError, Result};
pub use model::{ApiNode, NodeKind, NormalizedContext};
pub use report::{group_records, GroupedRecord};
pub use source::{DeclKind, FunctionSig, ParamDecl, ParsedHeader, SourceDecl};
