//! ARMOR front-end — parses C/C++ headers with tree-sitter and produces the
//! declaration trees the core's tree builder consumes.
//!
//! The front-end owns everything parser-specific: grammar selection,
//! CST-to-declaration extraction, and unique-key synthesis. The core sees
//! only `armor_core::source` data.

mod extract;
pub mod language;
pub mod parser;
pub mod usr;

pub use language::{classify, is_cpp_header, Language};
pub use parser::{HeaderParser, ParseConfig};
