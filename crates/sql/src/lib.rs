//! SQL pushdown for remote JDBC sources.
//!
//! This crate turns a relational expression tree pushed down by the host
//! planner into:
//! - **Dialect SQL**: quoting, qualification, literal forms and function
//!   aliases of the remote engine (via `generator` and `dialect`).
//! - **Load statements**: `IMPORT ... FROM JDBC` in one of three shapes (via
//!   `rewriter`).
//!
//! It also maps remote column types into the canonical type system
//! (`typemap`) and reads remote schemas into virtual schema metadata
//! (`metadata`).
mod macros;

pub mod ast;
pub mod capabilities;
pub mod dialect;
pub mod generator;
pub mod metadata;
pub mod registry;
pub mod remote;
pub mod rewriter;
pub mod typemap;
pub mod types;

pub use ast::SqlNode;
pub use capabilities::{parse_excluded_capabilities, Capabilities};
pub use dialect::{SqlDialect, SqlGenerationContext};
pub use generator::{GenerationError, SqlGenerator};
pub use metadata::{MetadataError, RemoteMetadataReader, SchemaAdapterNotes, SchemaMetadata};
pub use registry::{DialectDescriptor, DialectRegistry};
pub use rewriter::{QueryRewriter, RewriteContext, RewriteError};
pub use typemap::{BaseTypeMapper, MappingContext, TypeMapper};
pub use types::{DataType, RemoteTypeDescriptor};
