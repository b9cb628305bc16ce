//! Virtual schema adapter over the Ferry SQL pushdown core.
//!
//! The embedding process supplies the connectivity capabilities
//! (`ConnectionResolver`, `RemoteConnectionFactory`); the adapter validates
//! properties, reads remote metadata, negotiates capabilities and produces
//! load statements for pushed-down queries.

pub mod adapter;
pub mod cache;
pub mod request;

pub use adapter::{AdapterOptions, VirtualSchemaAdapter};
pub use cache::ConnectionCache;
pub use request::PushdownRequest;
