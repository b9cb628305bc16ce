//! CLI command implementations.

mod capabilities;
mod dialects;
mod map_type;
mod validate;

pub use capabilities::capabilities;
pub use dialects::dialects;
pub use map_type::{map_type, MapTypeArgs};
pub use validate::validate;
