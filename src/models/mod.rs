//! Data models for the community portal.
//!
//! Field names serialize as camelCase; enum values as snake_case strings.

mod category;
mod page;
mod post;
mod session;
mod ticket;

pub use category::*;
pub use page::*;
pub use post::*;
pub use session::*;
pub use ticket::*;
