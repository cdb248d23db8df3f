//! Strategy map decoding and layout
//!
//! The decode pass ([`decode`]) turns blocks into a validated [`Map`]; the
//! layout pass ([`layout`]) fills in node coordinates.
//!
//! [`Map`]: crate::core::Map

mod assembler;
mod context;
mod decoder;
mod defaults;
mod document;
mod layout;
mod resolver;
mod routing;

pub use assembler::*;
pub use context::*;
pub use decoder::*;
pub use defaults::*;
pub use document::*;
pub use layout::*;
pub use resolver::*;
pub use routing::*;
