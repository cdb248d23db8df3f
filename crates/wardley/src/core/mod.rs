//! Core abstractions for map processing
//!
//! The model types, the block-level document abstraction, reference
//! expressions, errors and diagnostics shared by the decoder and the layout
//! engine.

mod diagnostics;
mod error;
mod expression;
mod layout;
pub mod logging;
mod syntax;
mod types;

pub use diagnostics::*;
pub use error::*;
pub use expression::*;
pub use layout::*;
pub use logging::*;
pub use syntax::*;
pub use types::*;
