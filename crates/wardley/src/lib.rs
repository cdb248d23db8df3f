//! Wardley - Decode and lay out strategy maps
//!
//! A strategy map places components on two axes: how evolved they are
//! (genesis, custom, product, commodity) and how visible they are to the
//! user. This crate turns a block document describing such a map into a
//! validated model with pixel coordinates a renderer can draw.
//!
//! # Quick Start
//!
//! ```rust
//! use wardley::process;
//!
//! let input = r#"{"blocks": [
//!     {"kind": "node", "label": "user", "attributes": {
//!         "label": "User", "evolution": "commodity", "x": 0, "visibility": 2
//!     }},
//!     {"kind": "node", "label": "api", "attributes": {
//!         "label": "API",
//!         "evolution": "custom",
//!         "x": 1,
//!         "visibility": {"expr": "node.user.visibility - 1"}
//!     }},
//!     {"kind": "connector", "attributes": {"from": "user", "to": "api"}}
//! ]}"#;
//!
//! let map = process(input).unwrap();
//! assert_eq!(map.node("api").unwrap().visibility, 1);
//! assert_eq!(map.node("user").unwrap().y, 0);
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use wardley::prelude::*;
//!
//! let blocks = vec![
//!     Block::node("db")
//!         .with_attr("label", "Database")
//!         .with_attr("evolution", "product")
//!         .with_attr("x", 1)
//!         .with_attr("visibility", 1),
//!     Block::node("cache")
//!         .with_attr("label", "Cache")
//!         .with_attr("evolution", "product")
//!         .with_attr("visibility", 2)
//!         .with_attr("x", Expression::parse("node.db.x + 1").unwrap()),
//!     Block::connector().with_attr("from", "cache").with_attr("to", "nowhere"),
//! ];
//!
//! // Decode; the dangling connector is dropped with a warning
//! let decoded = decode(&blocks, &DecodeOptions::compact()).unwrap();
//! assert_eq!(decoded.map.node("cache").unwrap().evolution_offset, 2);
//! assert_eq!(decoded.diagnostics.warnings().count(), 1);
//!
//! // Lay out with reproducible jitter
//! let map = layout(decoded.map, &LayoutParams::with_jitter(42));
//! let routes = route_connectors(&map);
//! assert!(routes.is_empty());
//! ```

pub mod core;
pub mod map;

pub use core::*;
pub use map::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Block, BlockKind, Connector, ConnectorType, DecodeFailure, Diagnostic, Diagnostics,
        EvolutionStage, Expression, LayoutAlgorithm, Map, MapError, Node, Severity, Size,
        SizeVariant, SyntaxParser,
    };
    pub use crate::map::{
        decode, decode_document, layout, route_connectors, DecodeOptions, Decoded, Grid,
        GridLayout, JsonDocumentParser, LayoutParams, PositionedConnector,
    };
}

/// Decode a JSON block document and lay it out with default settings
///
/// Recoverable diagnostics are logged and otherwise ignored; use
/// [`process_with`] to inspect them.
///
/// # Example
/// ```rust
/// let map = wardley::process(r#"{"blocks": []}"#).unwrap();
/// assert!(map.is_empty());
/// assert_eq!(map.size.width, 1280);
/// ```
pub fn process(input: &str) -> anyhow::Result<Map> {
    let processed = process_with(input, &DecodeOptions::default(), &LayoutParams::default())?;
    Ok(processed.map)
}

/// Decode a JSON block document and lay it out
///
/// Returns the laid-out map together with the recoverable diagnostics of the
/// decode pass. A fatal diagnostic becomes the error, with the
/// [`DecodeFailure`] available through `downcast_ref`.
///
/// # Example
/// ```rust
/// use wardley::{process_with, DecodeFailure, DecodeOptions, ErrorKind, LayoutParams};
///
/// let input = r#"{"blocks": [
///     {"kind": "node", "label": "a", "attributes": {"label": "A", "evolution": "custom", "x": 0, "visibility": 0}},
///     {"kind": "node", "label": "a", "attributes": {"label": "A", "evolution": "product", "x": 0, "visibility": 0}}
/// ]}"#;
/// let err = process_with(input, &DecodeOptions::default(), &LayoutParams::default()).unwrap_err();
/// let failure = err.downcast_ref::<DecodeFailure>().unwrap();
/// assert_eq!(failure.kind(), ErrorKind::Validation);
/// ```
pub fn process_with(
    input: &str,
    options: &DecodeOptions,
    params: &LayoutParams,
) -> anyhow::Result<Decoded> {
    let decoded = decode_document(&JsonDocumentParser::new(), input, options)?;
    Ok(Decoded {
        map: layout(decoded.map, params),
        diagnostics: decoded.diagnostics,
    })
}

/// Serialize a map to pretty-printed JSON
pub fn to_json(map: &Map) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}
