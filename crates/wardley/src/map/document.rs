//! JSON block documents
//!
//! A front-end for documents already split into blocks, for example by a
//! tool that converts another configuration syntax:
//!
//! ```json
//! {
//!   "blocks": [
//!     {"kind": "size", "attributes": {"width": 800}},
//!     {"kind": "node", "label": "db",
//!      "attributes": {"label": "Database", "evolution": "product", "x": 1, "visibility": 1}},
//!     {"kind": "node", "label": "cache",
//!      "position": {"line": 12, "column": 1},
//!      "attributes": {"label": "Cache", "evolution": "product",
//!                     "x": {"expr": "node.db.x + 1"}, "visibility": 2}},
//!     {"kind": "connector", "attributes": {"from": "cache", "to": "db"}}
//!   ]
//! }
//! ```
//!
//! Attributes keep document order and a repeated name is passed through so
//! the decoder can reject it.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, span, Level};

use crate::core::{
    Attribute, AttributeValue, Block, BlockKind, Expression, MapError, SourcePosition,
    SyntaxParser, Value,
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    blocks: Vec<RawBlock>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBlock {
    kind: BlockKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    position: Option<SourcePosition>,
    #[serde(default)]
    attributes: RawAttributes,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Str(String),
    Expr(RawExpression),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExpression {
    expr: String,
}

/// Attribute object read entry by entry, so duplicates survive
#[derive(Default)]
struct RawAttributes(Vec<(String, RawValue)>);

impl<'de> Deserialize<'de> for RawAttributes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawAttributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an object of attributes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, RawValue>()? {
                    entries.push(entry);
                }
                Ok(RawAttributes(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn convert_block(raw: RawBlock) -> Result<Block, MapError> {
    let position = raw.position;
    let attributes = raw
        .attributes
        .0
        .into_iter()
        .map(|(name, value)| -> Result<Attribute, MapError> {
            let value = match value {
                RawValue::Int(v) => AttributeValue::Literal(Value::Int(v)),
                RawValue::Str(s) => AttributeValue::Literal(Value::Str(s)),
                RawValue::Expr(source) => AttributeValue::Expression(
                    Expression::parse(&source.expr).map_err(|e| e.or_at(position))?,
                ),
            };
            Ok(Attribute {
                name,
                value,
                position,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block {
        kind: raw.kind,
        label: raw.label,
        attributes,
        position,
    })
}

/// [`SyntaxParser`] for JSON block documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentParser;

impl JsonDocumentParser {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxParser for JsonDocumentParser {
    fn parse(&self, input: &str) -> Result<Vec<Block>, MapError> {
        let parse_span = span!(Level::INFO, "parse_json_document", input_len = input.len());
        let _enter = parse_span.enter();

        let document: RawDocument = serde_json::from_str(input).map_err(|e| {
            MapError::syntax(
                e.to_string(),
                Some(SourcePosition::new(e.line(), e.column())),
            )
        })?;

        let blocks = document
            .blocks
            .into_iter()
            .map(convert_block)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(block_count = blocks.len(), "Parsed JSON document");
        Ok(blocks)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.trim_start().starts_with('{') && input.contains("\"blocks\"")
    }
}
