//! Block-level document abstraction
//!
//! Front-ends turn a concrete document syntax into an ordered sequence of
//! [`Block`]s. The decoder only ever sees blocks, so any syntax that can
//! express kind, label and attributes can feed it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Expression, MapError};

/// Location of a block or attribute in the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Block kinds a map document is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Size,
    Node,
    Connector,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Size => write!(f, "size"),
            BlockKind::Node => write!(f, "node"),
            BlockKind::Connector => write!(f, "connector"),
        }
    }
}

/// A literal attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Right-hand side of an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Literal(Value),
    /// Evaluated against the nodes decoded so far
    Expression(Expression),
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Literal(value)
    }
}

impl From<Expression> for AttributeValue {
    fn from(expr: Expression) -> Self {
        AttributeValue::Expression(expr)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Literal(Value::Int(value))
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Literal(Value::Int(i64::from(value)))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Literal(Value::from(value))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Literal(Value::Str(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
    pub position: Option<SourcePosition>,
}

/// One `size`, `node` or `connector` block
///
/// Attributes keep source order. A name appearing twice is rejected by the
/// decoder, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub label: Option<String>,
    pub attributes: Vec<Attribute>,
    pub position: Option<SourcePosition>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            label: None,
            attributes: Vec::new(),
            position: None,
        }
    }

    pub fn size() -> Self {
        Self::new(BlockKind::Size)
    }

    pub fn node(label: impl Into<String>) -> Self {
        Self::new(BlockKind::Node).with_label(label)
    }

    pub fn connector() -> Self {
        Self::new(BlockKind::Connector)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
            position: None,
        });
        self
    }

    pub fn at(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Trait for front-ends that turn document text into blocks
pub trait SyntaxParser: Send + Sync {
    /// Parse input text into an ordered block sequence
    fn parse(&self, input: &str) -> Result<Vec<Block>, MapError>;

    /// Get the name of this syntax parser
    fn name(&self) -> &'static str;

    /// Check if the input looks like something this parser accepts
    fn can_parse(&self, input: &str) -> bool;
}
