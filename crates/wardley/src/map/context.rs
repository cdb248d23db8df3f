//! Evaluation context for cross-node references
//!
//! The context grows by one entry each time a node block finishes decoding.
//! It belongs to a single decode pass and is dropped when the pass ends.

use std::collections::{HashMap, HashSet};

use crate::core::{Field, MapError, Node, SourcePosition};

/// The node fields later blocks may read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Projection {
    /// Raw evolution offset, before layout
    pub x: i64,
    pub visibility: i64,
}

impl Projection {
    pub fn of(node: &Node) -> Self {
        Self {
            x: i64::from(node.evolution_offset),
            visibility: i64::from(node.visibility),
        }
    }

    pub fn get(&self, field: Field) -> i64 {
        match field {
            Field::X => self.x,
            Field::Visibility => self.visibility,
        }
    }
}

/// Lookup of already-decoded nodes, keyed by id
///
/// Knows every node id declared in the document so that a reference to a
/// node that exists further down reads as a forward reference instead of an
/// unknown name.
#[derive(Debug, Default)]
pub struct EvalContext {
    entries: HashMap<String, Projection>,
    declared: HashSet<String>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context aware of every node id the document declares
    pub fn with_declared<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: HashMap::new(),
            declared: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Add or overwrite the entry for `id`
    pub fn register(&mut self, id: impl Into<String>, projection: Projection) {
        self.entries.insert(id.into(), projection);
    }

    pub fn lookup(&self, id: &str) -> Option<&Projection> {
        self.entries.get(id)
    }

    /// Read `node.<id>.<field>`, explaining why when it is not available yet
    pub fn read(
        &self,
        id: &str,
        field: Field,
        position: Option<SourcePosition>,
    ) -> Result<i64, MapError> {
        if let Some(projection) = self.lookup(id) {
            return Ok(projection.get(field));
        }

        let reference = format!("node.{}.{}", id, field);
        let message = if self.declared.contains(id) {
            format!(
                "node '{}' is not decoded yet; only nodes declared earlier in the document can be referenced",
                id
            )
        } else {
            format!("no node named '{}' is declared", id)
        };
        Err(MapError::unresolved(reference, message, position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
