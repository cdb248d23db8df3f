//! Entity decoding
//!
//! Turns one block into a typed entity. Attributes are checked against the
//! block kind, resolved against the evaluation context, converted to their
//! field types, then the kind's default template is merged in.

use std::collections::HashMap;

use tracing::trace;

use super::{resolve_attribute, DefaultTemplates, EvalContext, MergeDefaults};
use crate::core::{
    Block, BlockKind, Connector, ConnectorType, EvolutionStage, MapError, Node, Size,
    SourcePosition, Value,
};

const SIZE_ATTRIBUTES: &[&str] = &["width", "height", "margin", "font_size"];
const NODE_ATTRIBUTES: &[&str] = &[
    "label",
    "description",
    "visibility",
    "evolution",
    "x",
    "fill",
    "color",
];
const CONNECTOR_ATTRIBUTES: &[&str] = &["from", "to", "label", "color", "type"];

fn allowed_attributes(kind: BlockKind) -> &'static [&'static str] {
    match kind {
        BlockKind::Size => SIZE_ATTRIBUTES,
        BlockKind::Node => NODE_ATTRIBUTES,
        BlockKind::Connector => CONNECTOR_ATTRIBUTES,
    }
}

/// A decoded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Size(Size),
    Node(Node),
    Connector(Connector),
}

/// Resolved attribute values of one block, with typed accessors
struct AttributeReader {
    kind: BlockKind,
    values: HashMap<String, (Value, Option<SourcePosition>)>,
}

impl AttributeReader {
    fn read(block: &Block, ctx: &EvalContext) -> Result<Self, MapError> {
        let allowed = allowed_attributes(block.kind);
        let mut values = HashMap::with_capacity(block.attributes.len());

        for attribute in &block.attributes {
            let position = attribute.position.or(block.position);
            if !allowed.contains(&attribute.name.as_str()) {
                return Err(MapError::validation(
                    format!(
                        "unknown attribute '{}' on {} block, expected one of {}",
                        attribute.name,
                        block.kind,
                        allowed.join(", ")
                    ),
                    position,
                ));
            }
            if values.contains_key(&attribute.name) {
                return Err(MapError::validation(
                    format!(
                        "attribute '{}' is given twice on {} block",
                        attribute.name, block.kind
                    ),
                    position,
                ));
            }

            let value = resolve_attribute(attribute, ctx).map_err(|e| e.or_at(position))?;
            values.insert(attribute.name.clone(), (value, position));
        }

        Ok(Self {
            kind: block.kind,
            values,
        })
    }

    /// A string attribute; empty strings read as unset
    fn string(&self, name: &str) -> Result<Option<String>, MapError> {
        match self.values.get(name) {
            None => Ok(None),
            Some((Value::Str(s), _)) if s.is_empty() => Ok(None),
            Some((Value::Str(s), _)) => Ok(Some(s.clone())),
            Some((other, position)) => Err(self.mismatch(name, "string", other, *position)),
        }
    }

    fn required_string(
        &self,
        name: &str,
        block_position: Option<SourcePosition>,
    ) -> Result<String, MapError> {
        self.string(name)?
            .ok_or_else(|| self.missing(name, block_position))
    }

    /// A string attribute that must be present, though it may be empty
    fn present_string(
        &self,
        name: &str,
        block_position: Option<SourcePosition>,
    ) -> Result<String, MapError> {
        if !self.values.contains_key(name) {
            return Err(self.missing(name, block_position));
        }
        Ok(self.string(name)?.unwrap_or_default())
    }

    /// A non-negative integer attribute
    fn uint(&self, name: &str) -> Result<Option<u32>, MapError> {
        match self.values.get(name) {
            None => Ok(None),
            Some((Value::Int(v), position)) => {
                if *v < 0 {
                    return Err(MapError::validation(
                        format!("attribute '{}' must not be negative, got {}", name, v),
                        *position,
                    ));
                }
                u32::try_from(*v).map(Some).map_err(|_| {
                    MapError::validation(
                        format!("attribute '{}' is out of range, got {}", name, v),
                        *position,
                    )
                })
            }
            Some((other, position)) => Err(self.mismatch(name, "number", other, *position)),
        }
    }

    fn required_uint(
        &self,
        name: &str,
        block_position: Option<SourcePosition>,
    ) -> Result<u32, MapError> {
        self.uint(name)?
            .ok_or_else(|| self.missing(name, block_position))
    }

    fn position(&self, name: &str) -> Option<SourcePosition> {
        self.values.get(name).and_then(|(_, position)| *position)
    }

    fn missing(&self, name: &str, block_position: Option<SourcePosition>) -> MapError {
        MapError::validation(
            format!("{} block requires attribute '{}'", self.kind, name),
            block_position,
        )
    }

    fn mismatch(
        &self,
        name: &str,
        expected: &str,
        found: &Value,
        position: Option<SourcePosition>,
    ) -> MapError {
        MapError::validation(
            format!(
                "attribute '{}' on {} block expects a {}, found {}",
                name,
                self.kind,
                expected,
                found.type_name()
            ),
            position,
        )
    }
}

/// Decodes blocks one at a time against a set of default templates
#[derive(Debug, Clone, Copy)]
pub struct EntityDecoder<'a> {
    templates: &'a DefaultTemplates,
}

impl<'a> EntityDecoder<'a> {
    pub fn new(templates: &'a DefaultTemplates) -> Self {
        Self { templates }
    }

    pub fn decode(&self, block: &Block, ctx: &EvalContext) -> Result<Entity, MapError> {
        match block.kind {
            BlockKind::Size => self.decode_size(block, ctx).map(Entity::Size),
            BlockKind::Node => self.decode_node(block, ctx).map(Entity::Node),
            BlockKind::Connector => self.decode_connector(block, ctx).map(Entity::Connector),
        }
    }

    pub fn decode_size(&self, block: &Block, ctx: &EvalContext) -> Result<Size, MapError> {
        reject_label(block)?;
        let attrs = AttributeReader::read(block, ctx)?;

        let mut size = Size::new(
            attrs.uint("width")?.unwrap_or_default(),
            attrs.uint("height")?.unwrap_or_default(),
            attrs.uint("margin")?.unwrap_or_default(),
            attrs.uint("font_size")?.unwrap_or_default(),
        );
        size.merge_defaults(&self.templates.size);
        trace!(?size, "Decoded size block");
        Ok(size)
    }

    pub fn decode_node(&self, block: &Block, ctx: &EvalContext) -> Result<Node, MapError> {
        let id = match block.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => {
                return Err(MapError::validation(
                    "node block requires a label naming the node",
                    block.position,
                ))
            }
        };
        let attrs = AttributeReader::read(block, ctx)?;

        let stage_name = attrs.required_string("evolution", block.position)?;
        let stage = stage_name
            .parse::<EvolutionStage>()
            .map_err(|e| MapError::validation(e, attrs.position("evolution")))?;

        let mut node = Node::new(id, stage);
        node.label = attrs.present_string("label", block.position)?;
        node.description = attrs.string("description")?;
        node.visibility = attrs.required_uint("visibility", block.position)?;
        node.evolution_offset = attrs.required_uint("x", block.position)?;
        node.fill = attrs.string("fill")?.unwrap_or_default();
        node.color = attrs.string("color")?.unwrap_or_default();

        node.merge_defaults(&self.templates.node);
        trace!(
            id = %node.id,
            stage = %node.evolution_stage,
            offset = node.evolution_offset,
            visibility = node.visibility,
            "Decoded node block"
        );
        Ok(node)
    }

    pub fn decode_connector(
        &self,
        block: &Block,
        ctx: &EvalContext,
    ) -> Result<Connector, MapError> {
        reject_label(block)?;
        let attrs = AttributeReader::read(block, ctx)?;

        let mut connector = Connector::new(
            attrs.required_string("from", block.position)?,
            attrs.required_string("to", block.position)?,
        );
        connector.label = attrs.string("label")?;
        connector.color = attrs.string("color")?.unwrap_or_default();
        if let Some(kind) = attrs.string("type")? {
            connector.connector_type = kind
                .parse::<ConnectorType>()
                .map_err(|e| MapError::validation(e, attrs.position("type")))?;
        }

        connector.merge_defaults(&self.templates.connector);
        trace!(from = %connector.from, to = %connector.to, kind = %connector.connector_type, "Decoded connector block");
        Ok(connector)
    }
}

fn reject_label(block: &Block) -> Result<(), MapError> {
    match &block.label {
        Some(label) => Err(MapError::validation(
            format!("{} block does not take a label, got '{}'", block.kind, label),
            block.position,
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeValue, Expression, Field};
    use crate::map::Projection;

    fn decode(block: Block) -> Result<Entity, MapError> {
        let templates = DefaultTemplates::default();
        EntityDecoder::new(&templates).decode(&block, &EvalContext::new())
    }

    #[test]
    fn test_decode_node_with_defaults() {
        let block = Block::node("db")
            .with_attr("label", "Database")
            .with_attr("evolution", "product")
            .with_attr("x", 2)
            .with_attr("visibility", 1);

        let Entity::Node(node) = decode(block).unwrap() else {
            panic!("expected a node");
        };
        assert_eq!(node.id, "db");
        assert_eq!(node.label, "Database");
        assert_eq!(node.evolution_stage, EvolutionStage::Product);
        assert_eq!(node.evolution_offset, 2);
        assert_eq!(node.visibility, 1);
        assert_eq!(node.fill, "white");
        assert_eq!(node.color, "black");
        assert_eq!(node.description, None);
    }

    #[test]
    fn test_empty_string_gets_default() {
        let block = Block::node("a")
            .with_attr("label", "")
            .with_attr("evolution", "genesis")
            .with_attr("x", 0)
            .with_attr("visibility", 0)
            .with_attr("color", "")
            .with_attr("description", "");
        let Entity::Node(node) = decode(block).unwrap() else {
            panic!("expected a node");
        };
        assert_eq!(node.color, "black");
        assert_eq!(node.description, None);
        assert_eq!(node.label, "");
        assert_eq!(node.evolution_offset, 0);
    }

    #[test]
    fn test_node_requires_evolution() {
        let err = decode(Block::node("a").with_attr("x", 1)).unwrap_err();
        assert!(err.to_string().contains("'evolution'"));
    }

    #[test]
    fn test_node_requires_label() {
        let err = decode(Block::new(BlockKind::Node).with_attr("evolution", "custom")).unwrap_err();
        assert!(matches!(err, MapError::Validation { .. }));
    }

    #[test]
    fn test_node_requires_each_attribute() {
        let complete = [
            ("label", AttributeValue::from("A")),
            ("evolution", AttributeValue::from("custom")),
            ("x", AttributeValue::from(1)),
            ("visibility", AttributeValue::from(2)),
        ];
        for (skipped, _) in &complete {
            let mut block = Block::node("a").at(SourcePosition::new(7, 1));
            for (name, value) in &complete {
                if name != skipped {
                    block = block.with_attr(*name, value.clone());
                }
            }
            let err = decode(block).unwrap_err();
            assert!(matches!(err, MapError::Validation { .. }));
            assert!(
                err.to_string()
                    .contains(&format!("node block requires attribute '{}'", skipped)),
                "{}",
                err
            );
            assert_eq!(err.position(), Some(SourcePosition::new(7, 1)));
        }
    }

    #[test]
    fn test_invalid_stage() {
        let err = decode(Block::node("a").with_attr("evolution", "mature")).unwrap_err();
        assert!(err.to_string().contains("unknown evolution stage"));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = decode(
            Block::node("a")
                .with_attr("evolution", "custom")
                .with_attr("shape", "circle"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown attribute 'shape'"));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = decode(
            Block::node("a")
                .with_attr("evolution", "custom")
                .with_attr("x", 1)
                .with_attr("x", 2),
        )
        .unwrap_err();
        assert!(err.to_string().contains("given twice"));
    }

    #[test]
    fn test_negative_value() {
        let err = decode(
            Block::node("a")
                .with_attr("label", "A")
                .with_attr("evolution", "custom")
                .with_attr("visibility", -1),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_type_mismatch() {
        let err = decode(Block::node("a").with_attr("evolution", 3)).unwrap_err();
        assert!(err.to_string().contains("expects a string, found number"));

        let err = decode(
            Block::node("a")
                .with_attr("label", "A")
                .with_attr("evolution", "custom")
                .with_attr("visibility", 0)
                .with_attr("x", "two"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expects a number, found string"));
    }

    #[test]
    fn test_node_expression_reads_context() {
        let templates = DefaultTemplates::default();
        let mut ctx = EvalContext::new();
        ctx.register("a", Projection { x: 1, visibility: 2 });

        let block = Block::node("b")
            .with_attr("label", "B")
            .with_attr("evolution", "custom")
            .with_attr("x", Expression::reference("a", Field::X).plus(1))
            .with_attr("visibility", Expression::reference("a", Field::Visibility));
        let node = EntityDecoder::new(&templates)
            .decode_node(&block, &ctx)
            .unwrap();
        assert_eq!(node.evolution_offset, 2);
        assert_eq!(node.visibility, 2);
    }

    #[test]
    fn test_expression_into_string_attribute_is_mismatch() {
        let templates = DefaultTemplates::default();
        let mut ctx = EvalContext::new();
        ctx.register("a", Projection { x: 1, visibility: 2 });

        let block = Block::node("b")
            .with_attr("label", "B")
            .with_attr("evolution", "custom")
            .with_attr("x", 0)
            .with_attr("visibility", 0)
            .with_attr("fill", Expression::reference("a", Field::X));
        let err = EntityDecoder::new(&templates)
            .decode_node(&block, &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("expects a string"));
    }

    #[test]
    fn test_decode_size_partial() {
        let Entity::Size(size) = decode(Block::size().with_attr("width", 800)).unwrap() else {
            panic!("expected a size");
        };
        assert_eq!(size, Size::new(800, 768, 40, 12));
    }

    #[test]
    fn test_size_rejects_label() {
        let err = decode(Block::size().with_label("big")).unwrap_err();
        assert!(err.to_string().contains("does not take a label"));
    }

    #[test]
    fn test_decode_connector() {
        let block = Block::connector()
            .with_attr("from", "a")
            .with_attr("to", "b")
            .with_attr("type", "change-inertia")
            .with_attr("label", "migrates");
        let Entity::Connector(connector) = decode(block).unwrap() else {
            panic!("expected a connector");
        };
        assert_eq!(connector.connector_type, ConnectorType::ChangeInertia);
        assert_eq!(connector.color, "black");
        assert_eq!(connector.label.as_deref(), Some("migrates"));
    }

    #[test]
    fn test_connector_requires_endpoints() {
        let err = decode(Block::connector().with_attr("from", "a")).unwrap_err();
        assert!(err.to_string().contains("'to'"));
    }

    #[test]
    fn test_connector_invalid_type() {
        let err = decode(
            Block::connector()
                .with_attr("from", "a")
                .with_attr("to", "b")
                .with_attr("type", "dotted"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown connector type"));
    }
}
