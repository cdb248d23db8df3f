//! Decode pass behaviour: references, ordering and validation

use wardley::prelude::*;
use wardley::{AttributeValue, ErrorKind, Field, SourcePosition};

fn node_at(
    id: &str,
    x: impl Into<AttributeValue>,
    visibility: impl Into<AttributeValue>,
) -> Block {
    Block::node(id)
        .with_attr("label", id.to_uppercase())
        .with_attr("evolution", "custom")
        .with_attr("x", x)
        .with_attr("visibility", visibility)
}

fn node(id: &str) -> Block {
    node_at(id, 0, 0)
}

fn decode_default(blocks: &[Block]) -> Result<Decoded, DecodeFailure> {
    decode(blocks, &DecodeOptions::default())
}

#[test]
fn test_empty_document_gives_default_map() {
    let decoded = decode_default(&[]).unwrap();
    assert_eq!(decoded.map.node_count(), 0);
    assert_eq!(decoded.map.connector_count(), 0);
    assert_eq!(decoded.map.size, Size::standard(SizeVariant::Standard));
    assert!(decoded.diagnostics.is_empty());
}

#[test]
fn test_backward_reference_resolves() {
    let blocks = vec![
        node_at("a", 1, 0),
        node_at("b", Expression::reference("a", Field::X).plus(1), 0),
    ];
    let decoded = decode_default(&blocks).unwrap();
    assert_eq!(decoded.map.node("b").unwrap().evolution_offset, 2);
}

#[test]
fn test_reference_chain() {
    let blocks = vec![
        node_at("a", 0, 5),
        node_at("b", 0, Expression::reference("a", Field::Visibility).minus(1)),
        node_at("c", 0, Expression::parse("node.b.visibility - 1").unwrap()),
        node_at(
            "d",
            0,
            Expression::parse("node.a.visibility - node.c.visibility").unwrap(),
        ),
    ];
    let decoded = decode_default(&blocks).unwrap();
    let visibility: Vec<_> = decoded.map.nodes.values().map(|n| n.visibility).collect();
    assert_eq!(visibility, vec![5, 4, 3, 2]);
}

#[test]
fn test_forward_reference_is_fatal() {
    let blocks = vec![
        node_at("b", Expression::reference("a", Field::X).plus(1), 0),
        node_at("a", 1, 0),
    ];
    let failure = decode_default(&blocks).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::UnresolvedReference);
    assert!(failure.to_string().contains("not decoded yet"));
}

#[test]
fn test_self_reference_is_fatal() {
    let blocks = vec![node_at("a", Expression::reference("a", Field::X), 0)];
    let failure = decode_default(&blocks).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::UnresolvedReference);
}

#[test]
fn test_unknown_reference_is_fatal() {
    let blocks = vec![node_at("a", Expression::reference("nobody", Field::X), 0)];
    let failure = decode_default(&blocks).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::UnresolvedReference);
    assert!(failure.to_string().contains("no node named 'nobody'"));
}

#[test]
fn test_node_missing_required_attribute_is_fatal() {
    for missing in ["label", "x", "visibility", "evolution"] {
        let mut block = Block::node("a").at(SourcePosition::new(2, 1));
        for (name, value) in [
            ("label", AttributeValue::from("A")),
            ("evolution", AttributeValue::from("custom")),
            ("x", AttributeValue::from(1)),
            ("visibility", AttributeValue::from(1)),
        ] {
            if name != missing {
                block = block.with_attr(name, value);
            }
        }

        let failure = decode_default(&[block]).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(
            failure
                .to_string()
                .contains(&format!("node block requires attribute '{}'", missing)),
            "{}",
            failure
        );
        assert_eq!(failure.error.position(), Some(SourcePosition::new(2, 1)));
    }
}

#[test]
fn test_explicit_zero_and_empty_label_are_accepted() {
    let block = Block::node("a")
        .with_attr("label", "")
        .with_attr("evolution", "genesis")
        .with_attr("x", 0)
        .with_attr("visibility", 0);
    let decoded = decode_default(&[block]).unwrap();
    let node = decoded.map.node("a").unwrap();
    assert_eq!(node.label, "");
    assert_eq!((node.evolution_offset, node.visibility), (0, 0));
}

#[test]
fn test_negative_expression_result_rejected() {
    let blocks = vec![
        node_at("a", 0, 0),
        node_at("b", Expression::reference("a", Field::X).minus(1), 0),
    ];
    let failure = decode_default(&blocks).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Validation);
    assert!(failure.to_string().contains("must not be negative"));
}

#[test]
fn test_duplicate_node_id_is_fatal() {
    let blocks = vec![
        node("a"),
        node("a").at(SourcePosition::new(7, 1)),
    ];
    let failure = decode_default(&blocks).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Validation);
    assert_eq!(failure.error.position(), Some(SourcePosition::new(7, 1)));
}

#[test]
fn test_first_fatal_error_stops_the_pass() {
    let blocks = vec![
        node("a").with_attr("evolution", "custom"),
        Block::node("b").with_attr("evolution", "unknown"),
    ];
    let failure = decode_default(&blocks).unwrap_err();
    // Both the duplicate attribute and the later bad stage are errors; only
    // the first is reported
    assert_eq!(failure.diagnostics.len(), 1);
    assert!(failure.to_string().contains("given twice"));
}

#[test]
fn test_dangling_connector_dropped() {
    let blocks = vec![
        node("a"),
        node("b"),
        Block::connector().with_attr("from", "a").with_attr("to", "b"),
        Block::connector().with_attr("from", "a").with_attr("to", "missing"),
    ];
    let decoded = decode_default(&blocks).unwrap();
    assert_eq!(decoded.map.connector_count(), 1);
    assert_eq!(decoded.diagnostics.len(), 1);
    assert!(!decoded.diagnostics.has_errors());
}

#[test]
fn test_both_endpoints_missing_is_one_diagnostic() {
    let blocks = vec![Block::connector().with_attr("from", "x").with_attr("to", "y")];
    let decoded = decode_default(&blocks).unwrap();
    assert_eq!(decoded.map.connector_count(), 0);
    assert_eq!(decoded.diagnostics.len(), 1);
}

#[test]
fn test_document_order_is_kept() {
    let blocks = vec![node("zeta"), node("alpha"), node("mid")];
    let decoded = decode_default(&blocks).unwrap();
    let ids: Vec<_> = decoded.map.nodes.keys().cloned().collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_decoding_is_deterministic() {
    let blocks = vec![
        node_at("a", 3, 0),
        node_at("b", Expression::reference("a", Field::X).plus(2), 0),
        Block::connector().with_attr("from", "a").with_attr("to", "b"),
        Block::connector().with_attr("from", "a").with_attr("to", "c"),
    ];
    let first = decode_default(&blocks).unwrap();
    let second = decode_default(&blocks).unwrap();
    assert_eq!(first.map, second.map);
    assert_eq!(first.diagnostics, second.diagnostics);
}
