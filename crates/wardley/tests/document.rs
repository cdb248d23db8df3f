//! JSON block document front-end

use wardley::prelude::*;
use wardley::{AttributeValue, ErrorKind, SourcePosition, Stage, Value};

#[test]
fn test_parse_literal_types() {
    let input = r#"{"blocks": [
        {"kind": "node", "label": "a", "attributes": {"label": "A", "x": 3}}
    ]}"#;
    let blocks = JsonDocumentParser::new().parse(input).unwrap();
    assert_eq!(
        blocks[0].get("label").unwrap().value,
        AttributeValue::Literal(Value::Str("A".to_string()))
    );
    assert_eq!(
        blocks[0].get("x").unwrap().value,
        AttributeValue::Literal(Value::Int(3))
    );
}

#[test]
fn test_block_without_attributes() {
    let blocks = JsonDocumentParser::new()
        .parse(r#"{"blocks": [{"kind": "size"}]}"#)
        .unwrap();
    assert_eq!(blocks[0].kind, BlockKind::Size);
    assert!(blocks[0].attributes.is_empty());
}

#[test]
fn test_unsupported_value_is_syntax_error() {
    let err = JsonDocumentParser::new()
        .parse(r#"{"blocks": [{"kind": "node", "label": "a", "attributes": {"x": 1.5}}]}"#)
        .unwrap_err();
    assert!(matches!(err, MapError::Syntax { .. }));
}

#[test]
fn test_unknown_block_field_rejected() {
    let err = JsonDocumentParser::new()
        .parse(r#"{"blocks": [{"kind": "node", "label": "a", "colour": "red"}]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("colour"));
}

#[test]
fn test_decode_document_duplicate_attribute() {
    let input = r#"{"blocks": [
        {"kind": "node", "label": "a", "position": {"line": 3, "column": 5},
         "attributes": {"evolution": "custom", "fill": "red", "fill": "blue"}}
    ]}"#;
    let failure =
        decode_document(&JsonDocumentParser::new(), input, &DecodeOptions::default()).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Validation);
    assert_eq!(failure.error.position(), Some(SourcePosition::new(3, 5)));
}

#[test]
fn test_decode_document_reports_syntax_stage() {
    let failure = decode_document(
        &JsonDocumentParser::new(),
        r#"{"blocks": [{"kind": "node", "label": "a", "attributes": {"x": {"expr": "node..x"}}}]}"#,
        &DecodeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Syntax);
    assert_eq!(failure.diagnostics.iter().next().unwrap().stage, Stage::Syntax);
}

#[test]
fn test_expression_with_hyphenated_id() {
    let input = r#"{"blocks": [
        {"kind": "node", "label": "web-app", "attributes": {
            "label": "Web app", "evolution": "product", "x": 0, "visibility": 4
        }},
        {"kind": "node", "label": "cdn", "attributes": {
            "label": "CDN", "evolution": "commodity", "x": 1,
            "visibility": {"expr": "node.web-app.visibility - 2"}
        }}
    ]}"#;
    let decoded =
        decode_document(&JsonDocumentParser::new(), input, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.map.node("cdn").unwrap().visibility, 2);
}
