//! Attribute resolution
//!
//! Literals pass through unchanged; expressions are evaluated against the
//! context as it stands when the attribute's block is decoded.

use tracing::trace;

use super::EvalContext;
use crate::core::{Attribute, AttributeValue, MapError, Value};

/// Resolve one attribute to a literal value
pub fn resolve_attribute(attribute: &Attribute, ctx: &EvalContext) -> Result<Value, MapError> {
    match &attribute.value {
        AttributeValue::Literal(value) => Ok(value.clone()),
        AttributeValue::Expression(expr) => {
            let value = expr
                .evaluate(|id, field| ctx.read(id, field, attribute.position))
                .map_err(|e| e.or_at(attribute.position))?;
            trace!(attribute = %attribute.name, expression = %expr, value, "Resolved expression");
            Ok(Value::Int(value))
        }
    }
}
