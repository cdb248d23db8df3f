//! Reference expressions
//!
//! The only computation a document may perform is reading an earlier node's
//! `x` (its evolution offset) or `visibility` and adding integer constants:
//!
//! ```text
//! node.storage.x + 1
//! node.api.visibility - node.db.visibility + 2
//! ```

use std::fmt;

use chumsky::prelude::*;

use super::MapError;

/// Projected node field an expression can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The node's evolution offset
    X,
    Visibility,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::X => write!(f, "x"),
            Field::Visibility => write!(f, "visibility"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Literal(i64),
    Reference { node: String, field: Field },
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(value) => write!(f, "{}", value),
            Term::Reference { node, field } => write!(f, "node.{}.{}", node, field),
        }
    }
}

/// A signed sum of literals and node references
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    terms: Vec<(Sign, Term)>,
}

impl Expression {
    /// An expression reading a single node field
    pub fn reference(node: impl Into<String>, field: Field) -> Self {
        Self {
            terms: vec![(
                Sign::Plus,
                Term::Reference {
                    node: node.into(),
                    field,
                },
            )],
        }
    }

    pub fn plus(mut self, value: i64) -> Self {
        self.terms.push((Sign::Plus, Term::Literal(value)));
        self
    }

    pub fn minus(mut self, value: i64) -> Self {
        self.terms.push((Sign::Minus, Term::Literal(value)));
        self
    }

    pub fn terms(&self) -> &[(Sign, Term)] {
        &self.terms
    }

    /// Node references in source order
    pub fn references(&self) -> impl Iterator<Item = (&str, Field)> {
        self.terms.iter().filter_map(|(_, term)| match term {
            Term::Reference { node, field } => Some((node.as_str(), *field)),
            Term::Literal(_) => None,
        })
    }

    /// Evaluate with `lookup` supplying referenced node fields
    pub fn evaluate<F>(&self, mut lookup: F) -> Result<i64, MapError>
    where
        F: FnMut(&str, Field) -> Result<i64, MapError>,
    {
        let mut total: i64 = 0;
        for (sign, term) in &self.terms {
            let value = match term {
                Term::Literal(value) => *value,
                Term::Reference { node, field } => lookup(node, *field)?,
            };
            let next = match sign {
                Sign::Plus => total.checked_add(value),
                Sign::Minus => total.checked_sub(value),
            };
            total = next.ok_or_else(|| {
                MapError::validation(format!("expression '{}' overflows", self), None)
            })?;
        }
        Ok(total)
    }

    /// Parse the textual form of an expression
    pub fn parse(input: &str) -> Result<Self, MapError> {
        Self::parser().parse(input).into_result().map_err(|errors| {
            let detail = errors
                .first()
                .map(|e| format!("{} at offset {}", e, e.span().start))
                .unwrap_or_else(|| "unrecognized input".to_string());
            MapError::syntax(format!("invalid expression '{}': {}", input, detail), None)
        })
    }

    fn parser<'src>() -> impl Parser<'src, &'src str, Expression, extra::Err<Rich<'src, char>>> {
        let ws = one_of(" \t").repeated().ignored();

        let integer = text::int(10).try_map(|digits: &str, span| {
            digits
                .parse::<i64>()
                .map_err(|e| Rich::custom(span, format!("invalid integer '{}': {}", digits, e)))
        });

        let node_id = any()
            .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| s.to_string());

        let field = just("visibility")
            .to(Field::Visibility)
            .or(just("x").to(Field::X));

        let reference = just("node")
            .ignore_then(just('.'))
            .ignore_then(node_id)
            .then_ignore(just('.'))
            .then(field)
            .map(|(node, field)| Term::Reference { node, field });

        let term = integer.map(Term::Literal).or(reference);

        let sign = just('+').to(Sign::Plus).or(just('-').to(Sign::Minus));

        let first = sign
            .clone()
            .then_ignore(ws.clone())
            .or_not()
            .then(term.clone())
            .map(|(sign, term)| (sign.unwrap_or(Sign::Plus), term));

        let rest = ws
            .clone()
            .ignore_then(sign)
            .then_ignore(ws.clone())
            .then(term)
            .repeated()
            .collect::<Vec<_>>();

        first
            .then(rest)
            .padded_by(ws)
            .then_ignore(end())
            .map(|(first, rest)| {
                let mut terms = Vec::with_capacity(rest.len() + 1);
                terms.push(first);
                terms.extend(rest);
                Expression { terms }
            })
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (sign, term)) in self.terms.iter().enumerate() {
            match (i, sign) {
                (0, Sign::Plus) => write!(f, "{}", term)?,
                (0, Sign::Minus) => write!(f, "-{}", term)?,
                (_, Sign::Plus) => write!(f, " + {}", term)?,
                (_, Sign::Minus) => write!(f, " - {}", term)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_plus_literal() {
        let expr = Expression::parse("node.a.x + 1").unwrap();
        assert_eq!(expr, Expression::reference("a", Field::X).plus(1));
        assert_eq!(expr.to_string(), "node.a.x + 1");
    }

    #[test]
    fn test_parse_without_spaces() {
        let expr = Expression::parse("node.web-app.visibility-2").unwrap();
        assert_eq!(
            expr,
            Expression::reference("web-app", Field::Visibility).minus(2)
        );
    }

    #[test]
    fn test_parse_literal_only() {
        let expr = Expression::parse(" -3 ").unwrap();
        assert_eq!(expr.evaluate(|_, _| unreachable!()).unwrap(), -3);
        assert_eq!(expr.references().count(), 0);
    }

    #[test]
    fn test_parse_multiple_references() {
        let expr = Expression::parse("node.a.x + node.b.visibility - 1").unwrap();
        let refs: Vec<_> = expr.references().collect();
        assert_eq!(refs, vec![("a", Field::X), ("b", Field::Visibility)]);
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let err = Expression::parse("node.a.fill").unwrap_err();
        assert!(matches!(err, MapError::Syntax { .. }));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Expression::parse("").is_err());
        assert!(Expression::parse("node.a").is_err());
        assert!(Expression::parse("1 +").is_err());
        assert!(Expression::parse("a.x + 1").is_err());
    }

    #[test]
    fn test_evaluate_uses_lookup() {
        let expr = Expression::parse("node.a.x + node.b.x + 1").unwrap();
        let value = expr
            .evaluate(|node, _| Ok(if node == "a" { 2 } else { 5 }))
            .unwrap();
        assert_eq!(value, 8);
    }

    #[test]
    fn test_evaluate_propagates_lookup_error() {
        let expr = Expression::reference("missing", Field::X);
        let err = expr
            .evaluate(|node, _| Err(MapError::unresolved(node, "not declared", None)))
            .unwrap_err();
        assert!(matches!(err, MapError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_evaluate_overflow_is_validation_error() {
        let expr = Expression::reference("a", Field::X).plus(1);
        let err = expr.evaluate(|_, _| Ok(i64::MAX)).unwrap_err();
        assert!(matches!(err, MapError::Validation { .. }));
    }
}
