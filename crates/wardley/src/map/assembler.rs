//! Model assembly
//!
//! Drives the entity decoder over a block sequence in document order. Each
//! node is registered in the evaluation context as soon as it is decoded, so
//! later blocks can read its `x` and `visibility`. Once every block is
//! decoded, connectors are checked against the node set and those pointing at
//! unknown nodes are dropped with a warning.

use tracing::{debug, info, span, trace, warn, Level};

use super::{DefaultTemplates, Entity, EntityDecoder, EvalContext, Projection};
use crate::core::{
    Block, BlockKind, Connector, DecodeFailure, Diagnostics, Map, MapError, Size, SizeVariant,
    SourcePosition, Stage, SyntaxParser,
};

/// Per-call decode configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub templates: DefaultTemplates,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for dense maps, with the smaller font size
    pub fn compact() -> Self {
        Self {
            templates: DefaultTemplates::for_variant(SizeVariant::Compact),
        }
    }

    pub fn with_variant(variant: SizeVariant) -> Self {
        Self {
            templates: DefaultTemplates::for_variant(variant),
        }
    }

    /// Replace the size template used for a missing or partial size block
    pub fn with_size_defaults(mut self, size: Size) -> Self {
        self.templates = self.templates.with_size(size);
        self
    }
}

/// A successfully assembled map plus any recoverable diagnostics
#[derive(Debug, Clone)]
pub struct Decoded {
    pub map: Map,
    pub diagnostics: Diagnostics,
}

impl Decoded {
    /// Treat recoverable diagnostics as fatal
    pub fn strict(self) -> Result<Map, DecodeFailure> {
        let first = self.diagnostics.warnings().next().cloned();
        match first {
            None => Ok(self.map),
            Some(first) => {
                let count = self.diagnostics.warnings().count();
                let error = MapError::validation(
                    format!(
                        "{} recoverable diagnostic(s) escalated in strict mode, first: {}",
                        count, first.message
                    ),
                    first.position,
                );
                Err(DecodeFailure {
                    error,
                    diagnostics: self.diagnostics,
                })
            }
        }
    }
}

/// Builds a [`Map`] from an ordered block sequence
#[derive(Debug, Clone, Copy)]
pub struct MapAssembler<'a> {
    options: &'a DecodeOptions,
}

impl<'a> MapAssembler<'a> {
    pub fn new(options: &'a DecodeOptions) -> Self {
        Self { options }
    }

    pub fn assemble(&self, blocks: &[Block]) -> Result<Decoded, DecodeFailure> {
        let decode_span = span!(Level::INFO, "decode_map", block_count = blocks.len());
        let _enter = decode_span.enter();

        let mut diagnostics = Diagnostics::new();
        let templates = &self.options.templates;

        if let Err(error) = templates.validate() {
            return Err(fail(&mut diagnostics, Stage::Defaults, error));
        }

        let mut ctx = EvalContext::with_declared(
            blocks
                .iter()
                .filter(|b| b.kind == BlockKind::Node)
                .filter_map(|b| b.label.clone()),
        );
        let decoder = EntityDecoder::new(templates);

        let mut size: Option<Size> = None;
        let mut map = Map::default();
        let mut pending: Vec<(Connector, Option<SourcePosition>)> = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            trace!(index, kind = %block.kind, label = ?block.label, "Decoding block");

            let entity = match decoder.decode(block, &ctx) {
                Ok(entity) => entity,
                Err(error) => return Err(fail(&mut diagnostics, Stage::Decode, error)),
            };

            match entity {
                Entity::Size(decoded) => {
                    if size.is_some() {
                        let error = MapError::validation(
                            "size is declared more than once",
                            block.position,
                        );
                        return Err(fail(&mut diagnostics, Stage::Decode, error));
                    }
                    size = Some(decoded);
                }
                Entity::Node(node) => {
                    if map.nodes.contains_key(&node.id) {
                        let error = MapError::validation(
                            format!("node '{}' is declared more than once", node.id),
                            block.position,
                        );
                        return Err(fail(&mut diagnostics, Stage::Decode, error));
                    }
                    ctx.register(node.id.clone(), Projection::of(&node));
                    map.nodes.insert(node.id.clone(), node);
                }
                Entity::Connector(connector) => pending.push((connector, block.position)),
            }
        }
        debug!(
            node_count = map.nodes.len(),
            connector_count = pending.len(),
            "Decoded all blocks"
        );

        map.size = size.unwrap_or(templates.size);

        for (connector, position) in pending {
            match missing_endpoint(&map, &connector) {
                None => map.connectors.push(connector),
                Some(missing) => {
                    let missing = missing.to_string();
                    let error = MapError::DanglingConnector {
                        missing,
                        from: connector.from,
                        to: connector.to,
                        position,
                    };
                    warn!(%error, "Dropping connector");
                    diagnostics.record(Stage::Validation, &error);
                }
            }
        }

        info!(
            node_count = map.node_count(),
            connector_count = map.connector_count(),
            warnings = diagnostics.len(),
            "Map assembled"
        );

        Ok(Decoded { map, diagnostics })
    }
}

fn missing_endpoint<'c>(map: &Map, connector: &'c Connector) -> Option<&'c str> {
    [connector.from.as_str(), connector.to.as_str()]
        .into_iter()
        .find(|id| !map.nodes.contains_key(*id))
}

fn fail(diagnostics: &mut Diagnostics, stage: Stage, error: MapError) -> DecodeFailure {
    warn!(%error, %stage, "Decode failed");
    diagnostics.record(stage, &error);
    DecodeFailure {
        error,
        diagnostics: std::mem::take(diagnostics),
    }
}

/// Decode an ordered block sequence into a map
pub fn decode(blocks: &[Block], options: &DecodeOptions) -> Result<Decoded, DecodeFailure> {
    MapAssembler::new(options).assemble(blocks)
}

/// Parse `input` with a front-end, then decode the resulting blocks
///
/// Front-end failures are reported like any other fatal diagnostic.
pub fn decode_document(
    parser: &dyn SyntaxParser,
    input: &str,
    options: &DecodeOptions,
) -> Result<Decoded, DecodeFailure> {
    let blocks = parser.parse(input).map_err(|error| {
        let mut diagnostics = Diagnostics::new();
        fail(&mut diagnostics, Stage::Syntax, error)
    })?;
    decode(&blocks, options)
}
