//! Core type definitions for strategy maps
//!
//! This module contains the model the decoder produces and the layout engine
//! fills in: evolution stages, connector types, the canvas size, nodes,
//! connectors and the map that owns them.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maturity stage of a node, used as the horizontal axis
///
/// Stages are ordered left to right: genesis < custom < product < commodity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionStage {
    #[default]
    Genesis,
    Custom,
    Product,
    Commodity,
}

impl EvolutionStage {
    /// All stages in axis order
    pub const ALL: [EvolutionStage; 4] = [
        EvolutionStage::Genesis,
        EvolutionStage::Custom,
        EvolutionStage::Product,
        EvolutionStage::Commodity,
    ];

    /// Zero-based band index on the evolution axis
    pub fn index(&self) -> usize {
        match self {
            EvolutionStage::Genesis => 0,
            EvolutionStage::Custom => 1,
            EvolutionStage::Product => 2,
            EvolutionStage::Commodity => 3,
        }
    }

    /// Text printed under the band on the evolution axis
    pub fn axis_label(&self) -> &'static str {
        match self {
            EvolutionStage::Genesis => "Genesis",
            EvolutionStage::Custom => "Custom",
            EvolutionStage::Product => "Product (+rental)",
            EvolutionStage::Commodity => "Commodity (+utility)",
        }
    }
}

impl FromStr for EvolutionStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genesis" => Ok(EvolutionStage::Genesis),
            "custom" => Ok(EvolutionStage::Custom),
            "product" => Ok(EvolutionStage::Product),
            "commodity" => Ok(EvolutionStage::Commodity),
            _ => Err(format!(
                "unknown evolution stage '{}', expected one of genesis, custom, product, commodity",
                s
            )),
        }
    }
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolutionStage::Genesis => write!(f, "genesis"),
            EvolutionStage::Custom => write!(f, "custom"),
            EvolutionStage::Product => write!(f, "product"),
            EvolutionStage::Commodity => write!(f, "commodity"),
        }
    }
}

/// Relationship drawn between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectorType {
    /// Plain dependency, faint straight line
    #[default]
    Normal,
    /// Emphasized dependency, strong straight line
    Bold,
    /// Evolving component, dashed line with an arrow
    Change,
    /// Evolution held back by inertia, dashed with a barrier mark
    ChangeInertia,
}

impl ConnectorType {
    /// Stroke opacity used when drawing this connector
    pub fn opacity(&self) -> f32 {
        match self {
            ConnectorType::Normal => 0.2,
            ConnectorType::Bold => 0.8,
            ConnectorType::Change | ConnectorType::ChangeInertia => 0.6,
        }
    }

    /// Returns true if this connector is drawn dashed
    pub fn is_dashed(&self) -> bool {
        matches!(self, ConnectorType::Change | ConnectorType::ChangeInertia)
    }

    /// Returns true if this connector ends in an arrowhead
    pub fn has_arrow(&self) -> bool {
        self.is_dashed()
    }

    /// Returns true if this connector carries an inertia marker at its midpoint
    pub fn has_inertia(&self) -> bool {
        matches!(self, ConnectorType::ChangeInertia)
    }

    /// Returns true if the path bends through the midpoint between its ends
    pub fn routes_through_midpoint(&self) -> bool {
        self.is_dashed()
    }
}

impl FromStr for ConnectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ConnectorType::Normal),
            "bold" => Ok(ConnectorType::Bold),
            "change" => Ok(ConnectorType::Change),
            "change-inertia" => Ok(ConnectorType::ChangeInertia),
            _ => Err(format!(
                "unknown connector type '{}', expected one of normal, bold, change, change-inertia",
                s
            )),
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorType::Normal => write!(f, "normal"),
            ConnectorType::Bold => write!(f, "bold"),
            ConnectorType::Change => write!(f, "change"),
            ConnectorType::ChangeInertia => write!(f, "change-inertia"),
        }
    }
}

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub font_size: u32,
}

impl Size {
    pub const DEFAULT_WIDTH: u32 = 1280;
    pub const DEFAULT_HEIGHT: u32 = 768;
    pub const DEFAULT_MARGIN: u32 = 40;
    pub const DEFAULT_FONT_SIZE: u32 = 12;
    pub const COMPACT_FONT_SIZE: u32 = 9;

    pub fn new(width: u32, height: u32, margin: u32, font_size: u32) -> Self {
        Self {
            width,
            height,
            margin,
            font_size,
        }
    }

    /// The full default size for the given variant
    pub fn standard(variant: SizeVariant) -> Self {
        Self::new(
            Self::DEFAULT_WIDTH,
            Self::DEFAULT_HEIGHT,
            Self::DEFAULT_MARGIN,
            variant.font_size(),
        )
    }
}

/// Selects the default font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeVariant {
    #[default]
    Standard,
    /// Smaller text for dense maps
    Compact,
}

impl SizeVariant {
    pub fn font_size(&self) -> u32 {
        match self {
            SizeVariant::Standard => Size::DEFAULT_FONT_SIZE,
            SizeVariant::Compact => Size::COMPACT_FONT_SIZE,
        }
    }
}

/// A component placed on the map
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Block label; serialized as the key of the node collection
    #[serde(skip)]
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visibility: u32,
    pub evolution_stage: EvolutionStage,
    pub evolution_offset: u32,
    pub fill: String,
    pub color: String,
    /// Computed by the layout engine
    #[serde(default)]
    pub x: i64,
    /// Computed by the layout engine
    #[serde(default)]
    pub y: i64,
}

impl Node {
    pub fn new(id: impl Into<String>, stage: EvolutionStage) -> Self {
        Self {
            id: id.into(),
            evolution_stage: stage,
            ..Self::default()
        }
    }

    /// Hover text: the description when there is one, otherwise the label
    pub fn title(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.label)
    }
}

/// A relationship between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Connector {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub color: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
}

impl Connector {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, connector_type: ConnectorType) -> Self {
        self.connector_type = connector_type;
        self
    }
}

/// A fully decoded strategy map
///
/// Nodes keep document order and are keyed by id. Serialization follows the
/// shape renderers consume: `{size, nodes: {id: {..}}, connectors: [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "MapRepr")]
pub struct Map {
    pub size: Size,
    pub nodes: IndexMap<String, Node>,
    pub connectors: Vec<Connector>,
}

impl Map {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            nodes: IndexMap::new(),
            connectors: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connectors.is_empty()
    }
}

#[derive(Deserialize)]
struct MapRepr {
    size: Size,
    #[serde(default)]
    nodes: IndexMap<String, Node>,
    #[serde(default)]
    connectors: Vec<Connector>,
}

impl From<MapRepr> for Map {
    fn from(repr: MapRepr) -> Self {
        let nodes = repr
            .nodes
            .into_iter()
            .map(|(id, mut node)| {
                node.id = id.clone();
                (id, node)
            })
            .collect();
        Self {
            size: repr.size,
            nodes,
            connectors: repr.connectors,
        }
    }
}
