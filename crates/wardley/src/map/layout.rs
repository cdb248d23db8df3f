//! Grid layout
//!
//! Places nodes on a four-band evolution grid. Horizontal position comes from
//! the node's stage and its offset within the stage, vertical position from
//! its visibility. Both axes are normalized by the largest value present in
//! the map, so spacing is relative to the densest band rather than a fixed
//! unit.
//!
//! Coordinates are relative to the canvas origin at the bottom-left corner of
//! the drawable area (see [`Grid::origin`]); `y` grows negative going up.
//!
//! The drawable height is split into `max_visibility + 1` rows. The most
//! visible node sits on the axis at `y = 0` and each step of visibility below
//! it moves one row up, so visibility 0 lands at
//! `-(drawable_height / (max_visibility + 1)) * max_visibility` and the top
//! row is never used. With `max_visibility = 3` on a 608 pixel drawable height,
//! visibility 0 is at `y = -456`. Nodes that all share one visibility,
//! including all zero, sit on the axis.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, span, trace, Level};

use crate::core::{EvolutionStage, LayoutAlgorithm, Map, Size};

pub const EVOLUTION_AXIS_LABEL: &str = "Evolution";
pub const VALUE_CHAIN_AXIS_LABEL: &str = "Value Chain";
pub const INVISIBLE_LABEL: &str = "Invisible";
pub const VISIBLE_LABEL: &str = "Visible";

/// Geometry of the drawable area for one canvas size
///
/// The drawable area leaves two margins on every side: one outer margin and
/// one for the axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: i64,
    pub height: i64,
    pub margin: i64,
    pub drawable_width: i64,
    pub drawable_height: i64,
}

impl Grid {
    pub fn from_size(size: &Size) -> Self {
        let width = i64::from(size.width);
        let height = i64::from(size.height);
        let margin = i64::from(size.margin);
        Self {
            width,
            height,
            margin,
            drawable_width: (width - 4 * margin).max(0),
            drawable_height: (height - 4 * margin).max(0),
        }
    }

    /// Width of one evolution band
    pub fn band_width(&self) -> i64 {
        self.drawable_width / 4
    }

    /// Left edge of a stage's band, relative to the canvas origin
    pub fn band_origin(&self, stage: EvolutionStage) -> i64 {
        self.drawable_width * stage.index() as i64 / 4
    }

    /// Canvas origin in absolute pixels: bottom-left of the drawable area
    pub fn origin(&self) -> (i64, i64) {
        (2 * self.margin, self.height - 2 * self.margin)
    }

    /// Translate a layout coordinate to absolute canvas pixels
    pub fn to_absolute(&self, x: i64, y: i64) -> (i64, i64) {
        let (ox, oy) = self.origin();
        (ox + x, oy + y)
    }

    /// Axis labels for each band, left to right
    pub fn band_labels(&self) -> [(EvolutionStage, i64, &'static str); 4] {
        EvolutionStage::ALL.map(|stage| (stage, self.band_origin(stage), stage.axis_label()))
    }

    /// Maximum jitter in x and y
    pub fn jitter_bounds(&self) -> (i64, i64) {
        (self.band_width() / 20, self.drawable_height / 100)
    }
}

/// Per-call layout parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutParams {
    /// Seed for coordinate jitter; `None` disables jitter
    pub jitter_seed: Option<u64>,
}

impl LayoutParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jitter(seed: u64) -> Self {
        Self {
            jitter_seed: Some(seed),
        }
    }
}

/// Largest offset and visibility present in a map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Extents {
    max_offset: [i64; 4],
    max_visibility: i64,
}

impl Extents {
    fn of(map: &Map) -> Self {
        let mut extents = Self::default();
        for node in map.nodes.values() {
            let slot = &mut extents.max_offset[node.evolution_stage.index()];
            *slot = (*slot).max(i64::from(node.evolution_offset));
            extents.max_visibility = extents.max_visibility.max(i64::from(node.visibility));
        }
        extents
    }
}

/// Compute coordinates for every node of `map`
pub fn layout(mut map: Map, params: &LayoutParams) -> Map {
    let layout_span = span!(
        Level::INFO,
        "layout_map",
        node_count = map.node_count(),
        jitter = params.jitter_seed.is_some()
    );
    let _enter = layout_span.enter();

    let grid = Grid::from_size(&map.size);
    let extents = Extents::of(&map);
    debug!(
        drawable_width = grid.drawable_width,
        drawable_height = grid.drawable_height,
        max_visibility = extents.max_visibility,
        max_offset = ?extents.max_offset,
        "Computed grid extents"
    );

    let band_width = grid.band_width();
    let row_height = grid.drawable_height / (extents.max_visibility + 1);

    for node in map.nodes.values_mut() {
        let stage = node.evolution_stage;
        let column_width = band_width / (extents.max_offset[stage.index()] + 1);
        node.x = grid.band_origin(stage) + column_width * i64::from(node.evolution_offset);
        node.y = -row_height * (extents.max_visibility - i64::from(node.visibility));
        trace!(id = %node.id, x = node.x, y = node.y, "Placed node");
    }

    if let Some(seed) = params.jitter_seed {
        let (bound_x, bound_y) = grid.jitter_bounds();
        let mut rng = StdRng::seed_from_u64(seed);
        for node in map.nodes.values_mut() {
            node.x += rng.gen_range(-bound_x..=bound_x);
            node.y += rng.gen_range(-bound_y..=bound_y);
        }
        debug!(seed, bound_x, bound_y, "Applied jitter");
    }

    info!(node_count = map.node_count(), "Layout completed");
    map
}

/// [`LayoutAlgorithm`] running the grid layout with fixed parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct GridLayout {
    params: LayoutParams,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: LayoutParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }
}

impl LayoutAlgorithm for GridLayout {
    fn layout(&self, map: Map) -> Map {
        layout(map, &self.params)
    }

    fn name(&self) -> &'static str {
        "grid"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
