//! Core layout trait for map positioning
//!
//! A layout algorithm takes an assembled map and returns it with node
//! coordinates filled in. Implementations hold their parameters by value and
//! keep no state between calls, so one instance can lay out many maps.

use super::Map;

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use wardley::core::{LayoutAlgorithm, Map, Size, SizeVariant};
/// use wardley::map::GridLayout;
///
/// let layout = GridLayout::new();
/// let map = layout.layout(Map::new(Size::standard(SizeVariant::Standard)));
/// assert_eq!(map.node_count(), 0);
/// ```
pub trait LayoutAlgorithm: Send + Sync {
    /// Compute coordinates for every node of `map`
    fn layout(&self, map: Map) -> Map;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
