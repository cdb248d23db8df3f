//! Default templates and zero-value merging
//!
//! A default fills a field only while that field holds its type's zero value
//! (0 or the empty string). An attribute explicitly set to `""` or `0` is
//! therefore indistinguishable from an omitted one and also receives the
//! default.

use crate::core::{Connector, MapError, Node, Size, SizeVariant};

pub const DEFAULT_FILL: &str = "white";
pub const DEFAULT_COLOR: &str = "black";

/// Defaults for node blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDefaults {
    pub fill: String,
    pub color: String,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Defaults for connector blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorDefaults {
    pub color: String,
}

impl Default for ConnectorDefaults {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// One default record per block kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTemplates {
    pub size: Size,
    pub node: NodeDefaults,
    pub connector: ConnectorDefaults,
}

impl DefaultTemplates {
    pub fn for_variant(variant: SizeVariant) -> Self {
        Self {
            size: Size::standard(variant),
            node: NodeDefaults::default(),
            connector: ConnectorDefaults::default(),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Reject templates that could leave a field at its zero value
    ///
    /// Margin is the one field a template may legitimately set to zero.
    pub fn validate(&self) -> Result<(), MapError> {
        let mut problems = Vec::new();
        if self.size.width == 0 {
            problems.push("size width is 0");
        }
        if self.size.height == 0 {
            problems.push("size height is 0");
        }
        if self.size.font_size == 0 {
            problems.push("size font size is 0");
        }
        if self.node.fill.is_empty() {
            problems.push("node fill is empty");
        }
        if self.node.color.is_empty() {
            problems.push("node color is empty");
        }
        if self.connector.color.is_empty() {
            problems.push("connector color is empty");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MapError::default_merge(format!(
                "malformed default template: {}",
                problems.join(", ")
            )))
        }
    }
}

impl Default for DefaultTemplates {
    fn default() -> Self {
        Self::for_variant(SizeVariant::Standard)
    }
}

/// Fill zero-valued fields from a template
pub trait MergeDefaults {
    type Template;

    fn merge_defaults(&mut self, template: &Self::Template);
}

fn fill_zero(field: &mut u32, default: u32) {
    if *field == 0 {
        *field = default;
    }
}

fn fill_empty(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

impl MergeDefaults for Size {
    type Template = Size;

    fn merge_defaults(&mut self, template: &Size) {
        fill_zero(&mut self.width, template.width);
        fill_zero(&mut self.height, template.height);
        fill_zero(&mut self.margin, template.margin);
        fill_zero(&mut self.font_size, template.font_size);
    }
}

impl MergeDefaults for Node {
    type Template = NodeDefaults;

    fn merge_defaults(&mut self, template: &NodeDefaults) {
        fill_empty(&mut self.fill, &template.fill);
        fill_empty(&mut self.color, &template.color);
    }
}

impl MergeDefaults for Connector {
    type Template = ConnectorDefaults;

    fn merge_defaults(&mut self, template: &ConnectorDefaults) {
        fill_empty(&mut self.color, &template.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EvolutionStage;

    #[test]
    fn test_node_defaults_fill_empty_fields() {
        let mut node = Node::new("a", EvolutionStage::Custom);
        node.merge_defaults(&NodeDefaults::default());
        assert_eq!(node.fill, "white");
        assert_eq!(node.color, "black");
    }

    #[test]
    fn test_node_defaults_keep_set_fields() {
        let mut node = Node::new("a", EvolutionStage::Custom);
        node.fill = "red".to_string();
        node.merge_defaults(&NodeDefaults::default());
        assert_eq!(node.fill, "red");
        assert_eq!(node.color, "black");
    }

    #[test]
    fn test_size_defaults_fill_zero_fields() {
        let mut size = Size::new(800, 0, 0, 0);
        size.merge_defaults(&Size::standard(SizeVariant::Compact));
        assert_eq!(size, Size::new(800, 768, 40, 9));
    }

    #[test]
    fn test_connector_defaults() {
        let mut connector = Connector::new("a", "b");
        connector.merge_defaults(&ConnectorDefaults::default());
        assert_eq!(connector.color, "black");
    }

    #[test]
    fn test_default_templates_validate() {
        assert!(DefaultTemplates::default().validate().is_ok());
        let zero_margin = DefaultTemplates::default().with_size(Size::new(1280, 768, 0, 12));
        assert!(zero_margin.validate().is_ok());
    }

    #[test]
    fn test_malformed_template_is_default_merge_error() {
        let mut templates = DefaultTemplates::default().with_size(Size::new(0, 768, 40, 12));
        templates.node.fill.clear();
        let err = templates.validate().unwrap_err();
        assert!(matches!(err, MapError::DefaultMerge { .. }));
        let msg = err.to_string();
        assert!(msg.contains("width"));
        assert!(msg.contains("fill"));
    }
}
