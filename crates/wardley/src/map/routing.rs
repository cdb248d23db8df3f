//! Connector routing
//!
//! Turns the connectors of a laid-out map into drawable paths. Normal and
//! bold connectors are straight lines; change connectors bend through the
//! midpoint, which also carries the inertia marker when there is one.

use serde::Serialize;
use tracing::{debug, span, Level};

use crate::core::{Connector, ConnectorType, Map, Node};

/// Offset of a connector label from the path midpoint
pub const LABEL_OFFSET: (i64, i64) = (8, 10);

/// A connector with its path resolved to layout coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedConnector {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    pub color: String,
    pub opacity: f32,
    pub dashed: bool,
    pub arrow: bool,
    pub waypoints: Vec<(i64, i64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inertia_marker: Option<(i64, i64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub label_anchor: (i64, i64),
}

/// Midpoint between two nodes, rounded toward the smaller coordinate
fn midpoint(a: &Node, b: &Node) -> (i64, i64) {
    let half = |p: i64, q: i64| p.min(q) + (p - q).abs() / 2;
    (half(a.x, b.x), half(a.y, b.y))
}

fn route(connector: &Connector, from: &Node, to: &Node) -> PositionedConnector {
    let kind = connector.connector_type;
    let mid = midpoint(from, to);

    let waypoints = if kind.routes_through_midpoint() {
        vec![(from.x, from.y), mid, (to.x, to.y)]
    } else {
        vec![(from.x, from.y), (to.x, to.y)]
    };

    PositionedConnector {
        from: connector.from.clone(),
        to: connector.to.clone(),
        connector_type: kind,
        color: connector.color.clone(),
        opacity: kind.opacity(),
        dashed: kind.is_dashed(),
        arrow: kind.has_arrow(),
        waypoints,
        inertia_marker: kind.has_inertia().then_some(mid),
        label: connector.label.clone(),
        label_anchor: (mid.0 + LABEL_OFFSET.0, mid.1 + LABEL_OFFSET.1),
    }
}

/// Route every connector of a laid-out map
///
/// Connectors whose endpoints are missing are skipped; an assembled map
/// never contains any.
pub fn route_connectors(map: &Map) -> Vec<PositionedConnector> {
    let routing_span = span!(
        Level::DEBUG,
        "route_connectors",
        connector_count = map.connector_count()
    );
    let _enter = routing_span.enter();

    let routed: Vec<_> = map
        .connectors
        .iter()
        .filter_map(|c| Some(route(c, map.node(&c.from)?, map.node(&c.to)?)))
        .collect();

    debug!(routed_count = routed.len(), "Connector routing completed");
    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EvolutionStage, Size};

    fn placed(id: &str, x: i64, y: i64) -> Node {
        let mut node = Node::new(id, EvolutionStage::Custom);
        node.x = x;
        node.y = y;
        node
    }

    fn map_with(connector: Connector) -> Map {
        let mut map = Map::new(Size::default());
        map.nodes.insert("a".to_string(), placed("a", 0, -100));
        map.nodes.insert("b".to_string(), placed("b", 200, -20));
        map.connectors.push(connector);
        map
    }

    #[test]
    fn test_normal_is_straight() {
        let routes = route_connectors(&map_with(Connector::new("a", "b")));
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.waypoints, vec![(0, -100), (200, -20)]);
        assert_eq!(route.label_anchor, (108, -50));
        assert!(!route.dashed);
        assert_eq!(route.inertia_marker, None);
    }

    #[test]
    fn test_change_bends_through_midpoint() {
        let connector = Connector::new("b", "a").with_type(ConnectorType::Change);
        let route = &route_connectors(&map_with(connector))[0];
        assert_eq!(route.waypoints, vec![(200, -20), (100, -60), (0, -100)]);
        assert!(route.dashed);
        assert!(route.arrow);
        assert_eq!(route.inertia_marker, None);
    }

    #[test]
    fn test_inertia_marker_at_midpoint() {
        let connector = Connector::new("a", "b").with_type(ConnectorType::ChangeInertia);
        let route = &route_connectors(&map_with(connector))[0];
        assert_eq!(route.inertia_marker, Some((100, -60)));
        assert_eq!(route.opacity, 0.6);
    }

    #[test]
    fn test_missing_endpoint_skipped() {
        let routes = route_connectors(&map_with(Connector::new("a", "ghost")));
        assert!(routes.is_empty());
    }
}
