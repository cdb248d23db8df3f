//! Decode, lay out and route a small tea shop map
//!
//! Run with `cargo run --example tea_shop`.

use wardley::prelude::*;
use wardley::{init_logging, to_json};

fn main() -> anyhow::Result<()> {
    init_logging(Some("debug"), Some("compact")).ok();

    let blocks = vec![
        Block::size().with_attr("width", 1000).with_attr("height", 600),
        Block::node("customer")
            .with_attr("label", "Customer")
            .with_attr("evolution", "commodity")
            .with_attr("x", 0)
            .with_attr("visibility", 3),
        Block::node("cup")
            .with_attr("label", "Cup of tea")
            .with_attr("evolution", "commodity")
            .with_attr("x", 1)
            .with_attr("visibility", Expression::parse("node.customer.visibility - 1")?),
        Block::node("kettle")
            .with_attr("label", "Kettle")
            .with_attr("evolution", "custom")
            .with_attr("x", 0)
            .with_attr("visibility", Expression::parse("node.cup.visibility - 1")?),
        Block::node("power")
            .with_attr("label", "Power")
            .with_attr("evolution", "commodity")
            .with_attr("x", 2)
            .with_attr("visibility", 0)
            .with_attr("fill", "grey"),
        Block::connector().with_attr("from", "customer").with_attr("to", "cup"),
        Block::connector().with_attr("from", "cup").with_attr("to", "kettle"),
        Block::connector()
            .with_attr("from", "kettle")
            .with_attr("to", "power")
            .with_attr("type", "change-inertia")
            .with_attr("label", "electric kettle"),
        Block::connector().with_attr("from", "kettle").with_attr("to", "water"),
    ];

    let decoded = decode(&blocks, &DecodeOptions::default())?;
    for diagnostic in &decoded.diagnostics {
        eprintln!("{}", diagnostic);
    }

    let map = layout(decoded.map, &LayoutParams::with_jitter(7));
    println!("{}", to_json(&map)?);

    let grid = Grid::from_size(&map.size);
    for route in route_connectors(&map) {
        let absolute: Vec<_> = route
            .waypoints
            .iter()
            .map(|&(x, y)| grid.to_absolute(x, y))
            .collect();
        println!("{} -> {} ({}): {:?}", route.from, route.to, route.connector_type, absolute);
    }
    Ok(())
}
