// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll basics.
//!
//! Grow a scroll inside a rectangle and print every node with its spiral polyline.
//!
//! Run:
//! - `cargo run -p curlicue_demos --example scroll_basics`
//! - `RUST_LOG=curlicue_tree=debug cargo run -p curlicue_demos --example scroll_basics`

use curlicue_geom::Boundary;
use curlicue_tree::{NodeId, ScrollConfig, ScrollTree, SizeMode};
use kurbo::Rect;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let region = Boundary::from_rect(Rect::new(0.0, 0.0, 900.0, 600.0))
        .expect("a rectangle is a valid boundary");
    let config = ScrollConfig {
        max_nodes: 120,
        size_mode: SizeMode::LargeToSmall,
        twin: true,
        twin_ratio: 0.8,
        seed: 2025,
        ..ScrollConfig::default()
    };

    let mut tree = ScrollTree::new(config, region).expect("the configuration is valid");
    let report = tree.grow();
    println!(
        "grew {} nodes in {} passes ({} sprouted, budget exhausted: {})",
        tree.len(),
        report.passes,
        report.sprouted,
        report.budget_exhausted
    );

    // Roots come first and are not listed as anyone's leaf.
    let roots: Vec<NodeId> = tree.roots().collect();
    println!("roots: {roots:?}");

    for (idx, (node, spiral)) in tree.nodes().iter().zip(tree.spiral_paths()).enumerate() {
        let parent = node
            .parent()
            .map_or_else(|| "root".to_owned(), |p| format!("leaf of {p}"));
        println!(
            "node #{idx} ({parent}): center ({:.1}, {:.1}), radius {:.1}, {} leaves",
            node.center().x,
            node.center().y,
            node.radius(),
            node.leaf_count()
        );
        let points: Vec<String> = spiral.map(|p| format!("{:.1},{:.1}", p.x, p.y)).collect();
        println!("  {}", points.join(" "));
    }
}
