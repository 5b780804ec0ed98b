// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll dump.
//!
//! Read a JSON configuration (missing fields take their defaults), grow a scroll inside a
//! pentagon, and print the diagnostic dump.
//!
//! Run:
//! - `cargo run -p curlicue_demos --example scroll_dump`
//! - `cargo run -p curlicue_demos --example scroll_dump -- '{"max_nodes": 30, "twin": false}'`

use curlicue_tree::{DumpFlags, ScrollConfig, ScrollTree};
use kurbo::Point;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let config: ScrollConfig = match std::env::args().nth(1) {
        Some(json) => match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("invalid configuration JSON: {err}");
                std::process::exit(1);
            }
        },
        None => ScrollConfig {
            max_nodes: 25,
            ..ScrollConfig::default()
        },
    };

    let pentagon = (0..5).map(|i| {
        let a = f64::from(i) * core::f64::consts::TAU / 5.0 - core::f64::consts::FRAC_PI_2;
        Point::new(400.0 + 380.0 * a.cos(), 400.0 + 380.0 * a.sin())
    });

    let mut tree = match ScrollTree::from_vertices(config, pentagon) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("cannot build the scroll: {err}");
            std::process::exit(1);
        }
    };
    let report = tree.grow();
    println!("{report:?}");
    println!("{}", tree.dump(DumpFlags::all()));
}
