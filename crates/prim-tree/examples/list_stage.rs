//! CLI example that loads a stage and displays its full prim hierarchy
//!
//! Usage:
//!   cargo run --example list_stage <stage.json>

use prim_tree::prelude::*;
use stage::InMemoryStage;
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("Usage: list_stage <stage.json>");
        std::process::exit(2);
    };

    println!("Loading stage: {}", path);
    println!();

    let stage = match InMemoryStage::open(path) {
        Ok(stage) => stage,
        Err(e) => {
            eprintln!("Error loading stage: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut model = TreeModel::new();
    let root = match model.bind_stage(&stage) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error binding stage: {}", e);
            std::process::exit(1);
        }
    };

    // Materialise everything, parents before children
    let mut pending = vec![root];
    while let Some(index) = pending.pop() {
        match model.expand(&stage, index) {
            Ok(children) => pending.extend(children),
            Err(e) => {
                eprintln!("Error expanding tree: {}", e);
                std::process::exit(1);
            }
        }
    }

    let tree = model.cached();
    println!("Prim Hierarchy:");
    println!("═══════════════════════════════");
    println!();

    for id in tree.walk(TraversalOrder::PreOrder) {
        let Some(node) = tree.get(id) else { continue };
        let indent = "  ".repeat(tree.depth(id));
        let marker = if node.active { "" } else { " [inactive]" };
        println!(
            "{}{} ({}) - {}{}",
            indent, node.name, node.type_name, node.tag, marker
        );
    }

    let with_payload = tree.find(|n| n.has_payload).len();
    let leaves = tree.find(|n| n.is_leaf()).len();

    println!();
    println!("═══════════════════════════════");
    println!("Summary:");
    println!("  Total prims: {}", tree.node_count());
    println!("  Leaves: {}", leaves);
    println!("  With payload: {}", with_payload);
}
