//! Example: Load a Maya ASCII file and run the default fix-up pipeline.
//!
//! Run with: cargo run --example load_ma -- scenes/rig.ma

use std::env;

use maya_core::pipeline::{Pipeline, PipelineRun};
use maya_core::summary::AttributeSummary;
use maya_core::{load_ma, NodeSet, SummaryOptions};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: load_ma <path-to-ma-file>");
        println!("\nExamples:");
        println!("  cargo run --example load_ma -- scenes/rig.ma");
        return;
    }

    let path = &args[1];
    println!("Loading Maya ASCII file: {}", path);

    let mut scene = match load_ma(path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error loading Maya file: {}", e);
            return;
        }
    };

    println!("\n=== Scene: {} ===", scene.name);
    println!("Nodes: {}", scene.node_count());
    println!("Connections: {}", scene.connection_count());
    println!("Attributes: {}", scene.total_attribute_count());
    println!(
        "Units: {} / {} / {}",
        scene.units.linear, scene.units.angle, scene.units.time
    );

    let mut run = PipelineRun::new();
    match Pipeline::default().run(&mut scene, &mut run) {
        Ok(report) => {
            println!("\n--- Pipeline ---");
            for (pass, warnings) in &report.warnings {
                println!("  {} ({} warnings)", pass, warnings.len());
                for warning in warnings {
                    println!("       {}", warning);
                }
            }
        }
        Err(e) => {
            eprintln!("Pipeline failed: {}", e);
            return;
        }
    }

    println!("\n--- Nodes ---");
    let nodes = NodeSet::from_scene(&scene);
    let options = SummaryOptions::default();
    for node in nodes.iter().take(20) {
        println!(
            "  {} [{}] - {} attributes",
            node.name(),
            node.node_type(),
            node.attribute_count()
        );
        if let Some(record) = scene.node(node.name()) {
            let summary = AttributeSummary::from_record(record, &options);
            for category in summary.categories.iter().take(3) {
                println!("       {}: {} entries", category.name, category.entries.len());
            }
        }
    }
    if nodes.len() > 20 {
        println!("  ... {} more", nodes.len() - 20);
    }
}
