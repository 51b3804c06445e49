// Inspect a Maya ASCII scene: load it, run the fix-up pipeline and print
// the warnings, node attributes or JSON summaries.
// Run with: cargo run --release -- <path_to.ma> [--node NAME] [--json]

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{App, Arg, ArgMatches};
use indexmap::IndexMap;
use maya_core::pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineRun};
use maya_core::plug::node_key;
use maya_core::{load_ma, AttributeSummary, MayaNode, SceneData};

const USAGE: &str = "maya_inspect <file.ma> [--config pipeline.json] [--json] [--node NAME] [--summary] [--strict]";

/// Exit code when the arguments are invalid or the scene could not be loaded.
const EXIT_FAILURE: i32 = 1;

/// Exit code when `--strict` is set and the pipeline reported warnings.
const EXIT_WARNINGS: i32 = 2;

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    path: PathBuf,
    config: Option<PathBuf>,
    json: bool,
    node: Option<String>,
    summary: bool,
    strict: bool,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            path: matches.value_of("file").map(PathBuf::from).unwrap_or_default(),
            config: matches.value_of("config").map(PathBuf::from),
            json: matches.is_present("json"),
            node: matches.value_of("node").map(str::to_string),
            summary: matches.is_present("summary"),
            strict: matches.is_present("strict"),
        }
    }
}

fn cli() -> App<'static, 'static> {
    App::new("maya_inspect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Loads a Maya ASCII scene, runs the fix-up pipeline and reports what it found.")
        .usage(USAGE)
        .arg(
            Arg::with_name("file")
                .required(true)
                .takes_value(true)
                .help("The .ma scene to inspect."),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .value_name("pipeline.json")
                .help("Pass list and summary options as JSON."),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .takes_value(false)
                .help("Prints counts, warnings and attribute summaries as JSON."),
        )
        .arg(
            Arg::with_name("node")
                .long("node")
                .takes_value(true)
                .value_name("NAME")
                .help("Prints the attributes and summary of one node."),
        )
        .arg(Arg::with_name("summary").long("summary").takes_value(false).help(
            "Outputs a one-line summary for the scene, rather than all warnings.",
        ))
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .takes_value(false)
                .help("Exits with code 2 when the pipeline reported warnings."),
        )
}

fn main() {
    // Custom logging formatting: "[WARN] Warning text."
    env_logger::Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(log::LevelFilter::Warn)
        .init();

    // Usage errors exit with EXIT_FAILURE, --help and --version with 0
    let matches = cli().get_matches_safe().unwrap_or_else(|e| e.exit());
    let options = Options::from_matches(&matches);

    match run(&options) {
        Ok(warnings) if warnings > 0 && options.strict => process::exit(EXIT_WARNINGS),
        Ok(_) => {}
        Err(e) => {
            log::error!("{:#}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

/// Inspect one scene. Returns the number of pipeline warnings.
fn run(options: &Options) -> Result<usize> {
    let config = match &options.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Could not read config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let pipeline = Pipeline::from_config(&config)?;

    let mut scene = load_ma(&options.path)
        .with_context(|| format!("Could not load {}", options.path.display()))?;
    let mut run = PipelineRun::new();
    let report = pipeline.run(&mut scene, &mut run)?;

    if options.summary {
        print_summary_line(options, &report);
    } else if options.json {
        print_json(&scene, &report, &run)?;
    } else {
        print_warnings(options, &report);
    }

    if let Some(name) = &options.node {
        print_node(&scene, &run, name, &config)?;
    }

    Ok(report.total_warnings())
}

fn print_summary_line(options: &Options, report: &PipelineReport) {
    let passes: Vec<&str> = report.passes_with_warnings().collect();
    println!(
        "{},{},{}",
        options.path.display(),
        report.total_warnings(),
        passes.join(",")
    );
}

fn print_warnings(options: &Options, report: &PipelineReport) {
    let total = report.total_warnings();
    if total == 0 {
        println!("{}: no warnings", options.path.display());
        return;
    }

    println!("The file {} has {} warnings:", options.path.display(), total);
    for (pass, warnings) in &report.warnings {
        for warning in warnings {
            println!("{} - {}", pass, warning);
        }
    }
}

fn print_json(scene: &SceneData, report: &PipelineReport, run: &PipelineRun) -> Result<()> {
    let summaries: IndexMap<&str, &AttributeSummary> = scene
        .nodes()
        .filter_map(|node| {
            let key = node_key(&node.name);
            run.extensions()
                .get::<AttributeSummary>(key)
                .map(|summary| (key, summary))
        })
        .collect();

    let output = serde_json::json!({
        "scene": scene.name,
        "nodes": scene.node_count(),
        "connections": scene.connection_count(),
        "warnings": report.warnings,
        "summaries": summaries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_node(scene: &SceneData, run: &PipelineRun, name: &str, config: &PipelineConfig) -> Result<()> {
    let Some(record) = scene.node(name) else {
        bail!("Node {} is not in {}", name, scene.name);
    };

    let node = MayaNode::from_record(record);
    let ambiguous = scene.is_ambiguous(name);
    if ambiguous {
        log::warn!(
            "Several nodes are named {}; showing the one under {}",
            node_key(name),
            record.parent.as_deref().unwrap_or("the world")
        );
    }

    println!("\n=== {} [{}] ===", node.name(), node.node_type());
    if let Some(parent) = &record.parent {
        println!("Parent: {}", parent);
    }
    println!("Attributes: {}", node.attribute_count());
    for (key, value) in node.attributes() {
        match value {
            Some(value) => println!("  {} = {}", key, value),
            None => println!("  {} = (undecoded)", key),
        }
    }

    // Summaries only exist when the attribute_summaries pass ran, and are
    // keyed by leaf name
    let stored = if ambiguous {
        None
    } else {
        run.extensions().get::<AttributeSummary>(node_key(&record.name))
    };
    let computed;
    let summary = match stored {
        Some(summary) => summary,
        None => {
            computed = AttributeSummary::from_record(record, &config.summary);
            &computed
        }
    };

    println!(
        "\n--- Summary ({} attributes, {} typed, {} omitted) ---",
        summary.total_attributes,
        summary.counts.total(),
        summary.omitted
    );
    for category in &summary.categories {
        println!("  {}", category.name);
        for entry in &category.entries {
            println!("       {} ({}) {}", entry.key, entry.type_tag, entry.preview);
        }
    }

    Ok(())
}
