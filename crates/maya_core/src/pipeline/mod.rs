//! Post-load fix-up pipeline.
//!
//! A pipeline is an ordered list of named passes. Each pass sees the whole
//! scene and its connection graph, may patch the scene, and returns
//! warnings. The order is static configuration; which passes already ran is
//! tracked explicitly in a [`PipelineRun`].
//!
//! # Example
//!
//! ```ignore
//! use maya_core::pipeline::{Pipeline, PipelineRun};
//!
//! let mut scene = maya_core::load_ma("rig.ma")?;
//! let mut run = PipelineRun::new();
//! let report = Pipeline::default().run(&mut scene, &mut run)?;
//! println!("{} warnings", report.total_warnings());
//! ```

mod config;
mod passes;

pub use config::*;
pub use passes::*;

use indexmap::IndexMap;
use thiserror::Error;

use crate::plug::ConnectionGraph;
use crate::registry::ExtensionRegistry;
use crate::scene::SceneData;
use crate::summary::SummaryOptions;

/// Errors that can occur while building or running a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown pass: {0}")]
    UnknownPass(String),

    #[error("Pass '{pass}' failed: {message}")]
    PassFailed { pass: String, message: String },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything a pass may read or patch.
pub struct PassContext<'a> {
    /// The scene being fixed up
    pub scene: &'a mut SceneData,

    /// Graph over `scene`'s connections; call [`PassContext::rebuild_graph`]
    /// after editing them
    pub graph: ConnectionGraph,

    /// Per-node extension data shared by all passes of the run
    pub extensions: &'a mut ExtensionRegistry,

    pub summary_options: SummaryOptions,
}

impl PassContext<'_> {
    /// Rebuild the graph from the scene's current connections.
    pub fn rebuild_graph(&mut self) {
        self.graph = ConnectionGraph::build(self.scene.connections());
    }
}

/// One step of the pipeline.
pub trait ScenePass: Send + Sync {
    /// Stable name used in configuration and reports.
    fn name(&self) -> &'static str;

    /// Run the pass and return its warnings.
    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>>;
}

/// Run-state of one pipeline execution over one scene.
#[derive(Debug, Default)]
pub struct PipelineRun {
    applied: Vec<&'static str>,
    extensions: ExtensionRegistry,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named pass already ran in this run.
    pub fn is_applied(&self, pass: &str) -> bool {
        self.applied.iter().any(|p| *p == pass)
    }

    /// Passes applied so far, in execution order.
    pub fn applied(&self) -> &[&'static str] {
        &self.applied
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}

/// Warnings from one pipeline execution, grouped by pass.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Pass name -> warnings, in execution order
    pub warnings: IndexMap<&'static str, Vec<String>>,

    /// Passes skipped because the run had already applied them
    pub skipped: Vec<&'static str>,

    /// Connection records ignored because a plug had no node part
    pub unresolved_connections: usize,
}

impl PipelineReport {
    pub fn total_warnings(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    /// Names of passes that produced at least one warning.
    pub fn passes_with_warnings(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.warnings
            .iter()
            .filter(|(_, warnings)| !warnings.is_empty())
            .map(|(pass, _)| *pass)
    }
}

/// An ordered list of passes.
pub struct Pipeline {
    passes: Vec<Box<dyn ScenePass>>,
    summary_options: SummaryOptions,
}

impl Default for Pipeline {
    /// The built-in passes in their default order.
    fn default() -> Self {
        let mut pipeline = Self::new();
        for name in DEFAULT_PASSES {
            if let Some(pass) = builtin_pass(name) {
                pipeline.passes.push(pass);
            }
        }
        pipeline
    }
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            summary_options: SummaryOptions::default(),
        }
    }

    /// Build a pipeline from configured pass names.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let mut pipeline = Self::new().with_summary_options(config.summary);
        for name in &config.passes {
            let pass =
                builtin_pass(name).ok_or_else(|| PipelineError::UnknownPass(name.clone()))?;
            pipeline.passes.push(pass);
        }
        Ok(pipeline)
    }

    /// Append a pass.
    pub fn with_pass(mut self, pass: Box<dyn ScenePass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn with_summary_options(mut self, options: SummaryOptions) -> Self {
        self.summary_options = options.normalized();
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass not yet applied in `run`, in order.
    pub fn run(&self, scene: &mut SceneData, run: &mut PipelineRun) -> PipelineResult<PipelineReport> {
        let mut report = PipelineReport::default();
        let graph = ConnectionGraph::build(scene.connections());
        report.unresolved_connections = graph.dropped();
        if graph.dropped() > 0 {
            log::warn!(
                "{} connections in {} have no node part and were ignored",
                graph.dropped(),
                scene.name
            );
        }

        let mut ctx = PassContext {
            scene,
            graph,
            extensions: &mut run.extensions,
            summary_options: self.summary_options,
        };

        for pass in &self.passes {
            let name = pass.name();
            if run.applied.contains(&name) {
                log::debug!("Skipping pass {} (already applied)", name);
                report.skipped.push(name);
                continue;
            }

            log::debug!("Running pass {}", name);
            let warnings = pass.run(&mut ctx)?;
            if !warnings.is_empty() {
                log::debug!("Pass {} produced {} warnings", name, warnings.len());
            }
            report.warnings.entry(name).or_default().extend(warnings);
            run.applied.push(name);
        }

        Ok(report)
    }
}
