//! Maya Core - Scene records, attribute decoding and fix-up passes for Maya scenes.
//!
//! This crate provides:
//!
//! - **Scene data**: `SceneData`, `NodeRecord`, `ConnectionRecord`
//! - **Attribute decoding**: `RawAttributeValue`, `ParsedValue`, numeric fallback
//! - **Connection graph**: plug splitting and per-node edge lookup
//! - **Node adapters**: `MayaNode` views with normalized attribute keys
//! - **Summaries**: categorized attribute listings with short previews
//! - **Pipeline**: ordered fix-up passes with explicit run-state
//! - **Maya ASCII**: `.ma` parsing and scene loading
//!
//! # Example
//!
//! ```ignore
//! use maya_core::load_ma;
//! use maya_core::pipeline::{Pipeline, PipelineRun};
//!
//! let mut scene = load_ma("rig.ma")?;
//! let mut run = PipelineRun::new();
//! let report = Pipeline::default().run(&mut scene, &mut run)?;
//! println!("Loaded {} nodes, {} warnings",
//!     scene.node_count(),
//!     report.total_warnings());
//! ```

pub mod ma;
pub mod node;
pub mod pipeline;
pub mod plug;
pub mod registry;
pub mod scene;
pub mod summary;
pub mod value;

// Re-export commonly used types
pub use ma::{load_ma, load_ma_from_string, LoadError};
pub use node::{MayaNode, NodeSet};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineRun};
pub use plug::{Connection, ConnectionGraph};
pub use registry::ExtensionRegistry;
pub use scene::{ConnectionRecord, NodeRecord, SceneData};
pub use summary::{AttributeSummary, SummaryOptions};
pub use value::{AttributeKind, ParsedValue, RawAttributeValue};
