//! Maya ASCII (`.ma`) support.
//!
//! This module reads the command stream of a `.ma` file into a
//! [`SceneData`](crate::scene::SceneData).
//!
//! ## Supported Commands
//!
//! - `requires`, `currentUnit`, `fileInfo`
//! - `createNode` with `-n`, `-p`, `-s`
//! - `setAttr` with `-type` hints and ranged keys (`.pt[0:3]`)
//! - `connectAttr`
//! - `select -ne`
//!
//! Everything else (`rename`, `lockNode`, `relationship`, scripts) is kept as
//! [`MaStatement::Other`] and ignored by the loader.
//!
//! ## Not Supported
//!
//! - Binary `.mb` files
//! - MEL procedures and expressions
//!
//! # Example
//!
//! ```ignore
//! use maya_core::ma::load_ma;
//!
//! let scene = load_ma("rig.ma")?;
//! println!("Loaded {} nodes, {} connections",
//!     scene.node_count(),
//!     scene.connection_count());
//! ```

mod loader;
mod parser;

pub use loader::*;
pub use parser::*;
