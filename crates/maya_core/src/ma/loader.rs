//! High-level `.ma` scene loading.
//!
//! Replays the parsed statements into a [`SceneData`]: `createNode` and
//! `select -ne` set the current node, `setAttr` writes decoded attributes on
//! it, and `connectAttr` appends connection records.

use std::path::Path;

use thiserror::Error;

use super::parser::{parse_ma, MaStatement, ParseError};
use crate::plug::{node_key, split_plug};
use crate::scene::{ConnectionRecord, NodeRecord, SceneData};
use crate::value::RawAttributeValue;

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Unsupported scene format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a Maya ASCII file.
///
/// Binary `.mb` files are rejected with [`LoadError::UnsupportedFormat`].
///
/// # Example
///
/// ```ignore
/// use maya_core::ma::load_ma;
///
/// let scene = load_ma("rig.ma")?;
/// println!("Loaded {} nodes", scene.node_count());
/// ```
pub fn load_ma<P: AsRef<Path>>(path: P) -> LoadResult<SceneData> {
    let path = path.as_ref();
    let is_binary = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mb"));
    if is_binary {
        return Err(LoadError::UnsupportedFormat(path.display().to_string()));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");

    let content = std::fs::read_to_string(path)?;
    load_ma_from_string(&content, name)
}

/// Load a Maya ASCII scene from a string.
pub fn load_ma_from_string(content: &str, name: &str) -> LoadResult<SceneData> {
    let statements = parse_ma(content)?;
    let mut scene = SceneData::new(name);
    let mut current: Option<String> = None;
    let mut skipped_attrs = 0usize;

    for statement in statements {
        match statement {
            MaStatement::Requires { plugin, version } => {
                scene.requires.push((plugin, version));
            }
            MaStatement::CurrentUnit {
                linear,
                angle,
                time,
            } => {
                if let Some(linear) = linear {
                    scene.units.linear = linear;
                }
                if let Some(angle) = angle {
                    scene.units.angle = angle;
                }
                if let Some(time) = time {
                    scene.units.time = time;
                }
            }
            MaStatement::FileInfo { key, value } => {
                scene.file_info.insert(key, value);
            }
            MaStatement::CreateNode {
                node_type,
                name,
                parent,
                shared,
            } => {
                let mut record = NodeRecord::new(name, node_type);
                record.parent = parent;
                record.shared = shared;
                current = scene.add_node(record);
                if current.is_none() {
                    log::warn!("Skipping unnamed node in {}", scene.name);
                }
            }
            MaStatement::Select { name } => {
                if scene.contains_node(&name) {
                    current = Some(name);
                } else {
                    let mut placeholder = NodeRecord::new(node_key(&name), "");
                    placeholder.shared = true;
                    current = scene.add_node(placeholder);
                }
            }
            MaStatement::SetAttr {
                attr,
                type_hint,
                values,
            } => {
                let (target, key) = match resolve_target(current.as_deref(), &attr) {
                    Some(resolved) => resolved,
                    None => {
                        log::warn!("setAttr {} has no current node, skipped", attr);
                        skipped_attrs += 1;
                        continue;
                    }
                };
                let Some(node) = scene.node_mut(target) else {
                    log::warn!("setAttr {} targets unknown node {}, skipped", attr, target);
                    skipped_attrs += 1;
                    continue;
                };

                let value = if type_hint.is_none() && is_range(&key) {
                    RawAttributeValue::decode_array(values)
                } else {
                    RawAttributeValue::decode(type_hint.as_deref(), values)
                };
                node.set_attribute(key, value);
            }
            MaStatement::ConnectAttr { src, dst } => {
                scene.add_connection(ConnectionRecord::new(src, dst));
            }
            MaStatement::Other(_) => {}
        }
    }

    log::info!(
        "Loaded {}: {} nodes, {} attributes, {} connections",
        scene.name,
        scene.node_count(),
        scene.total_attribute_count(),
        scene.connection_count()
    );
    if skipped_attrs > 0 {
        log::warn!("{} setAttr statements skipped in {}", skipped_attrs, scene.name);
    }

    Ok(scene)
}

/// Node and attribute key a `setAttr` writes to.
///
/// `.attr` targets the current node; `node.attr` names its node explicitly.
fn resolve_target<'a>(current: Option<&'a str>, attr: &'a str) -> Option<(&'a str, String)> {
    if attr.starts_with('.') {
        return current.map(|node| (node, attr.to_string()));
    }
    let (node, rest) = split_plug(attr)?;
    if rest.is_empty() {
        return None;
    }
    Some((node, format!(".{}", rest)))
}

/// Whether the key addresses a multi-element range such as `.pt[0:3]`.
fn is_range(key: &str) -> bool {
    key.rfind('[')
        .is_some_and(|open| key[open..].contains(':'))
}
