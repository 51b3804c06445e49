//! Scene data store.
//!
//! Holds the node and connection records produced by a scene reader. Records
//! are kept in insertion order, so every view derived from a `SceneData` is
//! deterministic. Each record is stored under its DAG key (`parent|leaf`, or
//! `|leaf` under the world); a side index maps leaf names to records so bare
//! names still resolve when Maya reuses a name under different parents.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::plug::{node_key, path_parent};
use crate::value::RawAttributeValue;

/// One parsed Maya node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
    /// Node name as written in the file (may be a DAG path)
    pub name: String,

    /// Maya node type (`transform`, `mesh`, `skinCluster`, ...)
    pub node_type: String,

    /// Parent given with `createNode -p`
    pub parent: Option<String>,

    /// Created with `-s` or only referenced through `select -ne`
    pub shared: bool,

    /// Attribute key (leading `.`) -> value
    pub attributes: IndexMap<String, RawAttributeValue>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: RawAttributeValue) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Set an attribute. A later write replaces the earlier value in place.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: RawAttributeValue,
    ) -> Option<RawAttributeValue> {
        self.attributes.insert(key.into(), value)
    }

    pub fn attribute(&self, key: &str) -> Option<&RawAttributeValue> {
        self.attributes.get(key)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Key of the parent: from `-p`, else from a DAG path name.
    fn parent_key(&self) -> Option<&str> {
        match &self.parent {
            Some(parent) => Some(node_key(parent)).filter(|p| !p.is_empty()),
            None => path_parent(&self.name),
        }
    }

    /// Fold a re-declaration of the same node into this record.
    fn merge(&mut self, other: NodeRecord) {
        if self.node_type.is_empty() {
            self.node_type = other.node_type;
        }
        if self.parent.is_none() {
            self.parent = other.parent;
        }
        self.shared &= other.shared;
        for (attr, value) in other.attributes {
            self.set_attribute(attr, value);
        }
    }
}

/// One `connectAttr` relationship.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub src_plug: String,
    pub dst_plug: String,
}

impl ConnectionRecord {
    pub fn new(src_plug: impl Into<String>, dst_plug: impl Into<String>) -> Self {
        Self {
            src_plug: src_plug.into(),
            dst_plug: dst_plug.into(),
        }
    }
}

/// Units declared with `currentUnit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneUnits {
    pub linear: String,
    pub angle: String,
    pub time: String,
}

impl Default for SceneUnits {
    fn default() -> Self {
        Self {
            linear: "centimeter".to_string(),
            angle: "degree".to_string(),
            time: "film".to_string(),
        }
    }
}

/// A complete parsed scene.
#[derive(Clone, Debug, Default)]
pub struct SceneData {
    /// Scene name (usually from filename)
    pub name: String,

    /// DAG key -> node record
    nodes: IndexMap<String, NodeRecord>,

    /// Leaf name -> positions in `nodes`
    by_leaf: HashMap<String, Vec<usize>>,

    /// Connections in file order
    connections: Vec<ConnectionRecord>,

    /// `requires` plugin/version pairs
    pub requires: Vec<(String, String)>,

    /// `fileInfo` key/value pairs
    pub file_info: IndexMap<String, String>,

    pub units: SceneUnits,
}

impl SceneData {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a node. Returns the DAG key it was stored under, or `None` when
    /// the record has no usable name.
    ///
    /// A record is merged into an existing one with the same leaf name only
    /// when it names no parent or the same parent (`createNode -s`, `select
    /// -ne` placeholders, re-declarations). Merged attributes overwrite, and a
    /// missing type or parent is filled in. Same-named nodes under different
    /// parents are kept apart.
    pub fn add_node(&mut self, record: NodeRecord) -> Option<String> {
        let leaf = node_key(&record.name).to_string();
        if leaf.is_empty() {
            return None;
        }

        let parent = record.parent_key().map(str::to_string);
        let target = self.by_leaf.get(&leaf).and_then(|positions| {
            positions.iter().copied().find(|&index| {
                let Some((_, existing)) = self.nodes.get_index(index) else {
                    return false;
                };
                match (parent.as_deref(), existing.parent_key()) {
                    (None, _) => true,
                    (Some(wanted), Some(have)) => wanted == have,
                    (Some(_), None) => existing.node_type.is_empty(),
                }
            })
        });

        if let Some((key, existing)) = target.and_then(|index| self.nodes.get_index_mut(index)) {
            existing.merge(record);
            return Some(key.clone());
        }

        let key = format!("{}|{}", parent.as_deref().unwrap_or(""), leaf);
        if let Some(existing) = self.nodes.get_mut(&key) {
            existing.merge(record);
            return Some(key);
        }

        let (index, _) = self.nodes.insert_full(key.clone(), record);
        let positions = self.by_leaf.entry(leaf).or_default();
        positions.push(index);
        if positions.len() > 1 {
            log::warn!(
                "Node name {} is ambiguous in {}: {} nodes share it",
                node_key(&key),
                self.name,
                positions.len()
            );
        }
        Some(key)
    }

    /// Position of the node a name refers to.
    ///
    /// A bare name resolves to the first node with that leaf name. A DAG path
    /// (or a key returned by [`SceneData::add_node`]) prefers the node whose
    /// parent matches the path.
    fn resolve(&self, name: &str) -> Option<usize> {
        let positions = self.by_leaf.get(node_key(name))?;
        if name.contains('|') {
            let wanted = path_parent(name);
            let exact = positions.iter().copied().find(|&index| {
                self.nodes
                    .get_index(index)
                    .is_some_and(|(_, node)| node.parent_key() == wanted)
            });
            if exact.is_some() {
                return exact;
            }
        }
        positions.first().copied()
    }

    /// Look up a node by leaf name or DAG path.
    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        let index = self.resolve(name)?;
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut NodeRecord> {
        let index = self.resolve(name)?;
        self.nodes.get_index_mut(index).map(|(_, node)| node)
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Whether more than one node uses this leaf name.
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.by_leaf
            .get(node_key(name))
            .is_some_and(|positions| positions.len() > 1)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a NodeRecord> {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_connection(&mut self, record: ConnectionRecord) {
        self.connections.push(record);
    }

    pub fn connections(&self) -> &[ConnectionRecord] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Keep only the connections matching `keep`. Returns the number removed.
    pub fn retain_connections<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&ConnectionRecord) -> bool,
    {
        let before = self.connections.len();
        self.connections.retain(keep);
        before - self.connections.len()
    }

    /// Total attribute count across all nodes.
    pub fn total_attribute_count(&self) -> usize {
        self.nodes.values().map(NodeRecord::attribute_count).sum()
    }
}
