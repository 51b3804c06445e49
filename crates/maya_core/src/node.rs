//! Lightweight read-only node views for consumers that want plain
//! name/type/value lookups instead of raw records.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use maya_math::DVec3;
use rayon::prelude::*;

use crate::scene::{NodeRecord, SceneData};
use crate::value::{fallback_decode, ParsedValue};

/// A decoded view of one [`NodeRecord`].
#[derive(Clone, Debug, PartialEq)]
pub struct MayaNode {
    name: String,
    node_type: String,
    /// Attribute key without its leading `.` -> decoded value
    attributes: IndexMap<String, Option<ParsedValue>>,
}

impl MayaNode {
    /// Build the view. Each key loses one leading `.`; the typed value is used
    /// when present, otherwise the numeric fallback runs on the raw tokens.
    pub fn from_record(record: &NodeRecord) -> Self {
        let mut attributes = IndexMap::with_capacity(record.attributes.len());
        // `.tx` next to a bare `tx` keeps its dot so neither entry is lost
        let bare: HashSet<&str> = record
            .attributes
            .keys()
            .filter(|k| !k.starts_with('.'))
            .map(String::as_str)
            .collect();

        for (key, value) in &record.attributes {
            let decoded = value
                .parsed_value()
                .cloned()
                .or_else(|| fallback_decode(value.value_tokens()));

            let key = match key.strip_prefix('.') {
                Some(stripped) if !bare.contains(stripped) => stripped.to_string(),
                _ => key.clone(),
            };
            attributes.insert(key, decoded);
        }

        Self {
            name: record.name.clone(),
            node_type: record.node_type.clone(),
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Decoded value for `key` (without leading `.`). `None` when the key is
    /// unknown or the value could not be decoded.
    pub fn attribute(&self, key: &str) -> Option<&ParsedValue> {
        self.attributes.get(key).and_then(Option::as_ref)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, Option<&ParsedValue>)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn vector3(&self, key: &str) -> Option<DVec3> {
        self.attribute(key).and_then(ParsedValue::as_dvec3)
    }
}

/// Adapter views for every node of a scene, with exact-name lookup.
#[derive(Clone, Debug, Default)]
pub struct NodeSet {
    nodes: Vec<MayaNode>,
    index: HashMap<String, usize>,
}

impl NodeSet {
    /// Build views for all nodes. Records are independent, so this runs in
    /// parallel; the result keeps scene order.
    pub fn from_scene(scene: &SceneData) -> Self {
        let records: Vec<&NodeRecord> = scene.nodes().collect();
        let nodes: Vec<MayaNode> = records
            .par_iter()
            .map(|record| MayaNode::from_record(record))
            .collect();

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.name.clone()).or_insert(i);
        }

        Self { nodes, index }
    }

    /// Case-sensitive exact lookup.
    pub fn find(&self, name: &str) -> Option<&MayaNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MayaNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
