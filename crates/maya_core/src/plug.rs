//! Plug strings and the connection graph built from `connectAttr` records.
//!
//! A plug is `node.attr[.sub...]`. The graph is a plain ordered edge list with
//! per-node indices; it makes no claim about acyclicity.

use std::collections::HashMap;
use std::fmt;

use crate::scene::ConnectionRecord;

/// Split a plug on its first `.` into node and attribute parts.
///
/// Returns `None` when the node part is empty. A plug without a `.` is
/// treated as the node itself with an empty attribute.
pub fn split_plug(plug: &str) -> Option<(&str, &str)> {
    let plug = plug.trim();
    let (node, attr) = match plug.find('.') {
        Some(dot) => (&plug[..dot], &plug[dot + 1..]),
        None => (plug, ""),
    };

    if node.is_empty() {
        return None;
    }
    Some((node, attr))
}

/// Last component of a DAG path (`|grp|pCube1` -> `pCube1`).
pub fn leaf_name(path: &str) -> &str {
    match path.rfind('|') {
        Some(bar) => &path[bar + 1..],
        None => path,
    }
}

/// Lookup key of a node: its leaf name without the root-namespace `:` prefix
/// (`:time1` and `time1` are the same node).
pub fn node_key(path: &str) -> &str {
    let leaf = leaf_name(path.trim());
    leaf.strip_prefix(':').unwrap_or(leaf)
}

/// Key of the parent named by a DAG path (`|grp|pCube1` -> `grp`).
/// `None` for a bare name or a node directly under the world (`|pCube1`).
pub fn path_parent(path: &str) -> Option<&str> {
    let (prefix, _) = path.trim().rsplit_once('|')?;
    let parent = node_key(prefix);
    (!parent.is_empty()).then_some(parent)
}

/// One resolved edge of the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub src_node: String,
    pub src_attr: String,
    pub dst_node: String,
    pub dst_attr: String,
}

impl Connection {
    /// Resolve a record, or `None` when either plug has no node part.
    pub fn from_record(record: &ConnectionRecord) -> Option<Self> {
        let (src_node, src_attr) = split_plug(&record.src_plug)?;
        let (dst_node, dst_attr) = split_plug(&record.dst_plug)?;
        Some(Self {
            src_node: src_node.to_string(),
            src_attr: src_attr.to_string(),
            dst_node: dst_node.to_string(),
            dst_attr: dst_attr.to_string(),
        })
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.src_node, self.src_attr, self.dst_node, self.dst_attr
        )
    }
}

/// Directed connection graph in source order.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGraph {
    connections: Vec<Connection>,
    /// Node key -> indices of edges leaving it
    outgoing: HashMap<String, Vec<usize>>,
    /// Node key -> indices of edges entering it
    incoming: HashMap<String, Vec<usize>>,
    dropped: usize,
}

impl ConnectionGraph {
    /// Build the graph. Records with an empty node part are dropped.
    pub fn build(records: &[ConnectionRecord]) -> Self {
        let mut graph = Self::default();

        for record in records {
            let Some(connection) = Connection::from_record(record) else {
                graph.dropped += 1;
                continue;
            };

            let index = graph.connections.len();
            graph
                .outgoing
                .entry(node_key(&connection.src_node).to_string())
                .or_default()
                .push(index);
            graph
                .incoming
                .entry(node_key(&connection.dst_node).to_string())
                .or_default()
                .push(index);
            graph.connections.push(connection);
        }

        graph
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of records that could not be resolved.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Edges whose source is `node` (leaf or full path), in source order.
    pub fn outgoing<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.edges(&self.outgoing, node)
    }

    /// Edges whose destination is `node` (leaf or full path), in source order.
    pub fn incoming<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.edges(&self.incoming, node)
    }

    fn edges<'a>(
        &'a self,
        index: &'a HashMap<String, Vec<usize>>,
        node: &str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        index
            .get(node_key(node))
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.connections[i])
    }

    /// Whether any edge enters `node` on an attribute starting with `prefix`.
    pub fn has_incoming_attr(&self, node: &str, prefix: &str) -> bool {
        self.incoming(node).any(|c| c.dst_attr.starts_with(prefix))
    }
}
