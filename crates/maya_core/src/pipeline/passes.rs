//! Built-in pipeline passes.

use rayon::prelude::*;

use super::{PassContext, PipelineResult, ScenePass};
use crate::plug::{node_key, Connection};
use crate::scene::NodeRecord;
use crate::summary::AttributeSummary;

/// Built-in pass names in their default execution order.
pub const DEFAULT_PASSES: [&str; 6] = [
    "prune_dangling_connections",
    "missing_parents",
    "skin_cluster_bindings",
    "blend_shape_targets",
    "constraint_targets",
    "attribute_summaries",
];

/// Look up a built-in pass by name.
pub fn builtin_pass(name: &str) -> Option<Box<dyn ScenePass>> {
    match name {
        "prune_dangling_connections" => Some(Box::new(PruneDanglingConnections)),
        "missing_parents" => Some(Box::new(MissingParents)),
        "skin_cluster_bindings" => Some(Box::new(SkinClusterBindings)),
        "blend_shape_targets" => Some(Box::new(BlendShapeTargets)),
        "constraint_targets" => Some(Box::new(ConstraintTargets)),
        "attribute_summaries" => Some(Box::new(AttributeSummaries)),
        _ => None,
    }
}

/// Nodes every Maya scene has even when the file never creates them.
const DEFAULT_NODES: &[&str] = &[
    "time1",
    "sequenceManager1",
    "hardwareRenderingGlobals",
    "renderPartition",
    "renderGlobalsList1",
    "defaultLightList1",
    "defaultShaderList1",
    "postProcessList1",
    "defaultRenderUtilityList1",
    "defaultRenderingList1",
    "defaultTextureList1",
    "lightList1",
    "defaultLightSet",
    "defaultObjectSet",
    "initialShadingGroup",
    "initialParticleSE",
    "initialMaterialInfo",
    "lambert1",
    "particleCloud1",
    "standardSurface1",
    "shaderGlow1",
    "defaultRenderGlobals",
    "defaultResolution",
    "defaultColorMgtGlobals",
    "dof1",
    "ikSystem",
    "characterPartition",
    "strokeGlobals",
    "persp",
    "perspShape",
    "top",
    "topShape",
    "front",
    "frontShape",
    "side",
    "sideShape",
];

fn is_default_node(name: &str) -> bool {
    DEFAULT_NODES.contains(&node_key(name))
}

/// Removes connections whose source or destination node is not in the scene.
///
/// Records whose plugs cannot be resolved are left alone; the graph already
/// ignores them.
pub struct PruneDanglingConnections;

impl ScenePass for PruneDanglingConnections {
    fn name(&self) -> &'static str {
        "prune_dangling_connections"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let mut warnings = Vec::new();

        let keep: Vec<bool> = ctx
            .scene
            .connections()
            .iter()
            .map(|record| {
                let Some(connection) = Connection::from_record(record) else {
                    return true;
                };
                let missing = [&connection.src_node, &connection.dst_node]
                    .into_iter()
                    .find(|node| !ctx.scene.contains_node(node) && !is_default_node(node));
                match missing {
                    Some(node) => {
                        warnings.push(format!(
                            "Removed connection [{}]: node [{}] is not in the scene",
                            connection, node
                        ));
                        false
                    }
                    None => true,
                }
            })
            .collect();

        let mut flags = keep.into_iter();
        let removed = ctx
            .scene
            .retain_connections(|_| flags.next().unwrap_or(true));
        if removed > 0 {
            ctx.rebuild_graph();
        }

        Ok(warnings)
    }
}

/// Reports nodes created under a parent that does not exist.
pub struct MissingParents;

impl ScenePass for MissingParents {
    fn name(&self) -> &'static str {
        "missing_parents"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let warnings = ctx
            .scene
            .nodes()
            .filter_map(|node| {
                let parent = node.parent.as_deref()?;
                if ctx.scene.contains_node(parent) || is_default_node(parent) {
                    return None;
                }
                Some(format!(
                    "Node [{}] has parent [{}] which is not in the scene",
                    node.name, parent
                ))
            })
            .collect();
        Ok(warnings)
    }
}

/// Influences and outputs of one `skinCluster`, attached by
/// [`SkinClusterBindings`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkinBinding {
    /// Nodes driving `matrix[i]` (`ma`), in connection order
    pub influences: Vec<String>,

    /// Nodes fed by `outputGeometry[i]` (`og`)
    pub outputs: Vec<String>,
}

/// Resolves skin cluster influences and outputs from the connection graph.
pub struct SkinClusterBindings;

impl ScenePass for SkinClusterBindings {
    fn name(&self) -> &'static str {
        "skin_cluster_bindings"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let mut warnings = Vec::new();
        let skins: Vec<String> = ctx
            .scene
            .nodes_of_type("skinCluster")
            .map(|n| node_key(&n.name).to_string())
            .collect();

        for skin in skins {
            let mut binding = SkinBinding::default();
            for c in ctx.graph.incoming(&skin) {
                if attr_is(&c.dst_attr, &["ma", "matrix"]) {
                    push_unique(&mut binding.influences, &c.src_node);
                }
            }
            for c in ctx.graph.outgoing(&skin) {
                if attr_is(&c.src_attr, &["og", "outputGeometry"]) {
                    push_unique(&mut binding.outputs, &c.dst_node);
                }
            }

            if binding.influences.is_empty() {
                warnings.push(format!("skinCluster [{}] has no influence matrices connected", skin));
            }
            if binding.outputs.is_empty() {
                warnings.push(format!("skinCluster [{}] does not deform any geometry", skin));
            }
            ctx.extensions.insert(&skin, binding);
        }

        Ok(warnings)
    }
}

/// Target and weight counts of one `blendShape`, attached by
/// [`BlendShapeTargets`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlendShapeInfo {
    /// Incoming connections on `inputTarget` (`it`)
    pub connected_targets: usize,

    /// Weight attributes set in the file
    pub weights: usize,
}

/// Reports blend shapes with neither connected targets nor stored weights.
pub struct BlendShapeTargets;

impl ScenePass for BlendShapeTargets {
    fn name(&self) -> &'static str {
        "blend_shape_targets"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let mut warnings = Vec::new();
        let shapes: Vec<(String, usize)> = ctx
            .scene
            .nodes_of_type("blendShape")
            .map(|n| (node_key(&n.name).to_string(), count_weights(n)))
            .collect();

        for (shape, weights) in shapes {
            let connected_targets = ctx
                .graph
                .incoming(&shape)
                .filter(|c| attr_is(&c.dst_attr, &["it", "inputTarget"]))
                .count();

            if connected_targets == 0 && weights == 0 {
                warnings.push(format!("blendShape [{}] has no targets or weights", shape));
            }
            ctx.extensions.insert(
                &shape,
                BlendShapeInfo {
                    connected_targets,
                    weights,
                },
            );
        }

        Ok(warnings)
    }
}

fn count_weights(node: &NodeRecord) -> usize {
    node.attributes
        .keys()
        .filter(|k| {
            let k = k.strip_prefix('.').unwrap_or(k);
            k.starts_with("w[") || k.starts_with("weight[") || k == "w" || k == "weight"
        })
        .count()
}

const CONSTRAINT_TYPES: &[&str] = &[
    "parentConstraint",
    "pointConstraint",
    "orientConstraint",
    "scaleConstraint",
    "aimConstraint",
];

const CONSTRAINT_OUTPUTS: &[&str] = &[
    "ct", "ctx", "cty", "ctz", "cr", "crx", "cry", "crz", "cs", "csx", "csy", "csz",
];

fn is_constraint_output(attr: &str) -> bool {
    let root = attr_root(attr);
    root.starts_with("constraint") || CONSTRAINT_OUTPUTS.contains(&root)
}

/// Targets and driven nodes of one constraint, attached by
/// [`ConstraintTargets`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintInfo {
    /// Nodes feeding `target[i]` (`tg`)
    pub targets: Vec<String>,

    /// Nodes receiving `constraint*` outputs
    pub driven: Vec<String>,
}

/// Reports constraints without targets or without anything to drive.
pub struct ConstraintTargets;

impl ScenePass for ConstraintTargets {
    fn name(&self) -> &'static str {
        "constraint_targets"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let mut warnings = Vec::new();
        let constraints: Vec<(String, String)> = ctx
            .scene
            .nodes()
            .filter(|n| CONSTRAINT_TYPES.contains(&n.node_type.as_str()))
            .map(|n| (node_key(&n.name).to_string(), n.node_type.clone()))
            .collect();

        for (constraint, node_type) in constraints {
            let mut info = ConstraintInfo::default();
            for c in ctx.graph.incoming(&constraint) {
                // The constrained object feeds back parent/rotate-order inputs; skip them
                if attr_is(&c.dst_attr, &["tg", "target"]) && node_key(&c.src_node) != constraint {
                    push_unique(&mut info.targets, &c.src_node);
                }
            }
            for c in ctx.graph.outgoing(&constraint) {
                if is_constraint_output(&c.src_attr) {
                    push_unique(&mut info.driven, &c.dst_node);
                }
            }

            if info.targets.is_empty() {
                warnings.push(format!("{} [{}] has no targets", node_type, constraint));
            }
            if info.driven.is_empty() {
                warnings.push(format!("{} [{}] does not drive any node", node_type, constraint));
            }
            ctx.extensions.insert(&constraint, info);
        }

        Ok(warnings)
    }
}

/// Builds an [`AttributeSummary`] for every node and attaches it.
pub struct AttributeSummaries;

impl ScenePass for AttributeSummaries {
    fn name(&self) -> &'static str {
        "attribute_summaries"
    }

    fn run(&self, ctx: &mut PassContext<'_>) -> PipelineResult<Vec<String>> {
        let options = ctx.summary_options;
        let records: Vec<&NodeRecord> = ctx.scene.nodes().collect();
        let summaries: Vec<(String, AttributeSummary)> = records
            .par_iter()
            .map(|record| {
                (
                    node_key(&record.name).to_string(),
                    AttributeSummary::from_record(record, &options),
                )
            })
            .collect();

        for (node, summary) in summaries {
            ctx.extensions.insert(&node, summary);
        }
        Ok(Vec::new())
    }
}

/// First segment of an attribute path (`tg[0].tpm` -> `tg`).
fn attr_root(attr: &str) -> &str {
    let end = attr.find(['.', '[']).unwrap_or(attr.len());
    &attr[..end]
}

/// Whether the attribute's first segment is one of `names` (short or long form).
fn attr_is(attr: &str, names: &[&str]) -> bool {
    names.contains(&attr_root(attr))
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, PipelineRun};
    use crate::scene::{ConnectionRecord, SceneData};
    use crate::value::RawAttributeValue;

    fn run_single(pass: &str, scene: &mut SceneData) -> (Vec<String>, PipelineRun) {
        let pipeline = Pipeline::new().with_pass(builtin_pass(pass).unwrap());
        let mut run = PipelineRun::new();
        let mut report = pipeline.run(scene, &mut run).unwrap();
        let warnings = report.warnings.shift_remove(pass).unwrap_or_default();
        (warnings, run)
    }

    #[test]
    fn test_every_default_pass_resolves() {
        for name in DEFAULT_PASSES {
            let pass = builtin_pass(name).unwrap();
            assert_eq!(pass.name(), name);
        }
        assert!(builtin_pass("nope").is_none());
    }

    #[test]
    fn test_prune_keeps_default_nodes() {
        let mut scene = SceneData::new("test");
        scene.add_node(NodeRecord::new("pCubeShape1", "mesh"));
        scene.add_connection(ConnectionRecord::new(
            "pCubeShape1.iog",
            ":initialShadingGroup.dsm",
        ));
        scene.add_connection(ConnectionRecord::new("deleted1.out", "pCubeShape1.in"));

        let (warnings, _) = run_single("prune_dangling_connections", &mut scene);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("deleted1"));
        assert_eq!(scene.connection_count(), 1);
    }

    #[test]
    fn test_missing_parents() {
        let mut scene = SceneData::new("test");
        scene.add_node(NodeRecord::new("grp", "transform"));
        scene.add_node(NodeRecord::new("a", "transform").with_parent("grp"));
        scene.add_node(NodeRecord::new("b", "transform").with_parent("|gone"));
        scene.add_node(NodeRecord::new("cam", "camera").with_parent("persp"));

        let (warnings, _) = run_single("missing_parents", &mut scene);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("[b]"));
    }

    #[test]
    fn test_skin_cluster_bindings() {
        let mut scene = SceneData::new("test");
        scene.add_node(NodeRecord::new("skinCluster1", "skinCluster"));
        scene.add_node(NodeRecord::new("skinCluster2", "skinCluster"));
        scene.add_connection(ConnectionRecord::new("joint1.wm", "skinCluster1.ma[0]"));
        scene.add_connection(ConnectionRecord::new("bindPose1.msg", "skinCluster1.bp"));
        scene.add_connection(ConnectionRecord::new("joint2.wm", "skinCluster1.matrix[1]"));
        scene.add_connection(ConnectionRecord::new("joint1.wm", "skinCluster1.matrix[2]"));
        scene.add_connection(ConnectionRecord::new("skinCluster1.og[0]", "bodyShape.i"));

        let (warnings, run) = run_single("skin_cluster_bindings", &mut scene);
        let binding = run.extensions().get::<SkinBinding>("skinCluster1").unwrap();
        assert_eq!(binding.influences, vec!["joint1", "joint2"]);
        assert_eq!(binding.outputs, vec!["bodyShape"]);

        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.contains("skinCluster2")));
    }

    #[test]
    fn test_blend_shape_targets() {
        let mut scene = SceneData::new("test");
        scene.add_node(
            NodeRecord::new("blendShape1", "blendShape")
                .with_attribute(".w[0]", RawAttributeValue::from_tokens(["0.5"])),
        );
        scene.add_node(NodeRecord::new("blendShape2", "blendShape"));
        scene.add_node(NodeRecord::new("blendShape3", "blendShape"));
        scene.add_connection(ConnectionRecord::new(
            "smileShape.w",
            "blendShape3.it[0].itg[0].iti[6000].igt",
        ));
        scene.add_connection(ConnectionRecord::new(
            "frownShape.w",
            "blendShape3.inputTarget[0].inputTargetGroup[1].inputTargetItem[6000].inputGeomTarget",
        ));

        let (warnings, run) = run_single("blend_shape_targets", &mut scene);
        assert_eq!(warnings, vec!["blendShape [blendShape2] has no targets or weights".to_string()]);

        let info = run.extensions().get::<BlendShapeInfo>("blendShape1").unwrap();
        assert_eq!(info.weights, 1);
        let info = run.extensions().get::<BlendShapeInfo>("blendShape3").unwrap();
        assert_eq!(info.connected_targets, 2);
    }

    #[test]
    fn test_constraint_targets() {
        let mut scene = SceneData::new("test");
        scene.add_node(NodeRecord::new("arm_parentConstraint1", "parentConstraint"));
        scene.add_connection(ConnectionRecord::new(
            "ctrl.pm",
            "arm_parentConstraint1.tg[0].tpm",
        ));
        scene.add_connection(ConnectionRecord::new(
            "arm_parentConstraint1.ctx",
            "arm.tx",
        ));
        scene.add_connection(ConnectionRecord::new(
            "arm.pim",
            "arm_parentConstraint1.cpim",
        ));

        let (warnings, run) = run_single("constraint_targets", &mut scene);
        assert!(warnings.is_empty(), "{:?}", warnings);
        let info = run
            .extensions()
            .get::<ConstraintInfo>("arm_parentConstraint1")
            .unwrap();
        assert_eq!(info.targets, vec!["ctrl"]);
        assert_eq!(info.driven, vec!["arm"]);
    }

    #[test]
    fn test_attribute_summaries_attached() {
        let mut scene = SceneData::new("test");
        scene.add_node(
            NodeRecord::new("pCube1", "transform")
                .with_attribute(".t", RawAttributeValue::from_tokens(["1", "2", "3"])),
        );
        scene.add_node(NodeRecord::new("empty", "transform"));

        let (warnings, run) = run_single("attribute_summaries", &mut scene);
        assert!(warnings.is_empty());
        let summary = run.extensions().get::<AttributeSummary>("pCube1").unwrap();
        assert_eq!(summary.entry_count(), 1);
        assert!(run.extensions().contains::<AttributeSummary>("empty"));
    }
}
