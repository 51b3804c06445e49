use maya_core::pipeline::{
    BlendShapeInfo, ConstraintInfo, Pipeline, PipelineConfig, PipelineRun, SkinBinding,
    DEFAULT_PASSES,
};
use maya_core::summary::ROOT_CATEGORY;
use maya_core::{load_ma_from_string, AttributeSummary, NodeSet, ParsedValue};
use maya_math::DVec3;

const RIG: &str = r#"//Maya ASCII 2024 scene
//Name: rig.ma
requires maya "2024";
currentUnit -l centimeter -a degree -t film;
fileInfo "application" "maya";
createNode transform -n "body";
	setAttr ".t" -type "double3" 0 10 0 ;
createNode mesh -n "bodyShape" -p "body";
	setAttr -s 3 ".vt[0:2]" 0 0 0 1 0 0 0 1 0;
createNode mesh -n "orphanShape" -p "missingGroup";
createNode joint -n "joint1";
	setAttr ".jo" -type "double3" 0 0 90 ;
createNode joint -n "joint2" -p "joint1";
createNode skinCluster -n "skinCluster1";
	setAttr -s 2 ".wl[0].w[0:1]" 0.25 0.75;
createNode blendShape -n "blendShape1";
	setAttr ".w[0]" 0.5;
createNode parentConstraint -n "body_parentConstraint1" -p "body";
createNode locator -n "ctrl";
	setAttr ".lp" 1 2 3 4 5;
select -ne :time1;
	setAttr ".o" 1;
connectAttr "joint1.wm" "skinCluster1.ma[0]";
connectAttr "joint2.wm" "skinCluster1.ma[1]";
connectAttr "skinCluster1.og[0]" "bodyShape.i";
connectAttr "ctrl.t" "body_parentConstraint1.tg[0].tt";
connectAttr "body_parentConstraint1.ctx" "body.tx";
connectAttr "ghost.out" "body.ry";
connectAttr ":time1.o" "body.v";
"#;

#[test]
fn test_default_pipeline_on_rig() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut scene = load_ma_from_string(RIG, "rig").unwrap();
    assert_eq!(scene.node_count(), 10);
    assert_eq!(scene.connection_count(), 7);

    let mut run = PipelineRun::new();
    let report = Pipeline::default().run(&mut scene, &mut run).unwrap();

    assert_eq!(run.applied(), DEFAULT_PASSES.as_slice());
    assert_eq!(report.unresolved_connections, 0);

    // ghost.out is pruned, :time1 is a known placeholder
    assert_eq!(report.warnings["prune_dangling_connections"].len(), 1);
    assert_eq!(scene.connection_count(), 6);

    let parents = &report.warnings["missing_parents"];
    assert_eq!(parents.len(), 1);
    assert!(parents[0].contains("missingGroup"));

    assert!(report.warnings["skin_cluster_bindings"].is_empty());
    assert!(report.warnings["blend_shape_targets"].is_empty());
    assert!(report.warnings["constraint_targets"].is_empty());

    let skin = run.extensions().get::<SkinBinding>("skinCluster1").unwrap();
    assert_eq!(skin.influences, vec!["joint1", "joint2"]);
    assert_eq!(skin.outputs, vec!["bodyShape"]);

    let blend = run.extensions().get::<BlendShapeInfo>("blendShape1").unwrap();
    assert_eq!(blend.connected_targets, 0);
    assert_eq!(blend.weights, 1);

    let constraint = run
        .extensions()
        .get::<ConstraintInfo>("body_parentConstraint1")
        .unwrap();
    assert_eq!(constraint.targets, vec!["ctrl"]);
    assert_eq!(constraint.driven, vec!["body"]);

    let summary = run.extensions().get::<AttributeSummary>("body").unwrap();
    assert_eq!(summary.total_attributes, 1);
    assert_eq!(summary.category("t").map(|c| c.entries.len()), Some(1));
    assert!(summary.category(ROOT_CATEGORY).is_none());

    // A second run over the same run-state does nothing
    let again = Pipeline::default().run(&mut scene, &mut run).unwrap();
    assert_eq!(again.total_warnings(), 0);
    assert_eq!(again.skipped.len(), DEFAULT_PASSES.len());
}

#[test]
fn test_node_adapters() {
    let scene = load_ma_from_string(RIG, "rig").unwrap();
    let nodes = NodeSet::from_scene(&scene);

    assert_eq!(nodes.len(), scene.node_count());
    let order: Vec<_> = nodes.iter().map(|n| n.name()).take(3).collect();
    assert_eq!(order, vec!["body", "bodyShape", "orphanShape"]);

    let body = nodes.find("body").unwrap();
    assert_eq!(body.vector3("t"), Some(DVec3::new(0.0, 10.0, 0.0)));

    let joint = nodes.find("joint1").unwrap();
    assert_eq!(joint.vector3("jo"), Some(DVec3::new(0.0, 0.0, 90.0)));

    // Five untyped numbers fall back to their first three
    let ctrl = nodes.find("ctrl").unwrap();
    assert_eq!(
        ctrl.attribute("lp"),
        Some(&ParsedValue::Float3(DVec3::new(1.0, 2.0, 3.0)))
    );

    let time = nodes.find("time1").unwrap();
    assert_eq!(time.attribute("o"), Some(&ParsedValue::Int(1)));
}

#[test]
fn test_configured_pipeline() {
    let config = PipelineConfig::from_json_str(
        r#"{ "passes": ["attribute_summaries"], "summary": { "max_categories": 1, "max_entries": 1 } }"#,
    )
    .unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.pass_names(), vec!["attribute_summaries"]);

    let mut scene = load_ma_from_string(RIG, "rig").unwrap();
    let mut run = PipelineRun::new();
    let report = pipeline.run(&mut scene, &mut run).unwrap();
    assert_eq!(report.total_warnings(), 0);
    assert_eq!(scene.connection_count(), 7);

    let summary = run.extensions().get::<AttributeSummary>("skinCluster1").unwrap();
    assert_eq!(summary.categories.len(), 1);
    assert_eq!(summary.entry_count(), 1);

    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(json["categories"][0]["name"], "wl");
    assert_eq!(json["categories"][0]["entries"][0]["key"], ".wl[0].w[0:1]");
}
