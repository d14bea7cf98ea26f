use std::collections::BTreeSet;

use glam::Vec3;
use parametric_scene::config::{Effect, Param, ParameterGroup};
use parametric_scene::math::Rgb;
use parametric_scene::scene::{NodeId, SceneGraph};
use parametric_scene::scenes::{crystal, flower};
use parametric_scene::{RegenerationController, SceneError, SceneKind, SceneSetup};

fn crystal_setup() -> SceneSetup {
    SceneKind::Crystal.build(crystal::default_config()).unwrap()
}

fn flower_setup() -> SceneSetup {
    SceneKind::Flower.build(flower::default_config()).unwrap()
}

/// Apply every queued change, panicking on the first rejection
fn regenerate(setup: &mut SceneSetup) {
    let changes = setup.config.drain_changes();
    let mut controller = RegenerationController::new(&mut setup.scene, &setup.config);
    for change in &changes {
        controller.apply(change).unwrap();
    }
}

fn member_ids(scene: &SceneGraph, ring: &str) -> Vec<NodeId> {
    scene.children(scene.lookup(ring).unwrap()).to_vec()
}

/// Placement angle of each ring member in degrees, from its local position
fn member_angles(scene: &SceneGraph, ring: &str) -> Vec<f32> {
    member_ids(scene, ring)
        .into_iter()
        .map(|id| {
            let p = scene.transform(id).unwrap().position;
            p.y.atan2(p.x).to_degrees().rem_euclid(360.0)
        })
        .collect()
}

fn assert_angles(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        let diff = (a - e).abs();
        assert!(diff < 1e-3 || (360.0 - diff) < 1e-3, "angle {a} != {e}");
    }
}

fn sorted_names(scene: &SceneGraph) -> BTreeSet<String> {
    scene.names().map(str::to_string).collect()
}

// ============================================================================
// Crystal
// ============================================================================

#[test]
fn test_core_radius_replaces_geometry_in_place() {
    let mut setup = crystal_setup();
    let core = setup.scene.find_mesh(crystal::CORE).unwrap();
    let old_geometry = setup.scene.mesh(core).unwrap().geometry().id();
    let material = setup.scene.mesh(core).unwrap().material;
    let live = setup.scene.live_geometry_count();

    setup.config.edit(crystal::CORE_GROUP, "radius", 0.5).unwrap();
    regenerate(&mut setup);

    let mesh = setup.scene.mesh(core).unwrap();
    assert_eq!(setup.scene.find_mesh(crystal::CORE), Ok(core));
    assert_eq!(mesh.material, material);
    assert!((mesh.geometry().bounding_radius() - 0.5).abs() < 1e-5);
    assert!(!setup.scene.is_geometry_live(old_geometry));
    assert_eq!(setup.scene.live_geometry_count(), live);
    assert_eq!(setup.scene.released_geometry_total(), 1);
}

#[test]
fn test_core_geometry_edit_notifies_only_when_finished() {
    let mut setup = crystal_setup();
    setup.config.set(crystal::CORE_GROUP, "radius", 0.4).unwrap();
    assert!(!setup.config.has_pending_changes());

    setup.config.finish_edit(crystal::CORE_GROUP, "radius").unwrap();
    let changes = setup.config.drain_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].keys, ["radius"]);
}

#[test]
fn test_light_count_respaces_ring() {
    let mut setup = crystal_setup();

    setup.config.edit(crystal::LIGHTS_GROUP, "count", 3).unwrap();
    regenerate(&mut setup);
    assert_angles(&member_angles(&setup.scene, crystal::LIGHTS_RING), &[0.0, 120.0, 240.0]);

    setup.config.edit(crystal::LIGHTS_GROUP, "count", 5).unwrap();
    regenerate(&mut setup);
    assert_angles(
        &member_angles(&setup.scene, crystal::LIGHTS_RING),
        &[0.0, 72.0, 144.0, 216.0, 288.0],
    );
    assert!(setup.scene.find_light("light.4").is_ok());
    assert!(setup.scene.orphaned_names().is_empty());
}

#[test]
fn test_light_ring_radius_moves_lights() {
    let mut setup = crystal_setup();
    setup.config.edit(crystal::LIGHTS_GROUP, "ring_radius", 2.0).unwrap();
    regenerate(&mut setup);

    for id in member_ids(&setup.scene, crystal::LIGHTS_RING) {
        let p = setup.scene.transform(id).unwrap().position;
        assert!((p.length() - 2.0).abs() < 1e-5);
    }
}

#[test]
fn test_intensity_patches_lights_in_place() {
    let mut setup = crystal_setup();
    let before = member_ids(&setup.scene, crystal::LIGHTS_RING);
    let geometries = setup.scene.live_geometry_count();

    setup.config.set(crystal::LIGHTS_GROUP, "intensity", 0.5).unwrap();
    regenerate(&mut setup);

    assert_eq!(member_ids(&setup.scene, crystal::LIGHTS_RING), before);
    assert_eq!(setup.scene.released_geometry_total(), 0);
    assert_eq!(setup.scene.live_geometry_count(), geometries);
    for id in before {
        let light = setup.scene.get(id).and_then(|n| n.as_light()).unwrap();
        assert_eq!(light.intensity, 0.5);
    }
}

#[test]
fn test_core_color_keeps_geometry() {
    let mut setup = crystal_setup();
    let core = setup.scene.find_mesh(crystal::CORE).unwrap();
    let geometry = setup.scene.mesh(core).unwrap().geometry().id();

    let red = Rgb::from_hex(0xff0000);
    setup.config.set(crystal::CORE_GROUP, "color", red).unwrap();
    regenerate(&mut setup);

    let mesh = setup.scene.mesh(core).unwrap();
    assert_eq!(mesh.material.color, red);
    assert_eq!(mesh.geometry().id(), geometry);
}

#[test]
fn test_rejected_snapshot_leaves_scene_untouched() {
    let mut setup = crystal_setup();
    let members = member_ids(&setup.scene, crystal::LIGHTS_RING);
    let names = sorted_names(&setup.scene);
    let live = setup.scene.live_geometry_count();

    // A store whose lights group admits a negative intensity
    let bad = crystal::default_config().with_group(
        ParameterGroup::new(crystal::LIGHTS_GROUP)
            .with(Param::int("count", 7, 1, 12))
            .with(Param::float("radius", 0.05, 0.01, 0.1))
            .with(Param::float("ring_radius", 1.0, 0.5, 2.0))
            .with(Param::float("intensity", -0.5, -1.0, 1.0).with_effect(Effect::Intensity)),
    );
    let mut controller = RegenerationController::new(&mut setup.scene, &bad);
    let err = controller
        .on_parameter_change(crystal::LIGHTS_GROUP, &["count".to_string()])
        .unwrap_err();

    assert!(matches!(err, SceneError::InvalidParameter { .. }));
    assert_eq!(member_ids(&setup.scene, crystal::LIGHTS_RING), members);
    assert_eq!(sorted_names(&setup.scene), names);
    assert_eq!(setup.scene.live_geometry_count(), live);
    assert_eq!(setup.scene.released_geometry_total(), 0);
}

#[test]
fn test_unknown_group_is_rejected() {
    let mut setup = crystal_setup();
    let mut controller = RegenerationController::new(&mut setup.scene, &setup.config);
    let err = controller
        .on_parameter_change("petal", &["count".to_string()])
        .unwrap_err();
    assert_eq!(err, SceneError::UnknownGroup("petal".to_string()));
}

#[test]
fn test_apply_all_counts_failures_and_continues() {
    let mut setup = crystal_setup();
    setup.config.edit(crystal::CORE_GROUP, "detail", 1).unwrap();
    let mut changes = setup.config.drain_changes();
    changes.insert(
        0,
        parametric_scene::ParamChange {
            group: "nope".into(),
            keys: vec!["x".into()],
        },
    );

    let failures =
        RegenerationController::new(&mut setup.scene, &setup.config).apply_all(&changes);

    assert_eq!(failures, 1);
    assert_eq!(setup.scene.released_geometry_total(), 1);
}

// ============================================================================
// Flower
// ============================================================================

#[test]
fn test_petal_count_rebuilds_whole_ring() {
    let mut setup = flower_setup();
    let old_members = member_ids(&setup.scene, flower::PETAL_RING);
    assert_eq!(old_members.len(), 8);

    setup.config.edit(flower::PETAL_GROUP, "count", 3).unwrap();
    regenerate(&mut setup);

    assert_eq!(setup.scene.released_geometry_total(), 8);
    assert_angles(&member_angles(&setup.scene, flower::PETAL_RING), &[0.0, 120.0, 240.0]);
    assert!(old_members.iter().all(|id| !setup.scene.contains(*id)));
    assert!(setup.scene.find_by_name("petal.3").is_none());
    assert!(setup.scene.find_mesh("petal.2").is_ok());
    assert!(setup.scene.orphaned_names().is_empty());
    // stalk, bud, 3 petals, 5 leaves
    assert_eq!(setup.scene.live_geometry_count(), 10);
}

#[test]
fn test_petal_color_keeps_members() {
    let mut setup = flower_setup();
    let before = member_ids(&setup.scene, flower::PETAL_RING);

    let blue = Rgb::from_hex(0x0000ff);
    setup.config.set(flower::PETAL_GROUP, "color", blue).unwrap();
    regenerate(&mut setup);

    assert_eq!(member_ids(&setup.scene, flower::PETAL_RING), before);
    assert_eq!(setup.scene.released_geometry_total(), 0);
    for id in before {
        let mesh = setup.scene.get(id).and_then(|n| n.as_mesh()).unwrap();
        assert_eq!(mesh.material.color, blue);
    }
}

#[test]
fn test_stalk_height_moves_bud_and_petals() {
    let mut setup = flower_setup();
    let leaves = member_ids(&setup.scene, flower::LEAF_RING).len();

    setup.config.edit(flower::STALK_GROUP, "height", 40.0).unwrap();
    regenerate(&mut setup);

    let bud = setup.scene.lookup(flower::BUD).unwrap();
    let ring = setup.scene.lookup(flower::PETAL_RING).unwrap();
    // 40 / 2 + 6 - 1
    assert_eq!(setup.scene.transform(bud).unwrap().position, Vec3::new(0.0, 25.0, 0.0));
    assert_eq!(setup.scene.transform(ring).unwrap().position, Vec3::new(0.0, 25.0, 0.0));
    assert_eq!(member_ids(&setup.scene, flower::LEAF_RING).len(), leaves);
    assert!(setup.scene.orphaned_names().is_empty());
}

#[test]
fn test_stalk_radius_widens_leaf_ring() {
    let mut setup = flower_setup();
    setup.config.edit(flower::STALK_GROUP, "radius", 8.0).unwrap();
    regenerate(&mut setup);

    for id in member_ids(&setup.scene, flower::LEAF_RING) {
        let p = setup.scene.transform(id).unwrap().position;
        // leaf radius 6 + stalk radius 8
        assert!((p.length() - 14.0).abs() < 1e-4);
    }
}

#[test]
fn test_bud_radius_moves_petal_ring() {
    let mut setup = flower_setup();
    setup.config.edit(flower::BUD_GROUP, "radius", 8.0).unwrap();
    regenerate(&mut setup);

    let ring = setup.scene.lookup(flower::PETAL_RING).unwrap();
    assert_eq!(setup.scene.transform(ring).unwrap().position.y, 22.0);
    assert_eq!(member_ids(&setup.scene, flower::PETAL_RING).len(), 8);
    for id in member_ids(&setup.scene, flower::PETAL_RING) {
        let p = setup.scene.transform(id).unwrap().position;
        // petal 5 + bud 8 - overlap 2
        assert!((p.length() - 11.0).abs() < 1e-4);
    }
}

#[test]
fn test_leaf_speed_is_not_a_rebuild() {
    let mut setup = flower_setup();
    setup.config.set(flower::LEAF_GROUP, "speed", 0.05).unwrap();
    let changes = setup.config.drain_changes();

    let report = RegenerationController::new(&mut setup.scene, &setup.config)
        .apply(&changes[0])
        .unwrap();
    assert!(report.is_noop());
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut setup = flower_setup();
    setup.config.edit(flower::LEAF_GROUP, "count", 7).unwrap();
    let changes = setup.config.drain_changes();

    let mut controller = RegenerationController::new(&mut setup.scene, &setup.config);
    controller.apply(&changes[0]).unwrap();
    let first_names = sorted_names(&setup.scene);
    let first_angles = member_angles(&setup.scene, flower::LEAF_RING);

    let mut controller = RegenerationController::new(&mut setup.scene, &setup.config);
    let report = controller.apply(&changes[0]).unwrap();

    assert_eq!(report.rebuilt, 7);
    assert_eq!(report.released, 7);
    assert_eq!(sorted_names(&setup.scene), first_names);
    assert_eq!(member_angles(&setup.scene, flower::LEAF_RING), first_angles);
}

#[test]
fn test_regenerated_scene_matches_cold_build() {
    let mut setup = flower_setup();
    setup.config.edit(flower::PETAL_GROUP, "count", 5).unwrap();
    setup.config.edit(flower::STALK_GROUP, "height", 20.0).unwrap();
    regenerate(&mut setup);

    let cold = SceneKind::Flower.build(setup.config.clone()).unwrap();

    assert_eq!(sorted_names(&setup.scene), sorted_names(&cold.scene));
    assert_eq!(setup.scene.node_count(), cold.scene.node_count());
    for name in sorted_names(&cold.scene) {
        let a = setup.scene.lookup(&name).unwrap();
        let b = cold.scene.lookup(&name).unwrap();
        assert_eq!(setup.scene.transform(a), cold.scene.transform(b), "{name}");
        match (
            setup.scene.get(a).and_then(|n| n.as_mesh()),
            cold.scene.get(b).and_then(|n| n.as_mesh()),
        ) {
            (Some(x), Some(y)) => {
                assert!(x.geometry().same_shape(y.geometry()), "{name}");
                assert_eq!(x.material, y.material, "{name}");
            }
            (None, None) => {}
            _ => panic!("{name} changed kind"),
        }
    }
}
