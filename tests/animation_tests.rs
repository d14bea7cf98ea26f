use glam::Vec3;
use parametric_scene::camera::Camera;
use parametric_scene::scene::{SceneGraph, ROOT_NAME};
use parametric_scene::scenes::{crystal, flower};
use parametric_scene::traits::RenderSurface;
use parametric_scene::{SceneError, SceneKind, SceneSetup};

/// Mock surface that counts draws and can be told to fail
#[derive(Default)]
struct CountingSurface {
    renders: usize,
    fail: bool,
}

impl RenderSurface for CountingSurface {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, _scene: &SceneGraph, _camera: &Camera) -> parametric_scene::Result<()> {
        self.renders += 1;
        if self.fail {
            Err(SceneError::Surface("lost".to_string()))
        } else {
            Ok(())
        }
    }
}

fn crystal_setup() -> SceneSetup {
    SceneKind::Crystal.build(crystal::default_config()).unwrap()
}

fn rotation(setup: &SceneSetup, name: &str) -> Vec3 {
    let id = setup.scene.lookup(name).unwrap();
    setup.scene.transform(id).unwrap().rotation
}

fn tick(setup: &mut SceneSetup, surface: &mut CountingSurface) -> parametric_scene::FrameReport {
    let SceneSetup {
        scene,
        config,
        driver,
        camera,
        ..
    } = setup;
    driver.tick(scene, config, surface, camera)
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn test_light_ring_spins_every_frame() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    for _ in 0..3 {
        tick(&mut setup, &mut surface);
    }

    assert!(approx(rotation(&setup, crystal::LIGHTS_RING), Vec3::splat(0.09)));
    assert_eq!(rotation(&setup, crystal::CORE), Vec3::ZERO, "Idle core stays still");
}

#[test]
fn test_core_spins_only_after_activity() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    setup.driver.signal_activity();
    let report = tick(&mut setup, &mut surface);
    assert!(report.active);
    assert_eq!(report.spun, 2);
    assert!(approx(rotation(&setup, crystal::CORE), Vec3::splat(0.03)));

    // the signal is consumed by the frame that saw it
    let report = tick(&mut setup, &mut surface);
    assert!(!report.active);
    assert_eq!(report.spun, 1);
    assert!(approx(rotation(&setup, crystal::CORE), Vec3::splat(0.03)));
}

#[test]
fn test_repeated_activity_counts_once_per_frame() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    for _ in 0..10 {
        setup.driver.signal_activity();
    }
    tick(&mut setup, &mut surface);

    assert!(approx(rotation(&setup, crystal::CORE), Vec3::splat(0.03)));
    assert!(!setup.driver.activity_pending());
}

#[test]
fn test_exactly_one_render_per_tick() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    for frame in 1..=4 {
        setup.driver.signal_activity();
        let report = tick(&mut setup, &mut surface);
        assert!(report.rendered);
        assert_eq!(report.frame, frame);
    }
    assert_eq!(surface.renders, 4);
}

#[test]
fn test_speed_is_read_every_frame() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    tick(&mut setup, &mut surface);
    setup.config.set(crystal::MOTION_GROUP, "speed", 0.0).unwrap();
    tick(&mut setup, &mut surface);

    assert!(approx(rotation(&setup, crystal::LIGHTS_RING), Vec3::splat(0.03)));
    assert!(approx(
        setup.driver.accumulated_rotation(crystal::LIGHTS_RING).unwrap(),
        Vec3::splat(0.03)
    ));
}

#[test]
fn test_phase_accumulates_speed() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();

    let mut last = None;
    for _ in 0..5 {
        last = Some(tick(&mut setup, &mut surface));
    }

    let report = last.unwrap();
    assert!((report.phase - 0.15).abs() < 1e-5);
    assert_eq!(setup.driver.state().frame, 5);
}

#[test]
fn test_missing_node_is_skipped() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface::default();
    let core = setup.scene.lookup(crystal::CORE).unwrap();
    setup.scene.remove_child(ROOT_NAME, core).unwrap();

    setup.driver.signal_activity();
    let report = tick(&mut setup, &mut surface);

    assert_eq!(report.spun, 1);
    assert!(report.rendered);
    assert_eq!(surface.renders, 1);
}

#[test]
fn test_render_failure_does_not_stop_the_loop() {
    let mut setup = crystal_setup();
    let mut surface = CountingSurface {
        fail: true,
        ..Default::default()
    };

    let first = tick(&mut setup, &mut surface);
    let second = tick(&mut setup, &mut surface);

    assert!(!first.rendered);
    assert!(!second.rendered);
    assert_eq!(second.frame, 2);
    assert!(approx(rotation(&setup, crystal::LIGHTS_RING), Vec3::splat(0.06)));
}

#[test]
fn test_flower_leaf_ring_spins_about_z() {
    let mut setup = SceneKind::Flower.build(flower::default_config()).unwrap();
    let mut surface = CountingSurface::default();
    let start = rotation(&setup, flower::LEAF_RING);

    tick(&mut setup, &mut surface);
    tick(&mut setup, &mut surface);

    let delta = rotation(&setup, flower::LEAF_RING) - start;
    assert!(approx(delta, Vec3::new(0.0, 0.0, 0.02)));
}
