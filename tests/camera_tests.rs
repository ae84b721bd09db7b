//! Camera tests
//!
//! Tests for:
//! - Activation and the eager view matrix update
//! - Projection matrices against glam's GL-convention builders
//! - Aspect ratio policies and viewport inheritance
//! - Construction from serialized settings

use glam::{Mat4, UVec2, Vec2, Vec3};
use helix::{AspectRatioPolicy, CameraSettings, ProjectionSettings, SceneError, World};
use std::f32::consts::FRAC_PI_3;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn camera_follows_its_parent() {
    let mut world = World::new();
    let scene = world.add_scene();
    let a = world.add_object(Some(scene));
    let camera = world.add_camera(Some(a));
    assert_eq!(world.activate_camera(camera, scene), Ok(true));

    world.set_transformation(a, translation(1.0, 0.0, 0.0));

    assert_eq!(world.active_camera(scene), Some(camera));
    assert!(!world.is_dirty(camera));
    let view = world.camera_matrix(camera).unwrap();
    assert!(view.abs_diff_eq(translation(1.0, 0.0, 0.0).inverse(), EPSILON));
}

#[test]
fn activation_is_idempotent() {
    let mut world = World::new();
    let scene = world.add_scene();
    let camera = world.add_camera(Some(scene));

    assert_eq!(world.activate_camera(camera, scene), Ok(true));
    assert_eq!(world.activate_camera(camera, scene), Ok(false));
    assert_eq!(world.active_camera(scene), Some(camera));
}

#[test]
fn activation_outside_scene_is_a_no_op() {
    let mut world = World::new();
    let scene = world.add_scene();
    let other = world.add_scene();
    let camera = world.add_camera(Some(other));

    assert_eq!(world.activate_camera(camera, scene), Ok(false));
    assert_eq!(world.active_camera(scene), None);
    assert_eq!(world.camera(camera).unwrap().active_scene(), None);
}

#[test]
fn activation_checks_kinds() {
    let mut world = World::new();
    let scene = world.add_scene();
    let plain = world.add_object(Some(scene));
    let camera = world.add_camera(Some(scene));

    assert_eq!(world.activate_camera(plain, scene), Err(SceneError::NotACamera(plain)));
    assert_eq!(world.activate_camera(camera, plain), Err(SceneError::NotAScene(plain)));

    world.remove(plain);
    assert_eq!(world.activate_camera(plain, scene), Err(SceneError::ObjectNotFound(plain)));
}

#[test]
fn switching_camera_hands_over_viewport() {
    let mut world = World::new();
    let scene = world.add_scene();
    let first = world.add_camera(Some(scene));
    let second = world.add_camera(Some(scene));
    world.camera_mut(first).unwrap().set_viewport(UVec2::new(1280, 720));
    world.activate_camera(first, scene).unwrap();

    world.activate_camera(second, scene).unwrap();

    assert_eq!(world.active_camera(scene), Some(second));
    assert_eq!(world.camera(second).unwrap().viewport(), UVec2::new(1280, 720));
    assert_eq!(world.camera(first).unwrap().active_scene(), None);
}

#[test]
fn camera_moved_to_another_scene_can_be_activated_there() {
    let mut world = World::new();
    let first = world.add_scene();
    let second = world.add_scene();
    let camera = world.add_camera(Some(first));
    world.activate_camera(camera, first).unwrap();

    assert!(world.set_parent(camera, Some(second)));
    assert_eq!(world.active_camera(first), None);

    assert_eq!(world.activate_camera(camera, second), Ok(true));
    assert_eq!(world.active_camera(second), Some(camera));
    assert_eq!(world.camera(camera).unwrap().active_scene(), Some(second));
}

#[test]
fn inactive_camera_matrix_is_lazy() {
    let mut world = World::new();
    let scene = world.add_scene();
    let holder = world.add_object(Some(scene));
    let camera = world.add_camera(Some(holder));

    world.set_transformation(holder, translation(0.0, 3.0, 0.0));
    world.set_transformation(camera, Mat4::from_rotation_y(FRAC_PI_3));

    let view = world.camera_matrix(camera).unwrap();
    let expected = (translation(0.0, 3.0, 0.0) * Mat4::from_rotation_y(FRAC_PI_3)).inverse();
    assert!(view.abs_diff_eq(expected, EPSILON));
    assert!(!world.is_dirty(holder));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn perspective_projection() {
    let mut world = World::new();
    let camera = world.add_camera(None);
    world.camera_mut(camera).unwrap().set_perspective(FRAC_PI_3, 0.1, 50.0);

    let data = world.camera(camera).unwrap();
    let expected = Mat4::perspective_rh_gl(FRAC_PI_3, 1.0, 0.1, 50.0);
    assert!(data.projection_matrix().abs_diff_eq(expected, EPSILON));
    assert_eq!(data.near(), 0.1);
    assert_eq!(data.far(), 50.0);
}

#[test]
fn orthographic_projection_maps_near_and_far() {
    let mut world = World::new();
    let camera = world.add_camera(None);
    world.camera_mut(camera).unwrap().set_orthographic(Vec2::new(4.0, 2.0), 1.0, 11.0);

    let projection = world.camera(camera).unwrap().projection_matrix();
    let near = projection.project_point3(Vec3::new(2.0, 1.0, -1.0));
    let far = projection.project_point3(Vec3::new(-2.0, -1.0, -11.0));
    assert!(near.abs_diff_eq(Vec3::new(1.0, 1.0, -1.0), EPSILON));
    assert!(far.abs_diff_eq(Vec3::new(-1.0, -1.0, 1.0), EPSILON));
}

#[test]
fn zero_viewport_uses_raw_projection() {
    let mut world = World::new();
    let camera = world.add_camera(None);
    let data = world.camera_mut(camera).unwrap();
    data.set_orthographic(Vec2::new(4.0, 2.0), 1.0, 11.0)
        .set_viewport(UVec2::ZERO);

    let data = world.camera(camera).unwrap();
    assert_eq!(data.projection_matrix(), data.raw_projection_matrix());
    assert!(data.projection_matrix().is_finite());
}

#[test]
fn policies_on_wide_viewport() {
    let cases = [
        (AspectRatioPolicy::NotPreserved, 1.0, 1.0),
        (AspectRatioPolicy::Extend, 0.5, 1.0),
        (AspectRatioPolicy::Clip, 1.0, 2.0),
    ];
    for (policy, x_scale, y_scale) in cases {
        let mut world = World::new();
        let camera = world.add_camera(None);
        world
            .camera_mut(camera)
            .unwrap()
            .set_orthographic(Vec2::splat(2.0), 1.0, 10.0)
            .set_aspect_ratio_policy(policy)
            .set_viewport(UVec2::new(800, 400));

        let projection = world.camera(camera).unwrap().projection_matrix();
        assert!((projection.x_axis.x - x_scale).abs() < EPSILON, "{policy:?}");
        assert!((projection.y_axis.y - y_scale).abs() < EPSILON, "{policy:?}");
    }
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn camera_from_json_settings() {
    let settings: CameraSettings = serde_json::from_str(
        r#"{
            "projection": { "type": "perspective", "fov_degrees": 60.0, "near": 0.5, "far": 200.0 },
            "aspect_ratio_policy": "not_preserved",
            "viewport": [320, 240]
        }"#,
    )
    .unwrap();

    let mut world = World::new();
    let scene = world.add_scene();
    let camera = world.add_camera_with_settings(Some(scene), &settings);

    let data = world.camera(camera).unwrap();
    assert_eq!(data.viewport(), UVec2::new(320, 240));
    assert_eq!(data.aspect_ratio_policy(), AspectRatioPolicy::NotPreserved);
    let expected = Mat4::perspective_rh_gl(60.0_f32.to_radians(), 1.0, 0.5, 200.0);
    assert!(data.projection_matrix().abs_diff_eq(expected, 1e-4));
}

#[test]
fn default_settings_round_trip() {
    let json = serde_json::to_string(&CameraSettings::default()).unwrap();
    let settings: CameraSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(settings, CameraSettings::default());
    assert!(matches!(
        settings.projection,
        ProjectionSettings::Perspective { fov_degrees, .. } if fov_degrees == 35.0
    ));
}
