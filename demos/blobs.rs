use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_isosurface::{
    IsosurfacePlugin, IsosurfaceSettings, SkeletonNode,
    plugin::{IsosurfaceObject, IsosurfaceSet},
    types::Point,
};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

#[derive(Resource)]
struct RebuildTimer(Timer);

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            IsosurfacePlugin {
                max_tasks_per_frame: 1,
            },
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
        ))
        .insert_resource(RebuildTimer(Timer::from_seconds(0.25, TimerMode::Repeating)))
        .add_systems(Startup, setup)
        .add_systems(Update, animate.before(IsosurfaceSet::Spawn))
        .run();
}

/// Three spheres orbiting a capsule, at animation time `t`.
fn blobs(t: f32) -> Vec<SkeletonNode> {
    let mut skeleton = vec![SkeletonNode::capsule(
        Point::new(-1.5, 0.0, 0.0),
        Point::new(1.5, 0.0, 0.0),
        1.5,
    )];

    skeleton.extend((0..3).map(|i| {
        let angle = t + i as f32 * std::f32::consts::TAU / 3.0;
        SkeletonNode::sphere(
            Point::new(1.5 * angle.cos(), 1.5 * angle.sin(), 0.5 * (2.0 * angle).sin()),
            1.5,
        )
    }));

    skeleton
}

fn setup(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 100.0,
            ..Default::default()
        },
        ..Default::default()
    });

    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(4., 3., 4.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    commands.spawn((
        IsosurfaceObject::new(
            blobs(0.0),
            IsosurfaceSettings::default()
                .with_cube_size(0.05)
                .with_target_value(0.1),
        ),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.5, 0.9),
            ..Default::default()
        })),
    ));
}

/// Replaces every skeleton on a fixed period; the plugin rebuilds the changed surfaces.
fn animate(
    time: Res<Time>,
    mut timer: ResMut<RebuildTimer>,
    mut objects: Query<&mut IsosurfaceObject>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    for mut object in objects.iter_mut() {
        object.update(blobs(time.elapsed_secs()));
    }
}
