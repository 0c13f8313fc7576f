use bevy::{
    pbr::wireframe::{Wireframe, WireframePlugin},
    prelude::*,
};
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_isosurface::{
    BlendingFunction, IsosurfacePlugin, IsosurfaceSettings, SkeletonNode,
    plugin::IsosurfaceObject, types::Point,
};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            IsosurfacePlugin::default(),
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
            WireframePlugin::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (rebuild_on_key, log_mesh))
        .run();
}

fn skeleton() -> Vec<SkeletonNode> {
    vec![SkeletonNode::sphere(Point::origin(), 10.0)]
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
        Transform::from_xyz(2., 2., 2.).looking_at(Vec3::ZERO, Vec3::Y),
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
            skeleton(),
            IsosurfaceSettings::new(0.2, BlendingFunction::Spore, 0.8),
        ),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.8, 0.3, 0.2),
            ..Default::default()
        })),
        Wireframe,
    ));
}

/// Press R to rebuild the surface with the same settings.
fn rebuild_on_key(keys: Res<ButtonInput<KeyCode>>, mut objects: Query<&mut IsosurfaceObject>) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    for mut object in objects.iter_mut() {
        object.update(skeleton());
    }
}

fn log_mesh(meshes: Res<Assets<Mesh>>, query: Query<(Entity, &Mesh3d), Changed<Mesh3d>>) {
    for (entity, handle) in query.iter() {
        if let Some(mesh) = meshes.get(handle) {
            info!("{entity}: {} vertices", mesh.count_vertices());
        }
    }
}
