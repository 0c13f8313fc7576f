use std::sync::Arc;

use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{
    error::Result,
    extractor::extract,
    mesh::Mesh as IsoMesh,
    settings::IsosurfaceSettings,
    skeleton::SkeletonNode,
};

/// System sets for the isosurface pipeline.
///
/// Use these to order your own systems relative to mesh generation:
///
/// ```rust,ignore
/// // Run after geometry is ready but before it's uploaded, e.g. for collider generation:
/// app.add_systems(Update, build_collider.after(IsosurfaceSet::Generate)
///                                       .before(IsosurfaceSet::Upload));
/// ```
///
/// ```text
/// IsosurfaceSet::Spawn  →  [async compute]  →  IsosurfaceSet::Generate
///                       →  [your systems]   →  IsosurfaceSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum IsosurfaceSet {
    /// Spawns an async compute task for each queued isosurface.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedMesh`] on completion.
    Generate,
    /// Uploads [`GeneratedMesh`] data into a Bevy [`Mesh3d`] and removes [`GeneratedMesh`].
    Upload,
}

/// An implicit surface defined by a skeleton.
///
/// The skeleton is shared through an [`Arc`] so the async build task can read it without
/// copying. Replacing the skeleton with [`update`](IsosurfaceObject::update) keeps the
/// settings, like [`Isosurface::update`](crate::extractor::Isosurface::update).
#[derive(Component, Clone, Debug)]
#[require(Transform)]
pub struct IsosurfaceObject {
    pub skeleton: Arc<[SkeletonNode]>,
    pub settings: IsosurfaceSettings,
}

impl IsosurfaceObject {
    pub fn new(skeleton: impl Into<Arc<[SkeletonNode]>>, settings: IsosurfaceSettings) -> Self {
        Self {
            skeleton: skeleton.into(),
            settings,
        }
    }

    /// Replaces the skeleton, keeping the current settings.
    pub fn update(&mut self, skeleton: impl Into<Arc<[SkeletonNode]>>) {
        self.skeleton = skeleton.into();
    }

    pub fn with_settings(mut self, settings: IsosurfaceSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Marker component added to [`IsosurfaceObject`] entities that are waiting to be built.
///
/// Removed automatically once the mesh has been generated and uploaded. Without the
/// `auto_queue` feature, insert it yourself to request a rebuild.
#[derive(Component)]
pub struct QueuedIsosurface;

/// Holds the in-flight async compute task for an [`IsosurfaceObject`].
///
/// Inserted by [`IsosurfaceSet::Spawn`], removed once the task completes
/// and [`GeneratedMesh`] has been inserted by [`IsosurfaceSet::Generate`].
#[derive(Component)]
pub struct ComputeTask(Task<Result<IsoMesh>>);

/// Mesh data ready for upload, in the layout Bevy expects.
#[derive(Component, Debug, Clone, Default)]
pub struct GeneratedMesh {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl From<&IsoMesh> for GeneratedMesh {
    fn from(mesh: &IsoMesh) -> Self {
        Self {
            vertices: mesh.positions_f32(),
            normals: mesh.normals_f32(),
            indices: mesh.indices(),
        }
    }
}

impl GeneratedMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Runtime configuration for the isosurface pipeline.
///
/// Inserted as a resource by [`IsosurfacePlugin`]. Modify it at any time to change behaviour:
///
/// ```rust,ignore
/// app.add_plugins(IsosurfacePlugin { max_tasks_per_frame: 8, ..default() });
///
/// // Or change it at runtime:
/// fn my_system(mut config: ResMut<IsosurfaceConfig>) {
///     config.max_tasks_per_frame = 1;
/// }
/// ```
#[derive(Resource)]
pub struct IsosurfaceConfig {
    /// Maximum number of async mesh tasks spawned per frame.
    ///
    /// Higher values build surfaces faster but may cause frame hitches when many are
    /// queued at once. Default: `4`.
    pub max_tasks_per_frame: usize,
}

impl Default for IsosurfaceConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
        }
    }
}

/// Bevy plugin that drives isosurface mesh generation.
///
/// With the `auto_queue` feature, any [`IsosurfaceObject`] that is added or changed is
/// rebuilt. Extraction runs on Bevy's `AsyncComputeTaskPool` so the main thread is never
/// blocked:
///
/// ```text
/// IsosurfaceObject added / changed
///   → QueuedIsosurface inserted     (queue_changed, stale ComputeTask dropped)
///   → ComputeTask spawned           (IsosurfaceSet::Spawn)
///   → [async compute runs]
///   → GeneratedMesh inserted        (IsosurfaceSet::Generate, once task completes)
///   → [your collider systems here]
///   → Mesh3d inserted               (IsosurfaceSet::Upload)
///   → QueuedIsosurface + GeneratedMesh removed
/// ```
pub struct IsosurfacePlugin {
    /// Initial value for [`IsosurfaceConfig::max_tasks_per_frame`].
    pub max_tasks_per_frame: usize,
}

impl Default for IsosurfacePlugin {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: IsosurfaceConfig::default().max_tasks_per_frame,
        }
    }
}

impl Plugin for IsosurfacePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(IsosurfaceConfig {
            max_tasks_per_frame: self.max_tasks_per_frame,
        })
        .configure_sets(
            Update,
            (
                IsosurfaceSet::Spawn,
                IsosurfaceSet::Generate,
                IsosurfaceSet::Upload,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                spawn_mesh_tasks.in_set(IsosurfaceSet::Spawn),
                poll_mesh_tasks.in_set(IsosurfaceSet::Generate),
                upload_mesh.in_set(IsosurfaceSet::Upload),
            ),
        );

        #[cfg(feature = "auto_queue")]
        app.add_systems(Update, queue_changed.before(IsosurfaceSet::Spawn));
    }
}

/// Queues every added or changed [`IsosurfaceObject`], dropping any task still building
/// the previous skeleton.
#[cfg(feature = "auto_queue")]
fn queue_changed(mut commands: Commands, query: Query<Entity, Changed<IsosurfaceObject>>) {
    for entity in query.iter() {
        commands
            .entity(entity)
            .insert(QueuedIsosurface)
            .remove::<ComputeTask>();
    }
}

/// Spawns async compute tasks for [`QueuedIsosurface`]s, up to
/// [`IsosurfaceConfig::max_tasks_per_frame`] per frame.
fn spawn_mesh_tasks(
    mut commands: Commands,
    config: Res<IsosurfaceConfig>,
    query: Query<(Entity, &IsosurfaceObject), (With<QueuedIsosurface>, Without<ComputeTask>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, object) in query.iter().take(config.max_tasks_per_frame) {
        // pointer bump only, the skeleton is not copied on the main thread
        let skeleton = Arc::clone(&object.skeleton);
        let settings = object.settings;

        let task = task_pool.spawn(async move { extract(&skeleton, settings) });

        commands.entity(entity).insert(ComputeTask(task));
    }
}

/// Polls in-flight [`ComputeTask`]s each frame and inserts [`GeneratedMesh`] on completion.
///
/// Non-blocking: tasks that haven't finished are skipped and retried next frame.
fn poll_mesh_tasks(mut commands: Commands, mut query: Query<(Entity, &mut ComputeTask)>) {
    for (entity, mut compute_task) in query.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut compute_task.0)) else {
            continue;
        };

        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<ComputeTask>();

        match result {
            Ok(mesh) => {
                if mesh.is_empty() {
                    debug!("{entity}: isosurface build produced no triangles");
                }
                entity_commands.insert(GeneratedMesh::from(&mesh));
            }
            Err(err) => {
                warn!("{entity}: isosurface build failed: {err}");
                entity_commands.remove::<QueuedIsosurface>();
            }
        }
    }
}

/// Uploads a [`GeneratedMesh`] into a Bevy [`Mesh3d`], then removes [`GeneratedMesh`] and
/// [`QueuedIsosurface`].
///
/// The three vertex data Vecs are **moved** into the Bevy mesh with no copies. An empty
/// result removes any previously uploaded mesh.
fn upload_mesh(
    mut commands: Commands,
    mut query: Query<(Entity, &mut GeneratedMesh), With<QueuedIsosurface>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, mut generated) in query.iter_mut() {
        let generated = std::mem::take(&mut *generated);
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<(GeneratedMesh, QueuedIsosurface)>();

        if generated.is_empty() {
            entity_commands.remove::<Mesh3d>();
            continue;
        }

        entity_commands.insert(Mesh3d(meshes.add(to_bevy_mesh(generated))));
    }
}

/// Converts generated mesh data into a Bevy triangle-list [`Mesh`].
pub fn to_bevy_mesh(generated: GeneratedMesh) -> Mesh {
    let mut bevy_mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );

    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, generated.vertices);
    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, generated.normals);
    bevy_mesh.insert_indices(Indices::U32(generated.indices));
    bevy_mesh
}
