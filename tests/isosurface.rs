use std::collections::HashSet;

use bevy_isosurface::{
    BlendingFunction, EdgeInterpolation, Isosurface, IsosurfaceError, IsosurfaceSettings, Mesh,
    SkeletonNode, extract,
    field::ScalarField,
    grid::VoxelGrid,
    skeleton::skeleton_bounds,
    types::{Point, Value, Vector},
};

fn settings(cube_size: Value, target_value: Value) -> IsosurfaceSettings {
    IsosurfaceSettings::new(cube_size, BlendingFunction::Spore, target_value)
}

fn unit_sphere() -> Vec<SkeletonNode> {
    vec![SkeletonNode::sphere(Point::origin(), 1.0)]
}

/// Radius at which a lone node of radius 1 reaches `threshold`.
fn iso_radius(threshold: Value) -> Value {
    let b = 2.0 + 10.0 * threshold;
    let s = (b - (b * b - 4.0 * (1.0 - threshold)).sqrt()) / 2.0;
    s.sqrt()
}

fn radii(mesh: &Mesh, center: Point) -> Vec<Value> {
    mesh.vertices.iter().map(|v| (v - center).norm()).collect()
}

fn mean(values: &[Value]) -> Value {
    values.iter().sum::<Value>() / values.len() as Value
}

fn assert_well_formed(mesh: &Mesh) {
    assert_eq!(mesh.normals.len(), mesh.vertices.len());

    let count = mesh.vertex_count() as u32;
    assert!(mesh.triangles.iter().flatten().all(|&i| i < count));

    let unique: HashSet<[u32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
        .collect();
    assert_eq!(unique.len(), mesh.vertex_count(), "duplicate vertex positions");

    assert!(
        mesh.normals
            .iter()
            .all(|n| (n.norm() - 1.0).abs() < 1e-4)
    );
}

#[test]
fn unit_sphere_matches_analytic_radius() {
    let mesh = extract(&unit_sphere(), settings(0.1, 0.5)).unwrap();
    assert_well_formed(&mesh);

    assert!((100..=160).contains(&mesh.vertex_count()), "{}", mesh.vertex_count());

    let radii = radii(&mesh, Point::origin());
    assert!(radii.iter().all(|r| (0.25..=0.29).contains(r)), "{radii:?}");

    let expected = iso_radius(0.5);
    assert!((mean(&radii) - expected).abs() < 0.05 * expected);
}

#[test]
fn unit_sphere_normals_point_outward() {
    let mesh = extract(&unit_sphere(), settings(0.1, 0.5)).unwrap();

    let outward = mesh
        .vertices
        .iter()
        .zip(&mesh.normals)
        .filter(|(v, n)| n.dot(&v.coords.normalize()) > 0.9)
        .count();
    assert!(outward * 100 >= mesh.vertex_count() * 95);
}

#[test]
fn face_winding_agrees_with_vertex_normals() {
    let mesh = extract(&unit_sphere(), settings(0.1, 0.5)).unwrap();

    for (tri, indices) in mesh.triangles.iter().enumerate() {
        let averaged: Vector = indices.iter().map(|&i| mesh.normals[i as usize]).sum();
        assert!(mesh.tri_normal(tri).dot(&averaged) > 0.0, "triangle {tri}");
    }
}

#[test]
fn empty_skeleton_gives_empty_mesh() {
    let mesh = extract(&[], settings(0.1, 0.5)).unwrap();

    assert!(mesh.vertices.is_empty());
    assert!(mesh.normals.is_empty());
    assert!(mesh.triangles.is_empty());
}

#[test]
fn large_sphere_scene_stays_inside_its_bounds() {
    let skeleton = [SkeletonNode::sphere(Point::origin(), 10.0)];
    let mesh = extract(&skeleton, settings(0.2, 0.8)).unwrap();
    assert_well_formed(&mesh);

    assert!(mesh.vertex_count() >= 100);
    let bounds = mesh.bounds().unwrap();
    for i in 0..3 {
        assert!(bounds.min[i] >= -10.5 && bounds.max[i] <= 10.5);
    }
    // the kernel falls off steeply for wide nodes, so the 0.8 level sits close to the center
    assert!(bounds.max.x < 1.0);
}

#[test]
fn coincident_spheres_blend_additively() {
    let doubled = [
        SkeletonNode::sphere(Point::origin(), 1.0),
        SkeletonNode::sphere(Point::origin(), 1.0),
    ];
    let blended = extract(&doubled, settings(0.1, 0.5)).unwrap();
    let halved = extract(&unit_sphere(), settings(0.1, 0.25)).unwrap();

    assert_eq!(blended.vertex_count(), halved.vertex_count());
    assert_eq!(blended.triangles, halved.triangles);
    for (a, b) in blended.vertices.iter().zip(&halved.vertices) {
        assert!((a - b).norm() < 1e-6);
    }

    let single = extract(&unit_sphere(), settings(0.1, 0.5)).unwrap();
    assert!(blended.vertex_count() > single.vertex_count());

    let radius = mean(&radii(&blended, Point::origin()));
    assert!((radius - iso_radius(0.25)).abs() < 0.01, "{radius}");
}

#[test]
fn sub_voxel_sphere_is_skipped() {
    let skeleton = [SkeletonNode::sphere(Point::origin(), 0.05)];
    let mesh = extract(&skeleton, settings(0.2, 0.5)).unwrap();

    assert!(mesh.is_empty());
    assert!(mesh.vertices.is_empty());
}

#[test]
fn triangles_are_bounded_by_cube_count() {
    let skeleton = [
        SkeletonNode::sphere(Point::origin(), 1.0),
        SkeletonNode::sphere(Point::new(1.2, 0.0, 0.0), 1.0),
    ];
    let cube_size = 0.1;
    let mesh = extract(&skeleton, settings(cube_size, 0.1)).unwrap();
    assert_well_formed(&mesh);

    let bounds = skeleton_bounds(&skeleton).unwrap();
    let [nx, ny, nz] = VoxelGrid::dimensions(&bounds, cube_size).unwrap();
    assert!(mesh.triangle_count() <= 5 * nx * ny * nz);
}

#[test]
fn refining_the_grid_adds_vertices() {
    let counts: Vec<usize> = [0.2, 0.1, 0.05]
        .into_iter()
        .map(|h| extract(&unit_sphere(), settings(h, 0.1)).unwrap().vertex_count())
        .collect();

    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    assert!(counts[0] > 0);
}

#[test]
fn translation_moves_the_surface() {
    let offset = Vector::new(0.5, -1.25, 3.0);
    let moved: Vec<SkeletonNode> = unit_sphere().iter().map(|n| n.translated(offset)).collect();

    let base = extract(&unit_sphere(), settings(0.125, 0.5)).unwrap();
    let shifted = extract(&moved, settings(0.125, 0.5)).unwrap();

    assert_eq!(base.vertex_count(), shifted.vertex_count());
    assert_eq!(base.triangles, shifted.triangles);
    for (a, b) in base.vertices.iter().zip(&shifted.vertices) {
        assert!((a + offset - b).norm() < 1e-4);
    }
    for (a, b) in base.normals.iter().zip(&shifted.normals) {
        assert!((a - b).norm() < 1e-3);
    }
}

#[test]
fn quarter_turn_about_z_rotates_the_surface() {
    let turn = |p: &Point| Point::new(-p.y, p.x, p.z);
    let skeleton = [
        SkeletonNode::sphere(Point::new(0.5, 0.0, 0.0), 1.0),
        SkeletonNode::sphere(Point::new(-0.25, 0.5, 0.0), 0.75),
    ];
    let rotated = [
        SkeletonNode::sphere(Point::new(0.0, 0.5, 0.0), 1.0),
        SkeletonNode::sphere(Point::new(-0.5, -0.25, 0.0), 0.75),
    ];

    let base = extract(&skeleton, settings(0.125, 0.1)).unwrap();
    let turned = extract(&rotated, settings(0.125, 0.1)).unwrap();

    assert_eq!(base.vertex_count(), turned.vertex_count());
    assert_eq!(base.triangle_count(), turned.triangle_count());

    for (v, n) in base.vertices.iter().zip(&base.normals) {
        let expected = turn(v);
        let (distance, nearest) = turned
            .vertices
            .iter()
            .enumerate()
            .map(|(i, w)| ((w - expected).norm(), i))
            .fold((Value::INFINITY, 0), |best, hit| if hit.0 < best.0 { hit } else { best });
        assert!(distance < 1e-4, "{v:?}");

        let turned_normal = Vector::new(-n.y, n.x, n.z);
        assert!((turned.normals[nearest] - turned_normal).norm() < 1e-3, "{v:?}");
    }
}

#[test]
fn threshold_on_a_grid_corner_keeps_vertices_unique() {
    let skeleton = [
        SkeletonNode::sphere(Point::new(-0.6, 0.0, 0.0), 1.0),
        SkeletonNode::sphere(Point::new(0.6, 0.0, 0.0), 1.0),
    ];
    let cube_size = 0.1;

    // the grid corner at the origin, halfway between the two nodes
    let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
    let bounds = skeleton_bounds(&skeleton).unwrap();
    let grid = VoxelGrid::sample(&field, &bounds, cube_size).unwrap();
    let (x, y, z) = (16, 10, 10);
    let threshold = grid.get(x, y, z);
    let corner = grid.position(x, y, z);
    assert!(corner.coords.norm() < 1e-5);
    assert!(grid.get(x - 1, y, z) > threshold && grid.get(x + 1, y, z) > threshold);

    let mesh = extract(&skeleton, settings(cube_size, threshold)).unwrap();
    assert_well_formed(&mesh);

    assert_eq!(mesh.vertices.iter().filter(|&&v| v == corner).count(), 1);
    assert!(mesh.triangles.iter().all(|&[a, b, c]| a != b && b != c && c != a));
}

#[test]
fn ratio_interpolation_stays_near_the_surface() {
    let mesh = extract(
        &unit_sphere(),
        settings(0.1, 0.5).with_interpolation(EdgeInterpolation::Ratio),
    )
    .unwrap();
    assert_well_formed(&mesh);

    let radii = radii(&mesh, Point::origin());
    assert!(radii.iter().all(|r| (0.24..=0.31).contains(r)), "{radii:?}");
}

#[test]
fn capsule_surface_follows_its_segment() {
    let skeleton = [SkeletonNode::capsule(
        Point::new(-1.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        1.0,
    )];
    let mesh = extract(&skeleton, settings(0.1, 0.5)).unwrap();
    assert_well_formed(&mesh);
    assert!(!mesh.is_empty());

    for v in &mesh.vertices {
        let distance = skeleton[0].distance_to(v);
        assert!((0.24..=0.30).contains(&distance), "{v:?} at {distance}");
    }

    let bounds = mesh.bounds().unwrap();
    assert!(bounds.max.x > 1.2 && bounds.min.x < -1.2);
}

#[test]
fn invalid_settings_are_rejected() {
    for cube_size in [0.0, -0.1, Value::NAN, Value::INFINITY] {
        let result = extract(&unit_sphere(), settings(cube_size, 0.5));
        assert!(matches!(result, Err(IsosurfaceError::InvalidCubeSize(_))));
    }

    assert_eq!(
        BlendingFunction::try_from(BlendingFunction::NONE),
        Err(IsosurfaceError::InvalidBlend(BlendingFunction::NONE))
    );
}

#[test]
fn rebuilding_replaces_previous_output() {
    let mut surface = Isosurface::new();
    let single = surface
        .build(&unit_sphere(), settings(0.1, 0.5))
        .unwrap()
        .vertex_count();

    let pair = [
        SkeletonNode::sphere(Point::origin(), 1.0),
        SkeletonNode::sphere(Point::new(1.2, 0.0, 0.0), 1.0),
    ];
    let blended = surface.update(&pair).unwrap().vertex_count();
    assert_ne!(single, blended);

    let again = surface.update(&unit_sphere()).unwrap();
    assert_eq!(again.vertex_count(), single);
}
