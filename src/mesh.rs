use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use gltf::mesh::Mode;
use std::f32::consts::{PI, TAU};
use std::path::Path;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position: position.to_array(), normal: normal.to_array(), uv: uv.to_array() }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: Option<MeshBounds>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

/// Unlit point primitives, used for starfields and point-cloud models.
#[derive(Clone, Debug)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub color: u32,
    pub point_size: f32,
}

/// Geometry pulled out of a glTF document.
#[derive(Clone, Debug)]
pub enum ImportedGeometry {
    Mesh(Mesh),
    Points(PointCloud),
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = MeshBounds::from_points(vertices.iter().map(|v| Vec3::from_array(v.position)));
        Self { vertices, indices, bounds }
    }

    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let phi = u * TAU;
                let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
                vertices.push(MeshVertex::new(normal * radius, normal, Vec2::new(u, 1.0 - v)));
            }
        }
        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                if ring != 0 {
                    indices.extend_from_slice(&[a, b, a + 1]);
                }
                if ring != rings - 1 {
                    indices.extend_from_slice(&[b, b + 1, a + 1]);
                }
            }
        }
        Self::new(vertices, indices)
    }
}

impl PointCloud {
    pub fn bounds(&self) -> Option<MeshBounds> {
        MeshBounds::from_points(self.positions.iter().copied())
    }
}

impl MeshBounds {
    /// Axis-aligned bounds of a point set, `None` when the set is empty.
    pub fn from_points(points: impl Iterator<Item = Vec3> + Clone) -> Option<Self> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;
        for point in points.clone() {
            min = min.min(point);
            max = max.max(point);
            any = true;
        }
        if !any {
            return None;
        }
        let center = (min + max) * 0.5;
        let radius = points.map(|point| (point - center).length()).fold(0.0_f32, f32::max);
        Some(MeshBounds { min, max, center, radius })
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }
}

/// Imports every triangle primitive of a glTF/GLB file into one mesh. Files that only carry
/// point primitives come back as a point cloud.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<ImportedGeometry> {
    let path_ref = path.as_ref();
    let (document, buffers, _images) =
        gltf::import(path_ref).with_context(|| format!("Failed to import glTF from {}", path_ref.display()))?;

    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut points: Vec<Vec3> = Vec::new();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions_iter) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<Vec3> = positions_iter.map(Vec3::from_array).collect();
            if positions.is_empty() {
                continue;
            }
            match primitive.mode() {
                Mode::Triangles => {}
                Mode::Points => {
                    points.extend(positions);
                    continue;
                }
                _ => continue,
            }

            let local_indices: Vec<u32> = reader
                .read_indices()
                .map(|read| read.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let mut normals: Vec<Vec3> = reader
                .read_normals()
                .map(|it| it.map(Vec3::from_array).collect())
                .unwrap_or_default();
            if normals.len() != positions.len() || normals.iter().all(|n| n.length_squared() == 0.0) {
                normals = compute_normals(&positions, &local_indices);
            }
            let tex_coords: Vec<Vec2> = reader
                .read_tex_coords(0)
                .map(|coords| coords.into_f32().map(Vec2::from_array).collect())
                .unwrap_or_default();

            let base_vertex = vertices.len() as u32;
            vertices.extend(positions.iter().enumerate().map(|(i, pos)| {
                let normal = normals.get(i).copied().unwrap_or(Vec3::Y).normalize_or_zero();
                let uv = tex_coords.get(i).copied().unwrap_or(Vec2::ZERO);
                MeshVertex::new(*pos, normal, uv)
            }));
            indices.extend(local_indices.iter().map(|idx| idx + base_vertex));
        }
    }

    if !vertices.is_empty() {
        return Ok(ImportedGeometry::Mesh(Mesh::new(vertices, indices)));
    }
    if !points.is_empty() {
        return Ok(ImportedGeometry::Points(PointCloud { positions: points, color: 0xffffff, point_size: 1.0 }));
    }
    Err(anyhow!("{} contains no triangle or point primitives", path_ref.display()))
}

fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }
        let normal = (positions[i1] - positions[i0]).cross(positions[i2] - positions[i0]);
        if normal.length_squared() > 0.0 {
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }
    }
    for normal in &mut normals {
        *normal = if normal.length_squared() > 0.0 { normal.normalize() } else { Vec3::Y };
    }
    normals
}
