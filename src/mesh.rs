//! Indexed triangle mesh.
//!
//! Built from a [`RawMesh`]: vertices are expanded per face corner in parallel,
//! then deduplicated through a shared table keyed on their exact bit patterns.
//! Intersection runs in model space by mapping the ray through the inverse
//! transform; the direction is not renormalized, so `t` is the same in both spaces.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::path::Path;
use std::sync::Mutex;

use glam::{Vec2, Vec3A};
use log::{debug, info};
use rayon::prelude::*;

use crate::camera::{Camera, ScreenRect};
use crate::error::Result;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::intersect::{intersect_triangle, TriangleHit};
use crate::material::{Material, MaterialId, MaterialTable};
use crate::obj::{read_obj, RawCorner, RawFace, RawMesh};
use crate::pixel_buffer::PixelBuffer;
use crate::ray::Ray;
use crate::transform::Transform;

/// Mesh vertex in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position.
    pub position: Vec3A,
    /// Unit shading normal.
    pub normal: Vec3A,
    /// Texture-space tangent of the face the vertex was built for.
    pub tangent: Vec3A,
    /// Texture coordinates.
    pub uv: Vec2,
}

/// Structural identity of a [`Vertex`]: the bit pattern of every component.
///
/// Two vertices share a key exactly when all their fields are bitwise equal, so
/// the dedup table never merges distinct vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey([u32; 11]);

impl From<&Vertex> for VertexKey {
    fn from(v: &Vertex) -> Self {
        let p = v.position.to_array();
        let n = v.normal.to_array();
        let t = v.tangent.to_array();
        let uv = v.uv.to_array();
        VertexKey(
            [
                p[0], p[1], p[2], n[0], n[1], n[2], t[0], t[1], t[2], uv[0], uv[1],
            ]
            .map(f32::to_bits),
        )
    }
}

/// Triangle referencing three entries of [`Mesh::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices.
    pub vertices: [u32; 3],
    /// Material from the source file, if any.
    pub material: Option<MaterialId>,
}

/// [`VertexKey`] paired with its hash, computed before the table is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HashedKey {
    hash: u64,
    key: VertexKey,
}

impl HashedKey {
    fn new(state: &RandomState, key: VertexKey) -> Self {
        Self {
            hash: state.hash_one(key),
            key,
        }
    }
}

impl Hash for HashedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Passes a precomputed `u64` through unchanged.
#[derive(Default)]
struct PassThroughHasher(u64);

impl Hasher for PassThroughHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

/// Dedup table. Lookups only compare keys; hashing happens before locking.
#[derive(Default)]
struct VertexTable {
    index: HashMap<HashedKey, u32, BuildHasherDefault<PassThroughHasher>>,
    vertices: Vec<Vertex>,
}

impl VertexTable {
    fn insert(&mut self, key: HashedKey, vertex: Vertex) -> u32 {
        let vertices = &mut self.vertices;
        *self.index.entry(key).or_insert_with(|| {
            vertices.push(vertex);
            (vertices.len() - 1) as u32
        })
    }
}

/// Triangle mesh surface.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    /// Model-space bounding box (min, max).
    bounds: (Vec3A, Vec3A),
    /// Model-to-world placement.
    pub transform: Transform,
    /// Material for faces that carry none of their own.
    pub material: Option<MaterialId>,
}

impl Mesh {
    /// Build a mesh from parsed data.
    ///
    /// `materials[i]` is the table id of `raw.materials[i]`; faces whose raw
    /// material has no entry get no material. Faces with a corner index outside
    /// the raw position, normal or UV lists are skipped.
    pub fn from_raw(raw: &RawMesh, materials: &[MaterialId]) -> Self {
        let state = RandomState::new();
        let table = Mutex::new(VertexTable::default());
        let raw_faces: Vec<&RawFace> = raw.faces().collect();

        let faces: Vec<Face> = raw_faces
            .par_iter()
            .enumerate()
            .filter_map(|(index, face)| {
                let Some(corners) = face_vertices(raw, face) else {
                    debug!("Skipping face {}: corner index out of range", index);
                    return None;
                };
                let keys = corners
                    .each_ref()
                    .map(|v| HashedKey::new(&state, VertexKey::from(v)));

                let mut table = table.lock().unwrap_or_else(|e| e.into_inner());
                let vertices = [0, 1, 2].map(|i| table.insert(keys[i], corners[i]));
                Some(Face {
                    vertices,
                    material: face.material.and_then(|m| materials.get(m).copied()),
                })
            })
            .collect();

        let vertices = table.into_inner().unwrap_or_else(|e| e.into_inner()).vertices;
        let bounds = bounding_box(&vertices);

        Self {
            vertices,
            faces,
            bounds,
            transform: Transform::default(),
            material: None,
        }
    }

    /// Read an OBJ file, register its materials in `materials` and build the mesh.
    pub fn load(path: impl AsRef<Path>, materials: &mut MaterialTable) -> Result<Self> {
        let path = path.as_ref();
        let raw = read_obj(path)?;

        let ids: Vec<MaterialId> = raw
            .materials
            .iter()
            .map(|m| {
                let mut material = Material::new(m.name.clone(), m.diffuse);
                if let Some(texture) = &m.texture {
                    material = material.with_texture(PixelBuffer::load_or_missing(texture));
                }
                materials.add(material)
            })
            .collect();

        let mesh = Self::from_raw(&raw, &ids);
        info!(
            "Loaded mesh {} ({} faces, {} unique vertices, {} materials)",
            path.display(),
            mesh.faces.len(),
            mesh.vertices.len(),
            ids.len()
        );
        Ok(mesh)
    }

    /// Assign the fallback material.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Deduplicated vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Faces in source order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Model-space bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3A, Vec3A) {
        self.bounds
    }

    fn corners(&self, face: &Face) -> [&Vertex; 3] {
        face.vertices.map(|i| &self.vertices[i as usize])
    }
}

/// Expand the three corners of a raw face, computing the shared face tangent.
///
/// Returns `None` when a corner references a missing position, normal or UV.
fn face_vertices(raw: &RawMesh, face: &RawFace) -> Option<[Vertex; 3]> {
    let position = |c: &RawCorner| {
        raw.positions
            .get(c.position)
            .map(|p| Vec3A::from(p.truncate()))
    };
    let uv = |c: &RawCorner| match c.uv {
        Some(i) => raw.uvs.get(i).copied(),
        None => Some(Vec2::ZERO),
    };
    let raw_normal = |c: &RawCorner| match c.normal {
        Some(i) => raw.normals.get(i).map(|n| Some(Vec3A::from(n.truncate()))),
        None => Some(None),
    };
    let [c0, c1, c2] = &face.corners;

    let (p0, p1, p2) = (position(c0)?, position(c1)?, position(c2)?);
    let (uv0, uv1, uv2) = (uv(c0)?, uv(c1)?, uv(c2)?);
    let (n0, n1, n2) = (raw_normal(c0)?, raw_normal(c1)?, raw_normal(c2)?);

    let delta_pos1 = p1 - p0;
    let delta_pos2 = p2 - p0;
    let delta_uv1 = uv1 - uv0;
    let delta_uv2 = uv2 - uv0;

    let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
    let inv_det = if det == 0.0 { 0.0 } else { 1.0 / det };
    let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * inv_det;

    let geometric = delta_pos1.cross(delta_pos2).normalize_or_zero();
    let normal = |n: Option<Vec3A>| n.map_or(geometric, Vec3A::normalize_or_zero);

    Some(
        [(n0, p0, uv0), (n1, p1, uv1), (n2, p2, uv2)].map(|(n, position, uv)| Vertex {
            position,
            normal: normal(n),
            tangent,
            uv,
        }),
    )
}

fn bounding_box(vertices: &[Vertex]) -> (Vec3A, Vec3A) {
    if vertices.is_empty() {
        return (Vec3A::ZERO, Vec3A::ZERO);
    }
    vertices.iter().fold(
        (Vec3A::splat(f32::INFINITY), Vec3A::splat(f32::NEG_INFINITY)),
        |(min, max), v| (min.min(v.position), max.max(v.position)),
    )
}

impl Hittable for Mesh {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let inverse = self.transform.inverse();
        let local = Ray::new(
            inverse.transform_point3a(r.origin),
            inverse.transform_vector3a(r.direction),
        );

        let mut window = ray_t;
        let mut nearest: Option<(TriangleHit, &Face)> = None;
        for face in &self.faces {
            let [a, b, c] = self.corners(face);
            if let Some(hit) = intersect_triangle(&local, a.position, b.position, c.position) {
                if window.surrounds(hit.t) {
                    window = window.up_to(hit.t);
                    nearest = Some((hit, face));
                }
            }
        }

        let (hit, face) = nearest?;
        let [a, b, c] = self.corners(face);
        let mut normal = hit.interpolate(a.normal, b.normal, c.normal);
        if normal.length_squared() < 1e-12 {
            normal = (b.position - a.position).cross(c.position - a.position);
        }
        let uv = hit.interpolate(a.uv, b.uv, c.uv);

        Some(HitRecord::new(
            r,
            hit.t,
            self.transform.normal_to_world(normal),
            uv,
            face.material.or(self.material),
        ))
    }

    fn screen_bounds(&self, camera: &Camera) -> Option<ScreenRect> {
        if self.faces.is_empty() {
            return None;
        }
        let (min, max) = self.bounds;
        let matrix = self.transform.matrix();
        let corners = (0..8).map(|i| {
            let pick = |bit: usize, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
            let corner = Vec3A::new(
                pick(1, min.x, max.x),
                pick(2, min.y, max.y),
                pick(4, min.z, max.z),
            );
            matrix.transform_point3a(corner)
        });
        camera.screen_bounds(corners)
    }
}
