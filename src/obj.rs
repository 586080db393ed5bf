//! Wavefront OBJ / MTL reader.
//!
//! Produces a [`RawMesh`]: flat position, normal and UV lists plus triangulated
//! faces grouped by `g`/`o` name. Reading never fails on content; malformed
//! lines and out-of-range indices are skipped and logged at debug level. Only an
//! unreadable OBJ file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3A, Vec4};
use log::{debug, warn};

use crate::error::{Error, Result};

/// Group name used for faces that appear before any `g` or `o` line.
pub const DEFAULT_GROUP: &str = "default";

/// Indices of one face corner into the [`RawMesh`] lists (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCorner {
    /// Index into [`RawMesh::positions`].
    pub position: usize,
    /// Index into [`RawMesh::uvs`], if the corner has one.
    pub uv: Option<usize>,
    /// Index into [`RawMesh::normals`], if the corner has one.
    pub normal: Option<usize>,
}

/// Triangle of a [`RawGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFace {
    /// Corners in file order.
    pub corners: [RawCorner; 3],
    /// Index into [`RawMesh::materials`] active when the face was read.
    pub material: Option<usize>,
}

/// Named set of faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGroup {
    /// Name from the `g` / `o` line.
    pub name: String,
    /// Triangulated faces.
    pub faces: Vec<RawFace>,
}

/// Material read from an MTL library.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMaterial {
    /// `newmtl` name.
    pub name: String,
    /// `Kd` diffuse color; white when absent.
    pub diffuse: Vec3A,
    /// `map_Kd` path, resolved against the library's directory.
    pub texture: Option<PathBuf>,
}

impl RawMaterial {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            diffuse: Vec3A::ONE,
            texture: None,
        }
    }
}

/// Parsed mesh data, not yet deduplicated or placed in a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// Positions with `w = 1`.
    pub positions: Vec<Vec4>,
    /// Normals with `w = 0`.
    pub normals: Vec<Vec4>,
    /// Texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Face groups in order of first appearance.
    pub groups: Vec<RawGroup>,
    /// Materials referenced by `usemtl` or declared by a library.
    pub materials: Vec<RawMaterial>,
}

impl RawMesh {
    /// Total number of triangles over all groups.
    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|g| g.faces.len()).sum()
    }

    /// Every face in group order.
    pub fn faces(&self) -> impl Iterator<Item = &RawFace> {
        self.groups.iter().flat_map(|g| g.faces.iter())
    }

    fn material_index(&mut self, name: &str) -> usize {
        match self.materials.iter().position(|m| m.name == name) {
            Some(index) => index,
            None => {
                self.materials.push(RawMaterial::named(name));
                self.materials.len() - 1
            }
        }
    }

    fn group_index(&mut self, name: &str) -> usize {
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(RawGroup {
                    name: name.to_owned(),
                    faces: Vec::new(),
                });
                self.groups.len() - 1
            }
        }
    }
}

/// Read an OBJ file and the MTL libraries it references.
pub fn read_obj(path: impl AsRef<Path>) -> Result<RawMesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mesh = parse_obj(&source, base_dir);
    debug!(
        "Read {}: {} positions, {} normals, {} uvs, {} faces in {} groups",
        path.display(),
        mesh.positions.len(),
        mesh.normals.len(),
        mesh.uvs.len(),
        mesh.face_count(),
        mesh.groups.len()
    );
    Ok(mesh)
}

/// Parse OBJ text. `mtllib` paths are resolved against `base_dir`.
pub fn parse_obj(source: &str, base_dir: &Path) -> RawMesh {
    let mut mesh = RawMesh::default();
    let mut group: Option<usize> = None;
    let mut material: Option<usize> = None;

    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => match parse_floats::<3>(&mut tokens) {
                Some([x, y, z]) => mesh.positions.push(Vec4::new(x, y, z, 1.0)),
                None => skip(number, line),
            },
            "vn" => match parse_floats::<3>(&mut tokens) {
                Some([x, y, z]) => mesh.normals.push(Vec4::new(x, y, z, 0.0)),
                None => skip(number, line),
            },
            "vt" => match parse_uv(&mut tokens) {
                Some(uv) => mesh.uvs.push(uv),
                None => skip(number, line),
            },
            "f" => match parse_polygon(tokens, &mesh) {
                Some(corners) => {
                    let index = match group {
                        Some(index) => index,
                        None => {
                            let index = mesh.group_index(DEFAULT_GROUP);
                            group = Some(index);
                            index
                        }
                    };
                    // Fan triangulation around the first corner
                    let faces = &mut mesh.groups[index].faces;
                    for pair in corners[1..].windows(2) {
                        faces.push(RawFace {
                            corners: [corners[0], pair[0], pair[1]],
                            material,
                        });
                    }
                }
                None => skip(number, line),
            },
            "g" | "o" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                let name = if name.is_empty() { DEFAULT_GROUP } else { &name };
                group = Some(mesh.group_index(name));
            }
            "usemtl" => match tokens.next() {
                Some(name) => material = Some(mesh.material_index(name)),
                None => skip(number, line),
            },
            "mtllib" => {
                for library in tokens {
                    read_mtl(&base_dir.join(library), &mut mesh);
                }
            }
            // Comments, smoothing groups and other statements carry nothing we render
            _ => {}
        }
    }
    mesh
}

/// Read an MTL library into `mesh.materials`; a missing library only warns.
fn read_mtl(path: &Path, mesh: &mut RawMesh) {
    match fs::read_to_string(path) {
        Ok(source) => {
            let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
            parse_mtl(&source, base_dir, mesh);
        }
        Err(e) => warn!("Failed to read material library {}: {}", path.display(), e),
    }
}

/// Parse MTL text into `mesh.materials`. Redeclared names update the existing entry.
pub fn parse_mtl(source: &str, base_dir: &Path, mesh: &mut RawMesh) {
    let mut current: Option<usize> = None;

    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match (keyword, current) {
            ("newmtl", _) => match tokens.next() {
                Some(name) => current = Some(mesh.material_index(name)),
                None => skip(number, line),
            },
            ("Kd", Some(index)) => match parse_floats::<3>(&mut tokens) {
                Some([r, g, b]) => mesh.materials[index].diffuse = Vec3A::new(r, g, b),
                None => skip(number, line),
            },
            // Options may precede the file name; it is always last
            ("map_Kd", Some(index)) => match tokens.last() {
                Some(file) => mesh.materials[index].texture = Some(base_dir.join(file)),
                None => skip(number, line),
            },
            ("Kd" | "map_Kd", None) => skip(number, line),
            _ => {}
        }
    }
}

fn skip(number: usize, line: &str) {
    debug!("Skipping malformed line {}: {}", number + 1, line);
}

fn parse_floats<'a, const N: usize>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; N]> {
    let mut values = [0.0; N];
    for value in &mut values {
        *value = tokens.next()?.parse().ok()?;
    }
    Some(values)
}

fn parse_uv<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Vec2> {
    let u = tokens.next()?.parse().ok()?;
    let v = match tokens.next() {
        Some(token) => token.parse().ok()?,
        None => 0.0,
    };
    Some(Vec2::new(u, v))
}

fn parse_polygon<'a>(tokens: impl Iterator<Item = &'a str>, mesh: &RawMesh) -> Option<Vec<RawCorner>> {
    let corners = tokens
        .map(|token| parse_corner(token, mesh))
        .collect::<Option<Vec<_>>>()?;
    (corners.len() >= 3).then_some(corners)
}

/// Parse `p`, `p/t`, `p//n` or `p/t/n`.
fn parse_corner(token: &str, mesh: &RawMesh) -> Option<RawCorner> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next()?, mesh.positions.len())?;
    let uv = match parts.next() {
        Some(part) if !part.is_empty() => Some(resolve_index(part, mesh.uvs.len())?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(part) if !part.is_empty() => Some(resolve_index(part, mesh.normals.len())?),
        _ => None,
    };
    Some(RawCorner {
        position,
        uv,
        normal,
    })
}

/// Map a 1-based (or negative, relative) OBJ index into `0..len`.
fn resolve_index(token: &str, len: usize) -> Option<usize> {
    let index: i64 = token.parse().ok()?;
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 -1
g quad
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD, Path::new(""));
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.positions[2], Vec4::new(1.0, 1.0, 0.0, 1.0));
        assert_eq!(mesh.normals[0], Vec4::new(0.0, 0.0, -1.0, 0.0));
        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.groups[0].name, "quad");

        let faces = &mesh.groups[0].faces;
        assert_eq!(faces.len(), 2);
        let positions = |f: &RawFace| f.corners.map(|c| c.position);
        assert_eq!(positions(&faces[0]), [0, 1, 2]);
        assert_eq!(positions(&faces[1]), [0, 2, 3]);
        assert_eq!(faces[1].corners[2].uv, Some(3));
        assert_eq!(faces[1].corners[2].normal, Some(0));
    }

    #[test]
    fn test_index_forms_and_negative_indices() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1 2 3\nf -3//1 -2//1 -1//1\n";
        let mesh = parse_obj(source, Path::new(""));
        let faces = &mesh.groups[0].faces;
        assert_eq!(mesh.groups[0].name, DEFAULT_GROUP);
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].corners[0].normal, None);
        assert_eq!(faces[1].corners.map(|c| c.position), [0, 1, 2]);
        assert_eq!(faces[1].corners[0].normal, Some(0));
        assert_eq!(faces[1].corners[0].uv, None);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let source = "v 0 0 0\nv 1 zero 0\nv 1 0 0\nv 0 1 0\nvt\nf 1 2 3\nf 1 2 9\nf 1 2\nusemtl\nf 0 1 2\n";
        let mesh = parse_obj(source, Path::new(""));
        assert_eq!(mesh.positions.len(), 3);
        assert!(mesh.uvs.is_empty());
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_groups_merge_by_name() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\ng a\nf 1 2 3\ng b\nf 1 2 3\ng a\nf 3 2 1\n";
        let mesh = parse_obj(source, Path::new(""));
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0].faces.len(), 2);
        assert_eq!(mesh.faces().count(), 3);
    }

    #[test]
    fn test_read_obj_with_material_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut mtl = fs::File::create(dir.path().join("scene.mtl")).unwrap();
        writeln!(mtl, "newmtl red\nKd 1 0 0\nnewmtl bricks\nKd 0.5 0.5 0.5\nmap_Kd -s 2 2 1 bricks.png").unwrap();
        let obj_path = dir.path().join("scene.obj");
        let mut obj = fs::File::create(&obj_path).unwrap();
        writeln!(obj, "mtllib scene.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl bricks\nf 1 2 3\nusemtl red\nf 3 2 1").unwrap();

        let mesh = read_obj(&obj_path).unwrap();
        assert_eq!(mesh.materials.len(), 2);
        assert_eq!(mesh.materials[0].name, "red");
        assert_eq!(mesh.materials[0].diffuse, Vec3A::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.materials[1].texture, Some(dir.path().join("bricks.png")));

        let faces = &mesh.groups[0].faces;
        assert_eq!(faces[0].material, Some(1));
        assert_eq!(faces[1].material, Some(0));
    }

    #[test]
    fn test_usemtl_without_library_defaults_to_white() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nmtllib missing.mtl\nusemtl ghost\nf 1 2 3\n";
        let mesh = parse_obj(source, Path::new("/nonexistent"));
        assert_eq!(mesh.materials, vec![RawMaterial::named("ghost")]);
        assert_eq!(mesh.groups[0].faces[0].material, Some(0));
    }

    #[test]
    fn test_missing_obj_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_obj(dir.path().join("nope.obj"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
