//! Material table and primary-ray shading.
//!
//! Surfaces carry an opaque [`MaterialId`]; the table resolves it to a diffuse
//! color and an optional texture sampled at the hit's texture coordinates.

use glam::Vec2;

use crate::hittable::HitRecord;
use crate::pixel_buffer::{Color, PixelBuffer, PixelColor};
use crate::ray::Ray;

/// Index of a material inside a [`MaterialTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Surface appearance.
#[derive(Debug, Clone)]
pub struct Material {
    /// Name used by scene descriptions and MTL files.
    pub name: String,
    /// Diffuse color, multiplied with the texture sample.
    pub diffuse: Color,
    /// Optional diffuse texture, addressed by wrapped texture coordinates.
    pub texture: Option<PixelBuffer>,
}

impl Material {
    /// Untextured material.
    pub fn new(name: impl Into<String>, diffuse: Color) -> Self {
        Self {
            name: name.into(),
            diffuse,
            texture: None,
        }
    }

    /// Attach a diffuse texture.
    pub fn with_texture(mut self, texture: PixelBuffer) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Unlit surface color at texture coordinates `uv`.
    pub fn base_color(&self, uv: Vec2) -> Color {
        match &self.texture {
            Some(texture) => self.diffuse * texture.color_at(uv.x, uv.y).to_color(),
            None => self.diffuse,
        }
    }
}

/// Append-only list of materials indexed by [`MaterialId`].
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its id.
    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Look up a material.
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Id of the first material called `name`.
    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(MaterialId)
    }

    /// Number of stored materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when no material has been added.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Shaded color of a primary-ray hit.
    ///
    /// Base color scaled by how squarely the ray meets the surface. Hits without
    /// a (known) material shade as white.
    pub fn shade(&self, hit: &HitRecord, ray: &Ray) -> PixelColor {
        let base = hit
            .material
            .and_then(|id| self.get(id))
            .map_or(Color::ONE, |m| m.base_color(hit.uv));
        let facing = ray.direction.normalize_or_zero().dot(hit.normal).abs();
        PixelColor::from_color(base * facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3A;

    fn hit(material: Option<MaterialId>, normal: Vec3A, uv: Vec2) -> HitRecord {
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
        HitRecord::new(&ray, 1.0, normal, uv, material)
    }

    #[test]
    fn test_find_by_name() {
        let mut table = MaterialTable::new();
        let red = table.add(Material::new("red", Color::X));
        let blue = table.add(Material::new("blue", Color::Z));
        assert_eq!(table.find("blue"), Some(blue));
        assert_eq!(table.find("red"), Some(red));
        assert_eq!(table.find("green"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_head_on_hit_gets_full_color() {
        let mut table = MaterialTable::new();
        let red = table.add(Material::new("red", Color::new(1.0, 0.0, 0.0)));
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
        let color = table.shade(&hit(Some(red), -Vec3A::Z, Vec2::ZERO), &ray);
        assert_eq!(color, PixelColor::new(255, 0, 0));
    }

    #[test]
    fn test_grazing_hit_is_darker_and_missing_material_is_white() {
        let table = MaterialTable::new();
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
        let tilted = Vec3A::new(0.0, 1.0, -1.0).normalize();
        let color = table.shade(&hit(Some(MaterialId(3)), tilted, Vec2::ZERO), &ray);
        assert_eq!(color, PixelColor::new(180, 180, 180));
    }

    #[test]
    fn test_texture_is_sampled_at_uv() {
        let texture = PixelBuffer::new(2, 1);
        texture.set_pixel(0.75, 0.0, PixelColor::new(0, 255, 0));
        let mut table = MaterialTable::new();
        let id = table.add(Material::new("checker", Color::ONE).with_texture(texture));
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);

        let right = table.shade(&hit(Some(id), -Vec3A::Z, Vec2::new(0.75, 0.5)), &ray);
        assert_eq!(right, PixelColor::new(0, 255, 0));
        // Wraps around to the same texel
        let wrapped = table.shade(&hit(Some(id), -Vec3A::Z, Vec2::new(1.75, 0.5)), &ray);
        assert_eq!(wrapped, right);
        let left = table.shade(&hit(Some(id), -Vec3A::Z, Vec2::new(0.25, 0.5)), &ray);
        assert_eq!(left, PixelColor::BLACK);
    }
}
