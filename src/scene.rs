//! Scene: cameras, surfaces, materials and the canvas they are drawn on.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use glam::Vec3A;
use image::RgbImage;
use log::info;

use crate::camera::Camera;
use crate::canvas::{Canvas, RenderOptions, RenderStats};
use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::material::{Material, MaterialId, MaterialTable};
use crate::mesh::Mesh;
use crate::pixel_buffer::PixelBuffer;
use crate::plane::Plane;
use crate::sphere::Sphere;
use crate::surface::Surface;

/// Index of a camera inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub usize);

/// Everything needed to render frames.
#[derive(Debug, Clone)]
pub struct Scene {
    cameras: Vec<Camera>,
    active: CameraId,
    surfaces: Vec<Surface>,
    materials: MaterialTable,
    canvas: Canvas,
    /// Switches used by [`Scene::render_frame`].
    pub options: RenderOptions,
}

impl Scene {
    /// Empty scene with a `width` x `height` canvas and one camera at the origin
    /// looking down +Z with a 90° field of view.
    pub fn new(width: usize, height: usize) -> Self {
        let canvas = Canvas::new(width, height);
        let camera = Camera::new(FRAC_PI_2, canvas.aspect(), Vec3A::ZERO);
        Self {
            cameras: vec![camera],
            active: CameraId(0),
            surfaces: Vec::new(),
            materials: MaterialTable::new(),
            canvas,
            options: RenderOptions::default(),
        }
    }

    /// Build a scene from a parsed description.
    ///
    /// Relative texture and model paths are resolved against `base_dir`. Surfaces
    /// naming an undeclared material fail with [`Error::UnknownMaterial`].
    pub fn from_config(config: &SceneConfig, base_dir: &Path) -> Result<Self> {
        let mut scene = Self::new(config.render.width as usize, config.render.height as usize);
        scene.options = config.render.options();

        let cam = &config.camera;
        scene.cameras[0] = Camera::looking(
            cam.fov.to_radians(),
            scene.canvas.aspect(),
            Vec3A::from_array(cam.position),
            Vec3A::from_array(cam.forward),
        )
        .with_clip(cam.near, cam.far);

        for material in &config.materials {
            let mut entry = Material::new(material.name.clone(), Vec3A::from_array(material.color));
            if let Some(texture) = &material.texture {
                entry = entry.with_texture(PixelBuffer::load_or_missing(base_dir.join(texture)));
            }
            scene.materials.add(entry);
        }

        for sphere in &config.spheres {
            let material = scene.resolve_material(sphere.material.as_deref())?;
            let mut surface = Sphere::new(sphere.radius, Vec3A::from_array(sphere.center));
            surface.material = material;
            scene.add_surface(surface);
        }

        for plane in &config.planes {
            let material = scene.resolve_material(plane.material.as_deref())?;
            let mut surface = Plane::new(plane.distance, Vec3A::from_array(plane.normal));
            surface.material = material;
            scene.add_surface(surface);
        }

        for entry in &config.meshes {
            let material = scene.resolve_material(entry.material.as_deref())?;
            let mut mesh = Mesh::load(base_dir.join(&entry.path), &mut scene.materials)?;
            let [sx, sy, sz] = entry.scale;
            let [rx, ry, rz] = entry.rotate.map(f32::to_radians);
            let [tx, ty, tz] = entry.translate;
            mesh.transform.set_scale(sx, sy, sz);
            mesh.transform.rotate(rx, ry, rz);
            mesh.transform.translate(tx, ty, tz);
            mesh.material = material;
            scene.add_surface(mesh);
        }

        info!(
            "Scene built: {} surfaces, {} materials",
            scene.surfaces.len(),
            scene.materials.len()
        );
        Ok(scene)
    }

    fn resolve_material(&self, name: Option<&str>) -> Result<Option<MaterialId>> {
        name.map(|name| {
            self.materials
                .find(name)
                .ok_or_else(|| Error::UnknownMaterial(name.to_owned()))
        })
        .transpose()
    }

    /// Add a camera and make it the active one.
    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        self.cameras.push(camera);
        self.active = CameraId(self.cameras.len() - 1);
        self.active
    }

    /// Select the camera used by [`Scene::render_frame`].
    pub fn set_active_camera(&mut self, id: CameraId) -> Result<()> {
        if id.0 >= self.cameras.len() {
            return Err(Error::UnknownCamera(id.0));
        }
        self.active = id;
        Ok(())
    }

    /// Id of the active camera.
    pub fn active_camera_id(&self) -> CameraId {
        self.active
    }

    /// Camera by id.
    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id.0)
    }

    /// The camera frames are rendered from.
    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active.0]
    }

    /// Mutable access to the active camera, e.g. to move it between frames.
    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active.0]
    }

    /// Add a surface; returns its index in [`Scene::surfaces`].
    pub fn add_surface(&mut self, surface: impl Into<Surface>) -> usize {
        self.surfaces.push(surface.into());
        self.surfaces.len() - 1
    }

    /// Load an OBJ model as a mesh surface.
    pub fn add_model(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let mesh = Mesh::load(path, &mut self.materials)?;
        Ok(self.add_surface(mesh))
    }

    /// All surfaces, in insertion order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Mutable surfaces, e.g. to move them between frames.
    pub fn surfaces_mut(&mut self) -> &mut [Surface] {
        &mut self.surfaces
    }

    /// Material table shared by every surface.
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Mutable material table.
    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    /// Canvas holding the last frame.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Render one frame from the active camera.
    pub fn render_frame(&self) -> RenderStats {
        self.canvas
            .render(self.active_camera(), &self.surfaces, &self.materials, &self.options)
    }

    /// Copy the last frame into caller memory, byte for byte.
    pub fn resolve_to_bitmap(&self, dst: &mut [u8]) -> Result<()> {
        self.canvas.resolve_to_bitmap(dst)
    }

    /// Last frame as a top-down RGB image.
    pub fn to_image(&self) -> RgbImage {
        self.canvas.to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MaterialConfig, SphereConfig};

    #[test]
    fn test_cameras() {
        let mut scene = Scene::new(8, 4);
        assert_eq!(scene.active_camera_id(), CameraId(0));
        assert!((scene.active_camera().aspect() - 2.0).abs() < 1e-6);

        let id = scene.add_camera(Camera::new(1.0, 2.0, Vec3A::ONE));
        assert_eq!(id, CameraId(1));
        assert_eq!(scene.active_camera().position(), Vec3A::ONE);

        scene.set_active_camera(CameraId(0)).unwrap();
        assert_eq!(scene.active_camera().position(), Vec3A::ZERO);
        assert!(matches!(
            scene.set_active_camera(CameraId(5)),
            Err(Error::UnknownCamera(5))
        ));
        assert_eq!(scene.active_camera_id(), CameraId(0));
    }

    #[test]
    fn test_from_config_resolves_materials() {
        let config = SceneConfig {
            materials: vec![MaterialConfig {
                name: "red".into(),
                color: [1.0, 0.0, 0.0],
                texture: None,
            }],
            spheres: vec![SphereConfig {
                center: [0.0, 0.0, 5.0],
                material: Some("red".into()),
                ..SphereConfig::default()
            }],
            ..SceneConfig::default()
        };
        let scene = Scene::from_config(&config, Path::new(".")).unwrap();
        assert_eq!(scene.surfaces().len(), 1);
        assert_eq!(scene.surfaces()[0].material(), scene.materials().find("red"));
        assert_eq!(scene.canvas().width(), 800);
    }

    #[test]
    fn test_from_config_rejects_unknown_material() {
        let config = SceneConfig {
            spheres: vec![SphereConfig {
                material: Some("chrome".into()),
                ..SphereConfig::default()
            }],
            ..SceneConfig::default()
        };
        let result = Scene::from_config(&config, Path::new("."));
        assert!(matches!(result, Err(Error::UnknownMaterial(name)) if name == "chrome"));
    }

    #[test]
    fn test_render_frame_and_resolve() {
        let mut scene = Scene::new(4, 4);
        scene.add_surface(Sphere::new(1.0, Vec3A::new(0.0, 0.0, 3.0)));
        let stats = scene.render_frame();
        assert!(stats.hits > 0);

        let mut bitmap = vec![0u8; scene.canvas().buffer().byte_len()];
        scene.resolve_to_bitmap(&mut bitmap).unwrap();
        assert_eq!(bitmap, scene.canvas().buffer().snapshot());
        assert_eq!(scene.to_image().dimensions(), (4, 4));
    }
}
