//! LumaRay ray caster
//!
//! Renders one primary ray per pixel against triangle meshes, spheres and
//! infinite planes, keeping the nearest hit per pixel. Rows are rendered in
//! parallel into a shared byte pixel buffer; the result is deterministic and
//! identical to a sequential render.
//!
//! ```no_run
//! use lumaray::{Scene, Sphere};
//! use glam::Vec3A;
//!
//! let mut scene = Scene::new(320, 240);
//! scene.add_surface(Sphere::new(1.0, Vec3A::new(0.0, 0.0, 4.0)));
//! let stats = scene.render_frame();
//! println!("{} hits", stats.hits);
//! let image = scene.to_image();
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod camera;
pub mod canvas;
pub mod config;
pub mod error;
pub mod hittable;
pub mod intersect;
pub mod interval;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod pixel_buffer;
pub mod plane;
pub mod ray;
pub mod scene;
pub mod sphere;
pub mod surface;
pub mod transform;

pub use camera::{Camera, ScreenRect};
pub use canvas::{Canvas, RenderOptions, RenderStats};
pub use config::{load_config, SceneConfig};
pub use error::{Error, Result};
pub use hittable::{HitRecord, Hittable};
pub use material::{Material, MaterialId, MaterialTable};
pub use mesh::Mesh;
pub use pixel_buffer::{PixelBuffer, PixelColor, PixelFormat};
pub use plane::Plane;
pub use ray::Ray;
pub use scene::{CameraId, Scene};
pub use sphere::Sphere;
pub use surface::Surface;
pub use transform::Transform;
