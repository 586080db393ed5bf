//! TOML scene description.
//!
//! Every field has a default, so an empty file is a valid (empty) scene.
//!
//! ```toml
//! [render]
//! width = 640
//! height = 480
//!
//! [camera]
//! fov = 60.0
//! position = [0.0, 1.0, -5.0]
//!
//! [[materials]]
//! name = "red"
//! color = [1.0, 0.2, 0.2]
//!
//! [[spheres]]
//! center = [0.0, 1.0, 0.0]
//! radius = 1.0
//! material = "red"
//!
//! [[planes]]
//! normal = [0.0, 1.0, 0.0]
//! distance = 0.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::camera::{DEFAULT_FAR, DEFAULT_NEAR};
use crate::canvas::RenderOptions;
use crate::error::{Error, Result};

/// Whole scene file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Frame size and render switches
    pub render: RenderConfig,
    /// The scene's single camera
    pub camera: CameraConfig,
    /// Named materials referenced by the surfaces below
    pub materials: Vec<MaterialConfig>,
    /// Spheres
    pub spheres: Vec<SphereConfig>,
    /// Infinite planes
    pub planes: Vec<PlaneConfig>,
    /// OBJ models
    pub meshes: Vec<MeshConfig>,
}

/// `[render]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Render rows on the rayon thread pool
    pub parallel: bool,
    /// Restrict each surface to its screen bounds
    pub cull: bool,
    /// Show a progress bar
    pub progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            parallel: true,
            cull: true,
            progress: true,
        }
    }
}

impl RenderConfig {
    /// Options for [`crate::canvas::Canvas::render`].
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            parallel: self.parallel,
            cull: self.cull,
            progress: self.progress,
        }
    }
}

/// `[camera]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Eye position
    pub position: [f32; 3],
    /// Viewing direction; need not be normalized
    pub forward: [f32; 3],
    /// Near clip distance
    pub near: f32,
    /// Far clip distance; hits beyond it are ignored
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 90.0,
            position: [0.0; 3],
            forward: [0.0, 0.0, 1.0],
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

/// `[[materials]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Name surfaces refer to
    pub name: String,
    /// Linear RGB in `[0, 1]`
    pub color: [f32; 3],
    /// Diffuse texture, relative to the scene file
    pub texture: Option<PathBuf>,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: [1.0; 3],
            texture: None,
        }
    }
}

/// `[[spheres]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Center point
    pub center: [f32; 3],
    /// Radius
    pub radius: f32,
    /// Material name
    pub material: Option<String>,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            center: [0.0; 3],
            radius: 1.0,
            material: None,
        }
    }
}

/// `[[planes]]` entry: points `x` with `normal · x = distance`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Normal; normalized on load
    pub normal: [f32; 3],
    /// Signed distance from the origin
    pub distance: f32,
    /// Material name
    pub material: Option<String>,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            normal: [0.0, 1.0, 0.0],
            distance: 0.0,
            material: None,
        }
    }
}

/// `[[meshes]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeshConfig {
    /// OBJ file, relative to the scene file
    pub path: PathBuf,
    /// Translation
    pub translate: [f32; 3],
    /// Euler angles in degrees, XYZ order
    pub rotate: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
    /// Material for faces without one from the OBJ file
    pub material: Option<String>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            translate: [0.0; 3],
            rotate: [0.0; 3],
            scale: [1.0; 3],
            material: None,
        }
    }
}

/// Load a scene file.
///
/// A missing or unreadable file is [`Error::Io`]; invalid TOML is [`Error::Config`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config: SceneConfig = toml::from_str(&content)?;
    Ok(config)
}

impl SceneConfig {
    /// Built-in scene: a ground plane, three large spheres and a grid of small
    /// randomly colored ones. The same seed always yields the same scene.
    pub fn demo(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut config = SceneConfig {
            camera: CameraConfig {
                fov: 30.0,
                position: [13.0, 2.0, 3.0],
                forward: [-13.0, -2.0, -3.0],
                ..CameraConfig::default()
            },
            ..SceneConfig::default()
        };

        let mut material = |name: String, color: [f32; 3]| {
            config.materials.push(MaterialConfig {
                name: name.clone(),
                color,
                texture: None,
            });
            Some(name)
        };

        let ground = material("ground".into(), [0.5, 0.5, 0.5]);
        let big = [
            ("glass", [0.9, 0.9, 1.0], [0.0, 1.0, 0.0]),
            ("brown", [0.4, 0.2, 0.1], [-4.0, 1.0, 0.0]),
            ("bronze", [0.7, 0.6, 0.5], [4.0, 1.0, 0.0]),
        ];
        let mut spheres = Vec::new();
        for (name, color, center) in big {
            spheres.push(SphereConfig {
                center,
                radius: 1.0,
                material: material(name.into(), color),
            });
        }

        for a in -11..11 {
            for b in -11..11 {
                let center = [
                    a as f32 + 0.9 * rng.random::<f32>(),
                    0.2,
                    b as f32 + 0.9 * rng.random::<f32>(),
                ];
                let color = [rng.random(), rng.random(), rng.random()];
                // Keep clear of the large spheres
                let clear = big.iter().all(|(_, _, c)| {
                    let (dx, dz) = (center[0] - c[0], center[2] - c[2]);
                    dx * dx + dz * dz > 1.2 * 1.2
                });
                if clear {
                    spheres.push(SphereConfig {
                        center,
                        radius: 0.2,
                        material: material(format!("grid_{a}_{b}"), color),
                    });
                }
            }
        }

        config.spheres = spheres;
        config.planes.push(PlaneConfig {
            material: ground,
            ..PlaneConfig::default()
        });
        config
    }
}
