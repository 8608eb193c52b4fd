//! Demo configuration.
//!
//! Read from `softshade.toml` in the working directory, or from the file named
//! by `SOFTSHADE_CONFIG`. Every field is optional:
//!
//! ```toml
//! width = 800
//! height = 600
//! model = "assets/head.obj"
//! texture = "assets/head_diffuse.png"
//! light_direction = [-1.0, -1.0, -1.0]
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::math::Vec3;

pub const DEFAULT_CONFIG_FILE: &str = "softshade.toml";
pub const CONFIG_ENV_VAR: &str = "SOFTSHADE_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub title: String,
    /// OBJ file to show; the built-in scene when absent.
    pub model: Option<PathBuf>,
    /// Diffuse texture; plain white when absent.
    pub texture: Option<PathBuf>,
    /// Direction the light travels, normalized on use.
    pub light_direction: [f32; 3],
    pub ambient: f32,
    /// Distance from the camera to the model's origin.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width and height of the square shadow map.
    pub shadow_map_size: usize,
    /// Light-space offset along the normal to avoid shadow acne.
    pub shadow_bias: f32,
    pub screenshot_dir: PathBuf,
    pub target_fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            title: "softshade".to_string(),
            model: None,
            texture: None,
            light_direction: [-1.0, -1.0, -1.0],
            ambient: 0.1,
            camera_distance: 2.0,
            fov_degrees: 50.0,
            shadow_map_size: 500,
            shadow_bias: 0.01,
            screenshot_dir: PathBuf::from("."),
            target_fps: 60,
        }
    }
}

impl Config {
    /// Loads the configuration the demo should use.
    ///
    /// An explicit `SOFTSHADE_CONFIG` path must exist; the default
    /// `softshade.toml` is optional.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Self::from_optional_file(DEFAULT_CONFIG_FILE),
        }
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields defaults.
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("No {} found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(field) = config.zero_size_field() {
            return Err(ConfigError::ZeroSize {
                path: path.to_path_buf(),
                field,
            });
        }
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Name of the first image dimension set to zero, if any.
    pub fn zero_size_field(&self) -> Option<&'static str> {
        [
            ("width", self.width),
            ("height", self.height),
            ("shadow_map_size", self.shadow_map_size),
        ]
        .into_iter()
        .find_map(|(field, size)| (size == 0).then_some(field))
    }

    pub fn light_direction(&self) -> Vec3 {
        let [x, y, z] = self.light_direction;
        Vec3::new(x, y, z)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_the_demo() {
        let config = Config::default();
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.camera_distance, 2.0);
        assert_eq!(config.fov_degrees, 50.0);
        assert_eq!(config.light_direction(), -Vec3::ONE);
        assert!(config.model.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("width = 320\nmodel = \"head.obj\"\nlight_direction = [0.0, -1.0, 0.0]\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 500);
        assert_eq!(config.model, Some(PathBuf::from("head.obj")));
        assert_eq!(config.light_direction(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(config.aspect_ratio(), 320.0 / 500.0);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = write_config("width = \"wide\"\n");
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("widht = 10\n");
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_optional_file(dir.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_required_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("none.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn zero_sized_targets_are_rejected() {
        let file = write_config("shadow_map_size = 0\n");
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::ZeroSize {
                field: "shadow_map_size",
                ..
            })
        ));

        let file = write_config("width = 0\n");
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::ZeroSize { field: "width", .. })
        ));
        assert_eq!(Config::default().zero_size_field(), None);
    }
}
