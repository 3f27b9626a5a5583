use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use common::{
    catalog::{default_materials, default_printers, Material, Printer},
    units::VolumeUnit,
};
use provenance::layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base url of the split service. Without one everything runs offline.
    pub server: Option<String>,
    pub network_timeout: f32,
    /// Ask the server to add alignment keys to cut faces.
    pub add_keys: bool,

    pub default_printer: String,
    pub volume_unit: VolumeUnit,

    // Graph layout
    pub generation_spacing: f64,
    pub band_height: f64,

    pub printers: Vec<Printer>,
    pub materials: Vec<Material>,
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|x| x.join("splitter"))
    }

    pub fn load_or_default(config_dir: &Path) -> Self {
        match Self::load(config_dir) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {}", err);
                Config::default()
            }
        }
    }

    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join("config.toml");
        Ok(if config_file.exists() {
            let file = fs::read(&config_file)?;
            let string = String::from_utf8_lossy(&file);
            let config = toml::from_str(&string)?;
            info!("Successfully loaded config file");
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        fs::create_dir_all(config_dir)?;

        let config_file = config_dir.join("config.toml");
        let string = toml::to_string(self)?;
        fs::write(config_file, string)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f32(self.network_timeout.max(0.1))
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            generation_spacing: self.generation_spacing,
            band_height: self.band_height,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            server: None,
            network_timeout: 30.0,
            add_keys: false,

            default_printer: "bambu_x1c".into(),
            volume_unit: VolumeUnit::Cm,

            generation_spacing: layout.generation_spacing,
            band_height: layout.band_height,

            printers: default_printers(),
            materials: default_materials(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            server = "http://localhost:8000"
            volume_unit = "mm"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.volume_unit, VolumeUnit::Mm);
        assert_eq!(config.printers.len(), 4);
        assert_eq!(config.layout(), LayoutConfig::default());
    }

    #[test]
    fn save_and_load() {
        let dir = env::temp_dir().join(format!("splitter-config-{}", std::process::id()));
        let config = Config {
            server: Some("http://10.0.0.2:8000".into()),
            add_keys: true,
            ..Default::default()
        };

        config.save(&dir).unwrap();
        let loaded = Config::load(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded.server, config.server);
        assert!(loaded.add_keys);
        assert_eq!(loaded.materials, config.materials);
    }

    #[test]
    fn missing_dir_uses_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/splitter"));
        assert!(config.server.is_none());
    }
}
