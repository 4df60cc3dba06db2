//! Layered configuration for the classifier.
//!
//! Three layers with precedence default < file < environment:
//! hardcoded defaults, `$LSBMORPH_HOME/config.toml` (missing file is fine)
//! and `LSBMORPH_*` environment overrides. The display label tables for the
//! two classification axes live here as well.

use crate::display::{
    ContrastCycle, ContrastTableError, DEFAULT_CONTRAST_PERCENTILES,
    DEFAULT_CONTRAST_PERCENTILES_RAW, DEFAULT_VMAX_PERCENTILE, DEFAULT_VMAX_PERCENTILE_RAW,
};
use lsbmorph_shorthand::{LsbClass, Morphology};
use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    FileParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for ${var}: '{value}' (expected {expected})")]
    InvalidEnvValue {
        var: String,
        value: String,
        expected: &'static str,
    },

    #[error("cannot determine home directory")]
    NoHomeDirectory,

    #[error("percentile {value} out of range (expected 0 < p <= 100)")]
    PercentileOutOfRange { value: f64 },

    #[error(transparent)]
    ContrastTables(#[from] ContrastTableError),
}

/// Fully merged configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Contrast percentile for the masked/model/residual bands.
    pub vmax_percentile: f64,
    /// Contrast percentile for the raw band.
    pub vmax_percentile_raw: f64,
    /// Contrast-cycle table for the masked/model/residual bands.
    pub contrast_percentiles: Vec<f64>,
    /// Contrast-cycle table for the raw band, same length.
    pub contrast_percentiles_raw: Vec<f64>,
    /// Static images root, relative to the server root.
    pub images_dir: PathBuf,
    /// Base directory of the galaxy source data, if mounted.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vmax_percentile: DEFAULT_VMAX_PERCENTILE,
            vmax_percentile_raw: DEFAULT_VMAX_PERCENTILE_RAW,
            contrast_percentiles: DEFAULT_CONTRAST_PERCENTILES.to_vec(),
            contrast_percentiles_raw: DEFAULT_CONTRAST_PERCENTILES_RAW.to_vec(),
            images_dir: PathBuf::from("static/galaxy_images"),
            data_dir: None,
        }
    }
}

impl Config {
    /// Build the contrast cycle from the configured tables.
    pub fn contrast_cycle(&self) -> Result<ContrastCycle, ContrastTableError> {
        ContrastCycle::new(
            self.contrast_percentiles.clone(),
            self.contrast_percentiles_raw.clone(),
        )
    }

    /// Check invariants the loader enforces after merging all layers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &value in [&self.vmax_percentile, &self.vmax_percentile_raw]
            .into_iter()
            .chain(&self.contrast_percentiles)
            .chain(&self.contrast_percentiles_raw)
        {
            if !(value > 0.0 && value <= 100.0) {
                return Err(ConfigError::PercentileOutOfRange { value });
            }
        }
        self.contrast_cycle()?;
        Ok(())
    }
}

/// File layer: every field optional so the file only overrides what it
/// names.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    vmax_percentile: Option<f64>,
    vmax_percentile_raw: Option<f64>,
    contrast_percentiles: Option<Vec<f64>>,
    contrast_percentiles_raw: Option<Vec<f64>>,
    images_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

/// Builder for layered configuration loading.
///
/// ```no_run
/// use lsbmorph_core::config::ConfigLoader;
///
/// let config = ConfigLoader::new().load()?;
/// # Ok::<(), lsbmorph_core::config::ConfigError>(())
/// ```
pub struct ConfigLoader {
    home: Option<PathBuf>,
    env_prefix: String,
    skip_file: bool,
    skip_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            home: None,
            env_prefix: "LSBMORPH".to_string(),
            skip_file: false,
            skip_env: false,
        }
    }

    /// Set the config directory explicitly instead of resolving
    /// `$LSBMORPH_HOME` / `~/.lsbmorph`.
    pub fn with_home(mut self, path: PathBuf) -> Self {
        self.home = Some(path);
        self
    }

    /// Environment variable prefix for overrides (default `LSBMORPH`).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip the config-file layer (defaults + env only).
    pub fn skip_file_layer(mut self) -> Self {
        self.skip_file = true;
        self
    }

    /// Skip environment overrides (defaults + file only).
    pub fn skip_env_layer(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Load and validate with all enabled layers, default < file < env.
    pub fn load(self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if !self.skip_file {
            let home = self.resolve_home()?;
            let file = Self::load_from_file(&home)?;
            Self::merge_file(&mut config, file);
        }

        if !self.skip_env {
            Self::apply_env_overrides(&mut config, &self.env_prefix)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn resolve_home(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.home {
            return Ok(path.clone());
        }
        if let Ok(path) = env::var("LSBMORPH_HOME") {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(".lsbmorph"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Read `config.toml` from the config directory. A missing file is not
    /// an error; a present but invalid file is.
    fn load_from_file(home: &Path) -> Result<FileConfig, ConfigError> {
        let path = home.join("config.toml");
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("config.toml not found at {}, using defaults", path.display());
                return Ok(FileConfig::default());
            }
            Err(source) => return Err(ConfigError::FileRead { path, source }),
        };
        toml::from_str(&contents).map_err(|source| ConfigError::FileParse { path, source })
    }

    fn merge_file(config: &mut Config, file: FileConfig) {
        if let Some(value) = file.vmax_percentile {
            config.vmax_percentile = value;
        }
        if let Some(value) = file.vmax_percentile_raw {
            config.vmax_percentile_raw = value;
        }
        if let Some(table) = file.contrast_percentiles {
            config.contrast_percentiles = table;
        }
        if let Some(table) = file.contrast_percentiles_raw {
            config.contrast_percentiles_raw = table;
        }
        if let Some(dir) = file.images_dir {
            config.images_dir = dir;
        }
        if let Some(dir) = file.data_dir {
            config.data_dir = Some(dir);
        }
    }

    /// Apply `{PREFIX}_DATA_DIR`, `{PREFIX}_VMAX` and `{PREFIX}_VMAX_RAW`.
    fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<(), ConfigError> {
        let data_dir_var = format!("{prefix}_DATA_DIR");
        if let Ok(value) = env::var(&data_dir_var)
            && !value.trim().is_empty()
        {
            tracing::debug!("applying env override: {data_dir_var}={value}");
            config.data_dir = Some(PathBuf::from(value));
        }

        for (suffix, slot) in [
            ("VMAX", &mut config.vmax_percentile),
            ("VMAX_RAW", &mut config.vmax_percentile_raw),
        ] {
            let var = format!("{prefix}_{suffix}");
            if let Ok(value) = env::var(&var)
                && !value.trim().is_empty()
            {
                match value.trim().parse::<f64>() {
                    Ok(parsed) => {
                        tracing::debug!("applying env override: {var}={parsed}");
                        *slot = parsed;
                    }
                    Err(_) => {
                        return Err(ConfigError::InvalidEnvValue {
                            var,
                            value,
                            expected: "a percentile between 0 and 100",
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Display label for an LSB class, as shown next to the radio buttons;
/// `None` for [`LsbClass::Unset`].
pub fn lsb_class_label(class: LsbClass) -> Option<&'static str> {
    match class {
        LsbClass::Failed => Some("Failed fitting"),
        LsbClass::No => Some("Non-LSB"),
        LsbClass::Yes => Some("LSB"),
        LsbClass::Unset => None,
    }
}

/// Display label for a morphology; `None` for [`Morphology::Unset`].
pub fn morphology_label(morphology: Morphology) -> Option<&'static str> {
    match morphology {
        Morphology::Featureless => Some("Featureless"),
        Morphology::Unsure => Some("Not sure (Irr/other)"),
        Morphology::LateType => Some("LTG (Sp)"),
        Morphology::EarlyType => Some("ETG (Ell)"),
        Morphology::Unset => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vmax_percentile, 99.0);
        assert_eq!(config.vmax_percentile_raw, 99.7);
        assert_eq!(config.contrast_cycle().map(|c| c.len()), Ok(6));
    }

    #[test]
    fn file_layer_overrides_named_fields_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
vmax_percentile = 98.0
data_dir = "/data/lsb-kids"
"#,
        )
        .expect("write config");

        let config = ConfigLoader::new()
            .with_home(dir.path().to_path_buf())
            .skip_env_layer()
            .load()
            .expect("load");

        assert_eq!(config.vmax_percentile, 98.0);
        assert_eq!(config.vmax_percentile_raw, 99.7); // default kept
        assert_eq!(config.data_dir, Some(PathBuf::from("/data/lsb-kids")));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ConfigLoader::new()
            .with_home(dir.path().to_path_buf())
            .skip_env_layer()
            .load()
            .expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.toml"), "vmax_percentile = [nope")
            .expect("write config");

        let err = ConfigLoader::new()
            .with_home(dir.path().to_path_buf())
            .skip_env_layer()
            .load()
            .expect_err("parse failure");
        assert!(matches!(err, ConfigError::FileParse { .. }));
    }

    #[test]
    fn env_layer_overrides_file_layer() {
        unsafe {
            env::set_var("LSBTEST_VMAX", "97.5");
            env::set_var("LSBTEST_DATA_DIR", "/mnt/kids");
        }

        let config = ConfigLoader::new()
            .with_env_prefix("LSBTEST")
            .skip_file_layer()
            .load()
            .expect("load");

        assert_eq!(config.vmax_percentile, 97.5);
        assert_eq!(config.data_dir, Some(PathBuf::from("/mnt/kids")));

        unsafe {
            env::remove_var("LSBTEST_VMAX");
            env::remove_var("LSBTEST_DATA_DIR");
        }
    }

    #[test]
    fn malformed_env_percentile_names_the_variable() {
        unsafe {
            env::set_var("LSBBAD_VMAX", "bright");
        }

        let err = ConfigLoader::new()
            .with_env_prefix("LSBBAD")
            .skip_file_layer()
            .load()
            .expect_err("invalid env value");
        assert!(matches!(
            err,
            ConfigError::InvalidEnvValue { ref var, .. } if var == "LSBBAD_VMAX"
        ));

        unsafe {
            env::remove_var("LSBBAD_VMAX");
        }
    }

    #[test]
    fn out_of_range_percentile_fails_validation() {
        let config = Config {
            vmax_percentile: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PercentileOutOfRange { .. })
        ));
    }

    #[test]
    fn mismatched_tables_fail_validation() {
        let config = Config {
            contrast_percentiles: vec![99.0, 99.5],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ContrastTables(
                ContrastTableError::MismatchedLengths { .. }
            ))
        ));
    }

    #[test]
    fn labels_match_the_form_captions() {
        assert_eq!(lsb_class_label(LsbClass::Failed), Some("Failed fitting"));
        assert_eq!(lsb_class_label(LsbClass::Unset), None);
        assert_eq!(morphology_label(Morphology::Unsure), Some("Not sure (Irr/other)"));
        assert_eq!(morphology_label(Morphology::EarlyType), Some("ETG (Ell)"));
    }
}
