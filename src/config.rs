//! Configuration module.
//!
//! Handles loading, validating, and merging `imager.toml`. Stock defaults are
//! overridden by the user file, key by key; presets from both are combined.
//!
//! ## Config File Location
//!
//! `imager.toml` in the working directory is picked up when present. Any other
//! file can be passed with `--config`; a file named that way must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [background]
//! fallback = "#FFFFFF"          # Used when a background spec cannot be resolved
//!
//! [remover]
//! kind = "command"              # "command" or "key-color"
//! command = ["rembg", "i", "-", "-"]
//! tolerance = 30                # key-color only, per channel
//!
//! [batch]
//! archive_dir = "processed"     # Created inside the input directory
//!
//! [presets."S light"]
//! crop = true
//! remove_background = true
//! resize = "240x240"
//! padding = 48
//! background = "whitesmoke"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [remover]
//! kind = "key-color"
//!
//! [presets.thumb]
//! resize = "128x128"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BackgroundRemover, CommandRemover, KeyColorRemover, RemoverError, parse_color};
use crate::request::{Preset, ProcessingOptions, RequestError};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "imager.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Remover setup failed: {0}")]
    Remover(#[from] RemoverError),
}

/// Tool configuration loaded from `imager.toml`.
///
/// All fields have defaults. User files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagerConfig {
    pub background: BackgroundConfig,
    pub remover: RemoverConfig,
    pub batch: BatchSettings,
    /// Named option bundles, selectable with `--preset`.
    pub presets: BTreeMap<String, Preset>,
}

impl Default for ImagerConfig {
    fn default() -> Self {
        Self {
            background: BackgroundConfig::default(),
            remover: RemoverConfig::default(),
            batch: BatchSettings::default(),
            presets: stock_presets(),
        }
    }
}

impl ImagerConfig {
    /// Validate values that deserialization alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if parse_color(&self.background.fallback).is_none() {
            return Err(ConfigError::Validation(format!(
                "background.fallback '{}' is not a color",
                self.background.fallback
            )));
        }
        if self.remover.kind == RemoverKind::Command && self.remover.command.is_empty() {
            return Err(ConfigError::Validation(
                "remover.command must not be empty".into(),
            ));
        }
        let archive = self.batch.archive_dir.trim();
        if archive.is_empty() || archive.contains(['/', '\\']) || archive == "." || archive == ".." {
            return Err(ConfigError::Validation(
                "batch.archive_dir must be a plain directory name".into(),
            ));
        }
        for (name, preset) in &self.presets {
            preset
                .to_options()
                .map_err(|e| ConfigError::Validation(format!("preset '{name}': {e}")))?;
        }
        Ok(())
    }

    /// The fallback background as RGBA.
    pub fn fallback_color(&self) -> Result<Rgba<u8>, ConfigError> {
        parse_color(&self.background.fallback).ok_or_else(|| {
            ConfigError::Validation(format!(
                "background.fallback '{}' is not a color",
                self.background.fallback
            ))
        })
    }

    /// Instantiate the configured background remover.
    pub fn build_remover(&self) -> Result<Box<dyn BackgroundRemover>, ConfigError> {
        Ok(match self.remover.kind {
            RemoverKind::Command => Box::new(CommandRemover::new(&self.remover.command)?),
            RemoverKind::KeyColor => Box::new(KeyColorRemover::new(self.remover.tolerance)),
        })
    }

    /// Options for the preset called `name`.
    pub fn preset(&self, name: &str) -> Result<ProcessingOptions, RequestError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| RequestError::UnknownPreset {
                name: name.to_string(),
                available: self.presets.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        preset.to_options()
    }
}

/// Background settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    /// Hex code or color name used when a background spec is unusable.
    pub fallback: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            fallback: "#FFFFFF".to_string(),
        }
    }
}

/// Which background remover to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoverKind {
    /// External program, image on stdin, cut-out on stdout.
    Command,
    /// Built-in key-color removal.
    KeyColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoverConfig {
    pub kind: RemoverKind,
    /// Program and arguments for [`RemoverKind::Command`].
    pub command: Vec<String>,
    /// Per-channel tolerance for [`RemoverKind::KeyColor`].
    pub tolerance: u8,
}

impl Default for RemoverConfig {
    fn default() -> Self {
        Self {
            kind: RemoverKind::Command,
            command: ["rembg", "i", "-", "-"].map(String::from).to_vec(),
            tolerance: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSettings {
    /// Directory inside the input directory that receives processed inputs.
    pub archive_dir: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            archive_dir: crate::batch::DEFAULT_ARCHIVE_DIR.to_string(),
        }
    }
}

/// Small/medium/large, each on a light and a dark backdrop.
fn stock_presets() -> BTreeMap<String, Preset> {
    let sizes = [("S", "240x240", 48), ("M", "480x480", 96), ("L", "960x960", 128)];
    let shades = [("light", "whitesmoke"), ("dark", "#2A373D")];

    let mut presets = BTreeMap::new();
    for (shade, background) in shades {
        for (size, resize, padding) in sizes {
            presets.insert(
                format!("{size} {shade}"),
                Preset {
                    crop: true,
                    remove_background: true,
                    resize: Some(resize.to_string()),
                    padding,
                    background: Some(background.to_string()),
                },
            );
        }
    }
    presets
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ImagerConfig::default())?)
}

/// Deep-merge two TOML values. Tables merge recursively; anything else in
/// `overlay` replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as raw TOML. Returns `None` when the file is absent.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge `overlay` onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ImagerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImagerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in the
/// working directory is used when present, stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<ImagerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config");
            let value =
                load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
            Some(value)
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// A fully documented stock `imager.toml`, printed by `imager gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Imager Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Save as imager.toml in the directory you run imager from, or pass
# --config <FILE>. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Background composition
# ---------------------------------------------------------------------------
[background]
# Used when --background names neither a known color nor a readable image.
# Hex (#RGB, #RGBA, #RRGGBB, #RRGGBBAA) or a CSS color name.
fallback = "#FFFFFF"

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[remover]
# "command": pipe the image through an external program. It receives PNG
#            bytes on stdin and must write the cut-out image to stdout.
# "key-color": built in; clears pixels close to the top-left corner color.
kind = "command"

# Program and arguments for kind = "command".
command = ["rembg", "i", "-", "-"]

# Per-channel distance (0-255) still treated as background by "key-color".
tolerance = 30

# ---------------------------------------------------------------------------
# Batch runs
# ---------------------------------------------------------------------------
[batch]
# Processed inputs are moved here, inside the input directory.
archive_dir = "processed"

# ---------------------------------------------------------------------------
# Presets (select with --preset "<name>")
# ---------------------------------------------------------------------------
# Each preset replaces the whole option set. Add your own tables here;
# they are combined with the stock ones below.

[presets."S light"]
crop = true
remove_background = true
resize = "240x240"
padding = 48
background = "whitesmoke"

[presets."M light"]
crop = true
remove_background = true
resize = "480x480"
padding = 96
background = "whitesmoke"

[presets."L light"]
crop = true
remove_background = true
resize = "960x960"
padding = 128
background = "whitesmoke"

[presets."S dark"]
crop = true
remove_background = true
resize = "240x240"
padding = 48
background = "#2A373D"

[presets."M dark"]
crop = true
remove_background = true
resize = "480x480"
padding = 96
background = "#2A373D"

[presets."L dark"]
crop = true
remove_background = true
resize = "960x960"
padding = 128
background = "#2A373D"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{BackgroundSpec, Dimensions};
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ImagerConfig::default();
        assert_eq!(config.background.fallback, "#FFFFFF");
        assert_eq!(config.remover.kind, RemoverKind::Command);
        assert_eq!(config.remover.command, vec!["rembg", "i", "-", "-"]);
        assert_eq!(config.remover.tolerance, 30);
        assert_eq!(config.batch.archive_dir, "processed");
    }

    #[test]
    fn default_config_has_six_presets() {
        let config = ImagerConfig::default();
        let names: Vec<&str> = config.presets.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["L dark", "L light", "M dark", "M light", "S dark", "S light"]
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[remover]
kind = "key-color"
"#;
        let config: ImagerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.remover.kind, RemoverKind::KeyColor);
        // Defaults preserved
        assert_eq!(config.remover.tolerance, 30);
        assert_eq!(config.batch.archive_dir, "processed");
    }

    // =========================================================================
    // Presets
    // =========================================================================

    #[test]
    fn stock_preset_maps_to_options() {
        let opts = ImagerConfig::default().preset("M dark").unwrap();
        assert!(opts.crop && opts.remove_background);
        assert_eq!(opts.resize, Some(Dimensions::new(480, 480)));
        assert_eq!(opts.padding, 96);
        assert_eq!(opts.background, Some(BackgroundSpec::Color("#2A373D".into())));
    }

    #[test]
    fn unknown_preset_lists_available() {
        let err = ImagerConfig::default().preset("XL light").unwrap_err();
        match err {
            RequestError::UnknownPreset { name, available } => {
                assert_eq!(name, "XL light");
                assert!(available.contains("S light"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn user_presets_combine_with_stock() {
        let overlay: toml::Value = toml::from_str(
            r#"
[presets.thumb]
crop = true
resize = "128x128"
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value().unwrap(), Some(overlay)).unwrap();
        assert_eq!(config.presets.len(), 7);
        let thumb = config.preset("thumb").unwrap();
        assert_eq!(thumb.resize, Some(Dimensions::new(128, 128)));
        assert!(!thumb.remove_background);
    }

    #[test]
    fn user_can_override_one_preset_field() {
        let overlay: toml::Value = toml::from_str(
            r#"
[presets."S light"]
padding = 10
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value().unwrap(), Some(overlay)).unwrap();
        let opts = config.preset("S light").unwrap();
        assert_eq!(opts.padding, 10);
        assert_eq!(opts.resize, Some(Dimensions::new(240, 240)));
    }

    // =========================================================================
    // Remover construction
    // =========================================================================

    #[test]
    fn build_command_remover() {
        let remover = ImagerConfig::default().build_remover().unwrap();
        assert_eq!(remover.name(), "rembg");
    }

    #[test]
    fn build_key_color_remover() {
        let mut config = ImagerConfig::default();
        config.remover.kind = RemoverKind::KeyColor;
        assert_eq!(config.build_remover().unwrap().name(), "key-color");
    }

    #[test]
    fn remover_kind_is_kebab_case() {
        let config: ImagerConfig = toml::from_str("[remover]\nkind = \"key-color\"").unwrap();
        assert_eq!(config.remover.kind, RemoverKind::KeyColor);
        assert!(toml::from_str::<ImagerConfig>("[remover]\nkind = \"key_color\"").is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"tolerance = 30"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"tolerance = 10"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("tolerance").unwrap().as_integer(), Some(10));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[remover]
kind = "command"
tolerance = 30
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[remover]
tolerance = 5
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let remover = merged.get("remover").unwrap();
        assert_eq!(remover.get("tolerance").unwrap().as_integer(), Some(5));
        // kind preserved from base
        assert_eq!(remover.get("kind").unwrap().as_str(), Some("command"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"command = ["rembg", "i", "-", "-"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"command = ["my-tool"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("command").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[remover]
tolerence = 10
"#;
        let result: Result<ImagerConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ImagerConfig, _> = toml::from_str("[batches]\narchive_dir = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_preset_key_rejected() {
        let toml_str = r#"
[presets.thumb]
size = "10x10"
"#;
        let result: Result<ImagerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ImagerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_fallback_must_be_color() {
        let mut config = ImagerConfig::default();
        config.background.fallback = "sparkly".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fallback"));
    }

    #[test]
    fn validate_empty_command() {
        let mut config = ImagerConfig::default();
        config.remover.command.clear();
        assert!(config.validate().is_err());

        // Irrelevant for the key-color remover
        config.remover.kind = RemoverKind::KeyColor;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_archive_dir_is_plain_name() {
        for bad in ["", "  ", "a/b", "..", "."] {
            let mut config = ImagerConfig::default();
            config.batch.archive_dir = bad.into();
            assert!(config.validate().is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn validate_preset_resize() {
        let mut config = ImagerConfig::default();
        config.presets.insert(
            "broken".into(),
            Preset {
                resize: Some("200-200".into()),
                ..Default::default()
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("preset 'broken'"));
    }

    #[test]
    fn fallback_color_parses() {
        let mut config = ImagerConfig::default();
        config.background.fallback = "black".into();
        assert_eq!(config.fallback_color().unwrap(), Rgba([0, 0, 0, 255]));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("imager.toml")).unwrap().is_none());
    }

    #[test]
    fn load_config_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[batch]\narchive_dir = \"done\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.batch.archive_dir, "done");
        assert_eq!(config.presets.len(), 6);
    }

    #[test]
    fn load_config_explicit_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("imager.toml");
        fs::write(&path, "[background]\nfallback = \"nope\"\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("imager.toml");
        fs::write(&path, "[remover\n").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value().unwrap(), None).unwrap();
        assert_eq!(config, ImagerConfig::default());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ImagerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ImagerConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[background]"));
        assert!(content.contains("[remover]"));
        assert!(content.contains("[batch]"));
        assert!(content.contains("[presets.\"S light\"]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for section in ["background", "remover", "batch", "presets"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }
}
