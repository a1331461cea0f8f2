use crate::layout::Insets;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Value { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Space kept around every item inside its column lane.
    pub item_padding: Insets,
    /// Margin around the whole graph when it is shown in a container.
    pub content_padding: Insets,
    /// How far a same-column connector bends away from the column edge.
    pub same_column_link_padding: i32,
    pub main_column: i32,
    /// Place items that no main-column root leads to, after the main pass.
    pub place_unreached: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            item_padding: Insets::new(16, 4, 16, 4),
            content_padding: Insets::uniform(16),
            same_column_link_padding: 16,
            main_column: 0,
            place_unreached: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureConfig {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub label_padding_x: f32,
    pub label_padding_y: f32,
    /// Lower bound on measured item width; 0 disables it.
    pub min_item_width: i32,
    /// Skip font lookup and use the built-in character width table.
    pub fast_text_metrics: bool,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            font_family: "Inter, ui-sans-serif, system-ui, sans-serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
            label_padding_x: 16.0,
            label_padding_y: 16.0,
            min_item_width: 0,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub measure: MeasureConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum InsetsValue {
    Uniform(i32),
    Sides {
        #[serde(default)]
        left: i32,
        #[serde(default)]
        top: i32,
        #[serde(default)]
        right: i32,
        #[serde(default)]
        bottom: i32,
    },
}

impl InsetsValue {
    fn to_insets(self) -> Insets {
        match self {
            InsetsValue::Uniform(value) => Insets::uniform(value),
            InsetsValue::Sides {
                left,
                top,
                right,
                bottom,
            } => Insets::new(left, top, right, bottom),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    item_padding: Option<InsetsValue>,
    content_padding: Option<InsetsValue>,
    same_column_link_padding: Option<i32>,
    main_column: Option<i32>,
    place_unreached: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MeasureConfigFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    line_height: Option<f32>,
    label_padding_x: Option<f32>,
    label_padding_y: Option<f32>,
    min_item_width: Option<i32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    measure: Option<MeasureConfigFile>,
}

/// Reads a JSON file of overrides and merges it onto [`Config::default`].
/// With no path the defaults are returned unchanged.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "loaded config overrides");
    apply_overrides(Config::default(), parsed)
}

/// Same as [`load_config`] for an in-memory JSON string.
pub fn config_from_json(contents: &str) -> Result<Config, ConfigError> {
    let parsed: ConfigFile =
        serde_json::from_str(contents).map_err(|source| ConfigError::Json {
            path: PathBuf::from("<inline>"),
            source,
        })?;
    apply_overrides(Config::default(), parsed)
}

fn apply_overrides(mut config: Config, parsed: ConfigFile) -> Result<Config, ConfigError> {
    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.item_padding {
            config.layout.item_padding = v.to_insets();
        }
        if let Some(v) = layout.content_padding {
            config.layout.content_padding = v.to_insets();
        }
        if let Some(v) = layout.same_column_link_padding {
            config.layout.same_column_link_padding = v;
        }
        if let Some(v) = layout.main_column {
            config.layout.main_column = v;
        }
        if let Some(v) = layout.place_unreached {
            config.layout.place_unreached = v;
        }
    }

    if let Some(measure) = parsed.measure {
        if let Some(v) = measure.font_family {
            config.measure.font_family = v;
        }
        if let Some(v) = measure.font_size {
            if v <= 0.0 {
                return Err(ConfigError::Value {
                    field: "measure.fontSize",
                    reason: format!("must be positive, got {v}"),
                });
            }
            config.measure.font_size = v;
        }
        if let Some(v) = measure.line_height {
            config.measure.line_height = v;
        }
        if let Some(v) = measure.label_padding_x {
            config.measure.label_padding_x = v;
        }
        if let Some(v) = measure.label_padding_y {
            config.measure.label_padding_y = v;
        }
        if let Some(v) = measure.min_item_width {
            config.measure.min_item_width = v;
        }
        if let Some(v) = measure.fast_text_metrics {
            config.measure.fast_text_metrics = v;
        }
    }

    Ok(config)
}
