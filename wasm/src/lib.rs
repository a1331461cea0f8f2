use column_graph_layout::config::Config;
use column_graph_layout::layout::{Size, compute_layout};
use column_graph_layout::layout_dump::LayoutDump;
use column_graph_layout::parser::parse_graph;
use column_graph_layout::viewport::{ZoomLimits, fit_items};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOptions {
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    main_column: Option<i32>,
    container_width: Option<i32>,
    container_height: Option<i32>,
}

fn build_config(options: &LayoutOptions) -> Config {
    let mut config = Config::default();
    if let Some(font_family) = &options.font_family {
        config.measure.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size.filter(|size| *size > 0.0) {
        config.measure.font_size = font_size;
    }
    // No system fonts inside the browser sandbox.
    config.measure.fast_text_metrics = options.fast_text.unwrap_or(true);
    config
}

fn layout_json(code: &str, options: LayoutOptions) -> Result<String, String> {
    let mut graph = parse_graph(code).map_err(|error| error.to_string())?;
    if let Some(main_column) = options.main_column {
        graph.main_column = Some(main_column);
    }
    let config = build_config(&options);
    let layout = compute_layout(&graph, &config).map_err(|error| error.to_string())?;

    let camera = match (options.container_width, options.container_height) {
        (Some(width), Some(height)) => {
            let mut info = layout.info.clone();
            info.container_size = Size::new(width, height);
            Some(fit_items(&info, None, true, ZoomLimits::default()))
        }
        _ => None,
    };
    let dump = LayoutDump::from_layout(&layout, &graph, camera);
    serde_json::to_string(&dump).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_graph_json(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<LayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        LayoutOptions::default()
    };

    layout_json(code, options).map_err(|error| JsValue::from_str(&error))
}
