use crate::config::{Config, load_config};
use crate::layout::{Size, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_graph;
use crate::viewport::{Camera, ZoomLimits, fit_items};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cgl",
    version,
    about = "Column graph layout: item positions and link routes as JSON"
)]
pub struct Args {
    /// Input file (.cgl, .json or .md) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output JSON file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file with layout and measurement overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Column whose items seed the layout, overriding the document
    #[arg(long = "main-column", allow_hyphen_values = true)]
    pub main_column: Option<i32>,

    /// Fit the graph into a WIDTHxHEIGHT container and include the camera
    #[arg(long = "fit", value_parser = parse_container)]
    pub fit: Option<Size>,

    #[arg(long = "min-zoom", default_value_t = 1.0)]
    pub min_zoom: f32,

    #[arg(long = "max-zoom", default_value_t = 3.0)]
    pub max_zoom: f32,

    /// Use the built-in character width table instead of system fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if args.fast_text {
        config.measure.fast_text_metrics = true;
    }
    let limits = ZoomLimits::new(args.min_zoom, args.max_zoom)
        .ok_or_else(|| anyhow::anyhow!("--min-zoom must be positive"))?;

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let documents = if is_markdown {
        extract_graph_blocks(&input)
    } else {
        vec![input]
    };

    if documents.is_empty() {
        return Err(anyhow::anyhow!("No colgraph blocks found in input"));
    }

    if documents.len() == 1 {
        return layout_document(&documents[0], &args, &config, limits, args.output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), documents.len())?;
    for (idx, document) in documents.iter().enumerate() {
        layout_document(document, &args, &config, limits, Some(&outputs[idx]))
            .with_context(|| format!("graph block {}", idx + 1))?;
    }
    Ok(())
}

fn layout_document(
    source: &str,
    args: &Args,
    config: &Config,
    limits: ZoomLimits,
    output: Option<&Path>,
) -> Result<()> {
    let mut graph = parse_graph(source)?;
    if let Some(main_column) = args.main_column {
        graph.main_column = Some(main_column);
    }
    let layout = compute_layout(&graph, config)?;

    let camera = args.fit.map(|container| {
        let mut info = layout.info.clone();
        info.container_size = container;
        fit_items(&info, None, true, limits)
    });
    log_summary(layout.graph.nodes.len(), camera.as_ref());
    write_layout_dump(output, &layout, &graph, camera)
}

fn log_summary(nodes: usize, camera: Option<&Camera>) {
    match camera {
        Some(camera) => tracing::info!(nodes, zoom = camera.zoom, "layout written"),
        None => tracing::info!(nodes, "layout written"),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_container(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| format!("invalid container dimension `{part}`"))
    };
    Ok(Size::new(parse(width)?, parse(height)?))
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn extract_graph_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut fence: Option<&str> = None;
    let mut current = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        match fence {
            None => fence = detect_graph_fence(trimmed),
            Some(open) if is_fence_end(trimmed, open) => {
                fence = None;
                blocks.push(current.join("\n"));
                current.clear();
            }
            Some(_) => current.push(line),
        }
    }

    blocks
}

fn detect_graph_fence(line: &str) -> Option<&'static str> {
    for fence in ["```", "~~~"] {
        if let Some(rest) = line.strip_prefix(fence) {
            let rest = rest.trim_start_matches(fence.chars().next()?).trim();
            if rest.starts_with("colgraph") {
                return Some(fence);
            }
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    line.strip_prefix(fence)
        .is_some_and(|rest| rest.trim().is_empty())
}

fn resolve_multi_outputs(output: Option<&Path>, count: usize) -> Result<Vec<PathBuf>> {
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("graph-{}.json", idx + 1)))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("graph");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| parent.join(format!("{}-{}.json", stem, idx + 1)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_graph_blocks() {
        let input = r#"
text
``` colgraph
0: A
1: B
A --> B
```
more
~~~colgraph
0: X
~~~
```rust
fn main() {}
```
"#;
        let blocks = extract_graph_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("A --> B"));
        assert_eq!(blocks[1], "0: X");
    }

    #[test]
    fn parses_container_sizes() {
        assert_eq!(parse_container("800x600").unwrap(), Size::new(800, 600));
        assert_eq!(parse_container("10X20").unwrap(), Size::new(10, 20));
        assert!(parse_container("800").is_err());
        assert!(parse_container("0x10").is_err());
    }

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs = resolve_multi_outputs(Some(Path::new("out/layout.json")), 2).unwrap();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/layout-1.json"),
                PathBuf::from("out/layout-2.json")
            ]
        );
        assert!(resolve_multi_outputs(None, 2).is_err());
    }
}
