use crate::ir::Graph;
use crate::layout::{Layout, Rect};
use crate::viewport::Camera;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: i32,
    pub height: i32,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub graph_rect: Rect,
    /// Item rects relative to the graph rect, in document order.
    pub item_rects: Vec<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub column: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[i32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &Graph, camera: Option<Camera>) -> Self {
        let nodes: Vec<NodeDump> = layout
            .graph
            .nodes
            .iter()
            .map(|node| {
                let item = graph.item(&node.item);
                NodeDump {
                    id: node.item.clone(),
                    label: item.map(|item| item.label.clone()).unwrap_or_default(),
                    column: item.map(|item| item.column).unwrap_or(0),
                    x: node.position.x,
                    y: node.position.y,
                    width: node.size.width,
                    height: node.size.height,
                }
            })
            .collect();

        let links = layout
            .graph
            .links
            .iter()
            .map(|link| LinkDump {
                from: nodes[link.from].id.clone(),
                to: nodes[link.to].id.clone(),
                points: link.points().iter().map(|point| [point.x, point.y]).collect(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            nodes,
            links,
            graph_rect: layout.graph.graph_rect,
            item_rects: layout.info.item_rects.clone(),
            camera,
        }
    }
}

pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &Layout,
    graph: &Graph,
    camera: Option<Camera>,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, graph, camera);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
