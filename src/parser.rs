use crate::ir::{Graph, Item};
use crate::layout::{LinkSide, Size};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^colgraph\b").unwrap());
static MAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^main\s+(\S+)$").unwrap());
static COLUMN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)\s*:\s*(.*)$").unwrap());
static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<id>[\w.]+)\s*(?:\[(?P<label>.*)\])?$").unwrap());
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^size\s+(?P<id>[\w.]+)\s+(?P<w>\S+?)\s*[xX]\s*(?P<h>\S+)$").unwrap());
static SIDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^side\s+(?P<id>[\w.]+)\s+(?P<side>\w+)$").unwrap());
static ARROW_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-->|<--|---").unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.]+$").unwrap());

/// Largest width or height an item may declare, in pixels.
pub const MAX_ITEM_EXTENT: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized statement `{text}`")]
    Syntax { line: usize, text: String },
    #[error("line {line}: invalid number `{value}`")]
    Number { line: usize, value: String },
    #[error("line {line}: item `{id}` is declared twice")]
    DuplicateItem { line: usize, id: String },
    #[error("line {line}: unknown item `{id}`")]
    UnknownItem { line: usize, id: String },
    #[error("line {line}: unknown link side `{side}`")]
    Side { line: usize, side: String },
    #[error("line {line}: size of `{id}` must be within 0..={max} on both axes, got {size}")]
    Extent {
        line: usize,
        id: String,
        size: String,
        max: i32,
    },
    #[error("line {line}: {message}")]
    Document { line: usize, message: String },
    #[error("invalid graph document: {message}")]
    Invalid { message: String },
}

impl ParseError {
    /// 1-based source line, when the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::Number { line, .. }
            | ParseError::DuplicateItem { line, .. }
            | ParseError::UnknownItem { line, .. }
            | ParseError::Side { line, .. }
            | ParseError::Extent { line, .. }
            | ParseError::Document { line, .. } => Some(*line),
            ParseError::Invalid { .. } => None,
        }
    }
}

/// Parses a graph document: JSON (or JSON5) when the input starts with `{`,
/// the line format otherwise.
pub fn parse_graph(input: &str) -> Result<Graph, ParseError> {
    if input.trim_start().starts_with('{') {
        parse_json_graph(input)
    } else {
        parse_graph_lines(input)
    }
}

fn parse_json_graph(input: &str) -> Result<Graph, ParseError> {
    let mut graph: Graph = match serde_json::from_str(input) {
        Ok(graph) => graph,
        Err(strict) => match json5::from_str::<Graph>(input) {
            Ok(graph) => graph,
            Err(_) => {
                return Err(ParseError::Document {
                    line: strict.line(),
                    message: strict.to_string(),
                });
            }
        },
    };

    let mut seen = std::collections::HashSet::new();
    for item in &mut graph.items {
        if !seen.insert(item.id.clone()) {
            return Err(ParseError::Invalid {
                message: format!("item `{}` is declared twice", item.id),
            });
        }
        if item.label.is_empty() {
            item.label = item.id.clone();
        }
        if let Some(size) = item.size
            && !extent_in_range(size)
        {
            return Err(ParseError::Invalid {
                message: format!(
                    "size of `{}` must be within 0..={MAX_ITEM_EXTENT} on both axes, got {}x{}",
                    item.id, size.width, size.height
                ),
            });
        }
    }
    for link in &graph.links {
        for id in [&link.from, &link.to] {
            if !seen.contains(id) {
                return Err(ParseError::Invalid {
                    message: format!("link refers to unknown item `{id}`"),
                });
            }
        }
    }
    Ok(graph)
}

struct PendingLink {
    line: usize,
    from: String,
    to: String,
    directed: bool,
}

fn parse_graph_lines(input: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    let mut pending: Vec<PendingLink> = Vec::new();
    let mut sizes: Vec<(usize, String, Size)> = Vec::new();
    let mut sides: Vec<(usize, String, LinkSide)> = Vec::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        let without_comment = strip_trailing_comment(trimmed);

        for statement in split_outside(&without_comment, ';') {
            if statement.is_empty() || HEADER_RE.is_match(&statement) {
                continue;
            }

            if let Some(caps) = MAIN_RE.captures(&statement) {
                graph.main_column = Some(parse_int(&caps[1], line_no)?);
                continue;
            }

            if let Some(caps) = SIZE_RE.captures(&statement) {
                let width = parse_int(&caps["w"], line_no)?;
                let height = parse_int(&caps["h"], line_no)?;
                let size = Size::new(width, height);
                if !extent_in_range(size) {
                    return Err(ParseError::Extent {
                        line: line_no,
                        id: caps["id"].to_string(),
                        size: format!("{width}x{height}"),
                        max: MAX_ITEM_EXTENT,
                    });
                }
                sizes.push((line_no, caps["id"].to_string(), size));
                continue;
            }

            if let Some(caps) = SIDE_RE.captures(&statement) {
                let side = LinkSide::from_token(&caps["side"]).ok_or_else(|| ParseError::Side {
                    line: line_no,
                    side: caps["side"].to_string(),
                })?;
                sides.push((line_no, caps["id"].to_string(), side));
                continue;
            }

            if let Some(caps) = COLUMN_RE.captures(&statement) {
                let column = parse_int(&caps[1], line_no)?;
                for entry in split_outside(&caps[2], ',') {
                    if entry.is_empty() {
                        continue;
                    }
                    let item = parse_item(&entry, column, line_no)?;
                    let id = item.id.clone();
                    if !graph.add_item(item) {
                        return Err(ParseError::DuplicateItem { line: line_no, id });
                    }
                }
                continue;
            }

            if ARROW_TOKEN_RE.is_match(&statement) {
                pending.extend(parse_link_chain(&statement, line_no)?);
                continue;
            }

            return Err(ParseError::Syntax {
                line: line_no,
                text: statement,
            });
        }
    }

    for link in pending {
        for id in [&link.from, &link.to] {
            if graph.item(id).is_none() {
                return Err(ParseError::UnknownItem {
                    line: link.line,
                    id: id.clone(),
                });
            }
        }
        graph.add_link(&link.from, &link.to, link.directed);
    }
    for (line, id, size) in sizes {
        let item = graph
            .item_mut(&id)
            .ok_or(ParseError::UnknownItem { line, id: id.clone() })?;
        item.size = Some(size);
    }
    for (line, id, side) in sides {
        let item = graph
            .item_mut(&id)
            .ok_or(ParseError::UnknownItem { line, id: id.clone() })?;
        item.side = Some(side);
    }

    tracing::debug!(
        items = graph.items.len(),
        links = graph.links.len(),
        "parsed graph document"
    );
    Ok(graph)
}

fn parse_int(value: &str, line: usize) -> Result<i32, ParseError> {
    value.trim().parse::<i32>().map_err(|_| ParseError::Number {
        line,
        value: value.to_string(),
    })
}

fn extent_in_range(size: Size) -> bool {
    let range = 0..=MAX_ITEM_EXTENT;
    range.contains(&size.width) && range.contains(&size.height)
}

fn parse_item(entry: &str, column: i32, line: usize) -> Result<Item, ParseError> {
    let Some(caps) = ITEM_RE.captures(entry) else {
        return Err(ParseError::Syntax {
            line,
            text: entry.to_string(),
        });
    };
    let mut item = Item::new(&caps["id"], column);
    if let Some(label) = caps.name("label") {
        let label = unquote(label.as_str().trim());
        if !label.is_empty() {
            item.label = label.to_string();
        }
    }
    Ok(item)
}

/// `A --> B --- C <-- D` becomes one link per arrow.
fn parse_link_chain(statement: &str, line: usize) -> Result<Vec<PendingLink>, ParseError> {
    let mut ids = Vec::new();
    let mut arrows = Vec::new();
    let mut last = 0;
    for found in ARROW_TOKEN_RE.find_iter(statement) {
        ids.push(statement[last..found.start()].trim());
        arrows.push(found.as_str());
        last = found.end();
    }
    ids.push(statement[last..].trim());

    if let Some(bad) = ids.iter().find(|id| !ID_RE.is_match(id)) {
        return Err(ParseError::Syntax {
            line,
            text: if bad.is_empty() {
                statement.to_string()
            } else {
                bad.to_string()
            },
        });
    }

    Ok(arrows
        .iter()
        .enumerate()
        .map(|(idx, arrow)| {
            let (left, right) = (ids[idx].to_string(), ids[idx + 1].to_string());
            match *arrow {
                "<--" => PendingLink {
                    line,
                    from: right,
                    to: left,
                    directed: true,
                },
                "---" => PendingLink {
                    line,
                    from: left,
                    to: right,
                    directed: false,
                },
                _ => PendingLink {
                    line,
                    from: left,
                    to: right,
                    directed: true,
                },
            }
        })
        .collect())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

/// Splits on `delim` outside quotes and square brackets, trimming each part.
fn split_outside(line: &str, delim: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = (depth - 1).max(0);
                current.push(ch);
            }
            _ if ch == delim && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim_end().to_string()
}
