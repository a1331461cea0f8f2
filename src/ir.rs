use crate::layout::{ColumnGraph, LinkSide, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub column: i32,
    /// Explicit size; measured from the label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Side used for same-column links leaving this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<LinkSide>,
}

impl Item {
    pub fn new(id: &str, column: i32) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            column,
            size: None,
            side: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    /// Undirected links relate both items to each other.
    #[serde(default = "default_directed")]
    pub directed: bool,
}

fn default_directed() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// In declaration order.
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_column: Option<i32>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Adds `item` unless its id is taken. Returns whether it was added.
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.item(&item.id).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn add_link(&mut self, from: &str, to: &str, directed: bool) {
        self.links.push(LinkSpec {
            from: from.to_string(),
            to: to.to_string(),
            directed,
        });
    }

    /// Hashed view for repeated relation queries during layout.
    pub fn index(&self) -> GraphIndex<'_> {
        let mut columns = HashMap::with_capacity(self.items.len());
        let mut sides = HashMap::new();
        for item in &self.items {
            columns.insert(item.id.as_str(), item.column);
            if let Some(side) = item.side {
                sides.insert(item.id.as_str(), side);
            }
        }
        let mut links: HashMap<&str, HashSet<&str>> = HashMap::new();
        for link in &self.links {
            links
                .entry(link.from.as_str())
                .or_default()
                .insert(link.to.as_str());
            if !link.directed {
                links
                    .entry(link.to.as_str())
                    .or_default()
                    .insert(link.from.as_str());
            }
        }
        GraphIndex {
            columns,
            sides,
            links,
        }
    }
}

impl ColumnGraph<String> for Graph {
    fn column_of(&self, item: &String) -> i32 {
        self.item(item).map(|item| item.column).unwrap_or(0)
    }

    fn linked(&self, from: &String, to: &String) -> bool {
        self.links.iter().any(|link| {
            (link.from == *from && link.to == *to)
                || (!link.directed && link.from == *to && link.to == *from)
        })
    }

    fn same_column_side(&self, from: &String, _to: &String) -> LinkSide {
        self.item(from).and_then(|item| item.side).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct GraphIndex<'a> {
    columns: HashMap<&'a str, i32>,
    sides: HashMap<&'a str, LinkSide>,
    links: HashMap<&'a str, HashSet<&'a str>>,
}

impl ColumnGraph<String> for GraphIndex<'_> {
    fn column_of(&self, item: &String) -> i32 {
        self.columns.get(item.as_str()).copied().unwrap_or(0)
    }

    fn linked(&self, from: &String, to: &String) -> bool {
        self.links
            .get(from.as_str())
            .is_some_and(|targets| targets.contains(to.as_str()))
    }

    fn same_column_side(&self, from: &String, _to: &String) -> LinkSide {
        self.sides.get(from.as_str()).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        graph.add_item(Item::new("A", 0));
        graph.add_item(Item::new("B", 1));
        graph.add_item(Item {
            side: Some(LinkSide::Left),
            ..Item::new("C", 1)
        });
        graph.add_link("A", "B", true);
        graph.add_link("B", "C", false);
        graph
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut graph = sample();
        assert!(!graph.add_item(Item::new("A", 3)));
        assert_eq!(graph.items.len(), 3);
        assert_eq!(graph.item("A").map(|item| item.column), Some(0));
    }

    #[test]
    fn index_agrees_with_linear_lookup() {
        let graph = sample();
        let index = graph.index();
        let ids: Vec<String> = ["A", "B", "C", "missing"].iter().map(|s| s.to_string()).collect();
        for from in &ids {
            assert_eq!(graph.column_of(from), index.column_of(from));
            for to in &ids {
                assert_eq!(
                    graph.linked(from, to),
                    index.linked(from, to),
                    "{from} -> {to}"
                );
                assert_eq!(graph.same_column_side(from, to), index.same_column_side(from, to));
            }
        }
    }

    #[test]
    fn undirected_links_relate_both_ways() {
        let graph = sample();
        let (a, b, c) = ("A".to_string(), "B".to_string(), "C".to_string());
        assert!(graph.linked(&a, &b));
        assert!(!graph.linked(&b, &a));
        assert!(graph.linked(&b, &c));
        assert!(graph.linked(&c, &b));
        assert_eq!(graph.same_column_side(&c, &b), LinkSide::Left);
        assert_eq!(graph.same_column_side(&b, &c), LinkSide::Right);
    }
}
