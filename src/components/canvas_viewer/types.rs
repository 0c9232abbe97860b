//! JSON Canvas data structures and the loaded, indexed document.

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;

use super::error::{Result, ViewerError};
use super::transform::{Point, Rect};

/// The closed set of node kinds a canvas may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// Labeled background region.
	Group,
	/// Embedded file or image.
	File,
	/// Text card.
	Text,
	/// Embedded web page.
	Link,
}

/// Side of a node rectangle an edge leaves from or enters at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	/// Upper edge.
	Top,
	/// Lower edge.
	Bottom,
	/// Left edge.
	Left,
	/// Right edge.
	Right,
}

/// A positioned node. Geometry is in world units.
#[derive(Clone, Debug, Deserialize)]
pub struct CanvasNode {
	/// Stable key referenced by edges.
	pub id: String,
	/// Node kind, `type` in the file.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Extent along x.
	pub width: f64,
	/// Extent along y.
	pub height: f64,
	/// Preset index ("1".."6") or a `#rrggbb` hex color.
	#[serde(default)]
	pub color: Option<String>,
	/// Group caption.
	#[serde(default)]
	pub label: Option<String>,
	/// Text node body.
	#[serde(default)]
	pub text: Option<String>,
	/// Linked file name for file nodes.
	#[serde(default)]
	pub file: Option<String>,
	/// Target of link nodes.
	#[serde(default)]
	pub url: Option<String>,
}

impl CanvasNode {
	/// World-space rectangle.
	pub fn rect(&self) -> Rect {
		Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
	}

	/// Inclusive containment: points on the border count as inside.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	/// Point where an edge attaches on `side`; the center when no side is given.
	pub fn anchor(&self, side: Option<Side>) -> Point {
		let mid_x = self.x + self.width / 2.0;
		let mid_y = self.y + self.height / 2.0;
		match side {
			Some(Side::Top) => Point::new(mid_x, self.y),
			Some(Side::Bottom) => Point::new(mid_x, self.y + self.height),
			Some(Side::Left) => Point::new(self.x, mid_y),
			Some(Side::Right) => Point::new(self.x + self.width, mid_y),
			None => Point::new(mid_x, mid_y),
		}
	}
}

/// A directed, curved connection between two nodes.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
	/// Key of the cached curve.
	pub id: String,
	/// Source node id.
	pub from_node: String,
	/// Side the edge leaves from.
	#[serde(default)]
	pub from_side: Option<Side>,
	/// Target node id; the arrowhead points here.
	pub to_node: String,
	/// Side the edge enters at.
	#[serde(default)]
	pub to_side: Option<Side>,
	/// Text drawn at the curve midpoint.
	#[serde(default)]
	pub label: Option<String>,
}

/// Raw canvas file contents.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CanvasData {
	#[serde(default)]
	pub nodes: Vec<CanvasNode>,
	#[serde(default)]
	pub edges: Vec<CanvasEdge>,
}

impl CanvasData {
	/// Parses a JSON Canvas file.
	pub fn from_json(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(ViewerError::InvalidDocument)
	}
}

/// Bounding box of every node in the document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBounds {
	/// Leftmost node edge.
	pub min_x: f64,
	/// Topmost node edge.
	pub min_y: f64,
	/// Rightmost node edge.
	pub max_x: f64,
	/// Bottommost node edge.
	pub max_y: f64,
	/// `max_x - min_x`.
	pub width: f64,
	/// `max_y - min_y`.
	pub height: f64,
	/// Horizontal center.
	pub center_x: f64,
	/// Vertical center.
	pub center_y: f64,
}

impl NodeBounds {
	/// Returns `None` for an empty node list.
	pub fn from_nodes(nodes: &[CanvasNode]) -> Option<Self> {
		if nodes.is_empty() {
			return None;
		}
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for node in nodes {
			min_x = min_x.min(node.x);
			min_y = min_y.min(node.y);
			max_x = max_x.max(node.x + node.width);
			max_y = max_y.max(node.y + node.height);
		}
		let (width, height) = (max_x - min_x, max_y - min_y);
		Some(Self {
			min_x,
			min_y,
			max_x,
			max_y,
			width,
			height,
			center_x: min_x + width / 2.0,
			center_y: min_y + height / 2.0,
		})
	}
}

/// Loaded canvas: validated nodes, edges, an id lookup, and bounds.
///
/// Immutable for the lifetime of one load; the engine only reads it.
#[derive(Clone, Debug, Default)]
pub struct CanvasDocument {
	nodes: Vec<CanvasNode>,
	edges: Vec<CanvasEdge>,
	index: HashMap<String, usize>,
	bounds: Option<NodeBounds>,
}

impl CanvasDocument {
	/// Drops nodes with an empty rectangle and reduces local file paths to
	/// their file name.
	pub fn new(data: CanvasData) -> Self {
		let CanvasData { nodes, edges } = data;
		let nodes: Vec<CanvasNode> = nodes
			.into_iter()
			.filter_map(|mut node| {
				if !(node.width > 0.0 && node.height > 0.0) {
					warn!("canvas-viewer: dropping node {} with empty rectangle", node.id);
					return None;
				}
				if node.kind == NodeKind::File {
					node.file = node.file.map(|file| file_basename(&file));
				}
				Some(node)
			})
			.collect();

		let index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		let bounds = NodeBounds::from_nodes(&nodes);

		Self {
			nodes,
			edges,
			index,
			bounds,
		}
	}

	/// Nodes in document order, which is also draw order.
	pub fn nodes(&self) -> &[CanvasNode] {
		&self.nodes
	}

	/// Every edge, including ones with missing endpoints.
	pub fn edges(&self) -> &[CanvasEdge] {
		&self.edges
	}

	/// Bounds of all nodes; `None` when there are none.
	pub fn bounds(&self) -> Option<NodeBounds> {
		self.bounds
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&CanvasNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Looks up both endpoints of an edge.
	pub fn endpoints(&self, edge: &CanvasEdge) -> Result<(&CanvasNode, &CanvasNode)> {
		let missing = |node: &str| ViewerError::MissingNode {
			edge: edge.id.clone(),
			node: node.to_string(),
		};
		let from = self.node(&edge.from_node).ok_or_else(|| missing(&edge.from_node))?;
		let to = self.node(&edge.to_node).ok_or_else(|| missing(&edge.to_node))?;
		Ok((from, to))
	}
}

/// Local paths are reduced to their last component; URLs are left alone.
fn file_basename(file: &str) -> String {
	if file.contains("http") {
		return file.to_string();
	}
	file.rsplit('/').next().unwrap_or(file).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r##"{
		"nodes": [
			{ "id": "g", "type": "group", "x": -100, "y": -100, "width": 400, "height": 300, "label": "Group", "color": "2" },
			{ "id": "t", "type": "text", "x": 0, "y": 0, "width": 100, "height": 50, "text": "hello" },
			{ "id": "f", "type": "file", "x": 150, "y": 0, "width": 100, "height": 50, "file": "notes/deep/readme.md" },
			{ "id": "bad", "type": "text", "x": 0, "y": 0, "width": 0, "height": 10, "text": "" }
		],
		"edges": [
			{ "id": "e1", "fromNode": "t", "fromSide": "right", "toNode": "f", "toSide": "left", "label": "to" },
			{ "id": "e2", "fromNode": "t", "toNode": "ghost" }
		]
	}"##;

	#[test]
	fn parses_json_canvas() {
		let data = CanvasData::from_json(SAMPLE).unwrap();
		assert_eq!(data.nodes.len(), 4);
		assert_eq!(data.nodes[0].kind, NodeKind::Group);
		assert_eq!(data.edges[0].from_side, Some(Side::Right));
		assert_eq!(data.edges[1].to_side, None);
	}

	#[test]
	fn rejects_malformed_json() {
		assert!(matches!(
			CanvasData::from_json("{ nodes: 1 }"),
			Err(ViewerError::InvalidDocument(_))
		));
	}

	#[test]
	fn document_drops_empty_nodes_and_strips_paths() {
		let doc = CanvasDocument::new(CanvasData::from_json(SAMPLE).unwrap());
		assert_eq!(doc.nodes().len(), 3);
		assert!(doc.node("bad").is_none());
		assert_eq!(doc.node("f").unwrap().file.as_deref(), Some("readme.md"));
	}

	#[test]
	fn bounds_cover_all_nodes() {
		let doc = CanvasDocument::new(CanvasData::from_json(SAMPLE).unwrap());
		let b = doc.bounds().unwrap();
		assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-100.0, -100.0, 300.0, 200.0));
		assert_eq!((b.center_x, b.center_y), (100.0, 50.0));
		assert!(NodeBounds::from_nodes(&[]).is_none());
	}

	#[test]
	fn missing_endpoint_is_reported() {
		let doc = CanvasDocument::new(CanvasData::from_json(SAMPLE).unwrap());
		assert!(doc.endpoints(&doc.edges()[0]).is_ok());
		match doc.endpoints(&doc.edges()[1]) {
			Err(ViewerError::MissingNode { edge, node }) => {
				assert_eq!(edge, "e2");
				assert_eq!(node, "ghost");
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn anchors_sit_on_side_midpoints() {
		let doc = CanvasDocument::new(CanvasData::from_json(SAMPLE).unwrap());
		let t = doc.node("t").unwrap();
		assert_eq!(t.anchor(Some(Side::Top)), Point::new(50.0, 0.0));
		assert_eq!(t.anchor(Some(Side::Bottom)), Point::new(50.0, 50.0));
		assert_eq!(t.anchor(Some(Side::Left)), Point::new(0.0, 25.0));
		assert_eq!(t.anchor(Some(Side::Right)), Point::new(100.0, 25.0));
		assert_eq!(t.anchor(None), Point::new(50.0, 25.0));
	}
}
