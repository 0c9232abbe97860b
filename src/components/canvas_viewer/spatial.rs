//! Uniform-grid spatial index used as a pre-filter for hit-testing.
//!
//! Nodes are bucketed into every grid cell their rectangle overlaps, so a
//! query touches exactly one cell. Nodes covering more than
//! [`MAX_CELLS_PER_NODE`] cells are kept in a side list checked by every
//! query instead. The grid is rebuilt wholesale when the node set changes and
//! is only built above a node-count threshold; below it a full scan is
//! cheaper.

use std::collections::HashMap;
use std::iter::Peekable;
use std::ops::Range;
use std::slice;

use log::debug;

use super::transform::Point;
use super::types::CanvasNode;

/// Grid cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f64 = 800.0;
/// Node count below which no grid is built.
pub const DEFAULT_THRESHOLD: usize = 50;
/// Nodes overlapping more cells than this skip the grid.
const MAX_CELLS_PER_NODE: i128 = 64;

type Cell = (i64, i64);

/// Candidate node indices for a query, ascending.
pub enum Candidates<'a> {
	/// No grid: every node is a candidate.
	All(Range<usize>),
	/// Nodes bucketed in the queried cell, merged with the oversized nodes.
	Grid {
		cell: Peekable<slice::Iter<'a, usize>>,
		oversized: Peekable<slice::Iter<'a, usize>>,
	},
}

impl Iterator for Candidates<'_> {
	type Item = usize;

	fn next(&mut self) -> Option<usize> {
		match self {
			Candidates::All(range) => range.next(),
			Candidates::Grid { cell, oversized } => {
				let from_oversized = match (cell.peek(), oversized.peek()) {
					(Some(a), Some(b)) => b < a,
					(Some(_), None) => false,
					(None, _) => true,
				};
				if from_oversized {
					oversized.next().copied()
				} else {
					cell.next().copied()
				}
			}
		}
	}
}

#[derive(Clone, Debug, Default)]
struct Grid {
	cells: HashMap<Cell, Vec<usize>>,
	oversized: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct SpatialIndex {
	cell_size: f64,
	threshold: usize,
	node_count: usize,
	grid: Option<Grid>,
}

impl Default for SpatialIndex {
	fn default() -> Self {
		Self::new(DEFAULT_CELL_SIZE, DEFAULT_THRESHOLD)
	}
}

impl SpatialIndex {
	pub fn new(cell_size: f64, threshold: usize) -> Self {
		Self {
			cell_size: if cell_size > 0.0 { cell_size } else { DEFAULT_CELL_SIZE },
			threshold,
			node_count: 0,
			grid: None,
		}
	}

	fn cell_of(&self, x: f64, y: f64) -> Cell {
		(
			(x / self.cell_size).floor() as i64,
			(y / self.cell_size).floor() as i64,
		)
	}

	/// Clears and refills the grid from `nodes`.
	pub fn rebuild(&mut self, nodes: &[CanvasNode]) {
		self.node_count = nodes.len();
		if nodes.len() < self.threshold {
			self.grid = None;
			return;
		}

		let mut grid = Grid::default();
		for (i, node) in nodes.iter().enumerate() {
			let (min_col, min_row) = self.cell_of(node.x, node.y);
			let (max_col, max_row) = self.cell_of(node.x + node.width, node.y + node.height);
			let cols = i128::from(max_col) - i128::from(min_col) + 1;
			let rows = i128::from(max_row) - i128::from(min_row) + 1;
			if cols.saturating_mul(rows) > MAX_CELLS_PER_NODE {
				grid.oversized.push(i);
				continue;
			}
			for col in min_col..=max_col {
				for row in min_row..=max_row {
					grid.cells.entry((col, row)).or_default().push(i);
				}
			}
		}
		debug!(
			"canvas-viewer: spatial grid built, {} nodes in {} cells, {} oversized",
			nodes.len(),
			grid.cells.len(),
			grid.oversized.len()
		);
		self.grid = Some(grid);
	}

	/// Candidate node indices for the cell containing the world point.
	pub fn query(&self, world: Point) -> Candidates<'_> {
		match &self.grid {
			None => Candidates::All(0..self.node_count),
			Some(grid) => {
				let cell = self.cell_of(world.x, world.y);
				Candidates::Grid {
					cell: grid.cells.get(&cell).map(|v| v.as_slice()).unwrap_or(&[]).iter().peekable(),
					oversized: grid.oversized.iter().peekable(),
				}
			}
		}
	}

	/// First interactive node containing `world`, in iteration order.
	pub fn hit_test(
		&self,
		nodes: &[CanvasNode],
		world: Point,
		is_interactive: impl Fn(&CanvasNode) -> bool,
	) -> Option<usize> {
		first_hit(self.query(world), nodes, world, is_interactive)
	}
}

fn first_hit(
	candidates: impl Iterator<Item = usize>,
	nodes: &[CanvasNode],
	world: Point,
	is_interactive: impl Fn(&CanvasNode) -> bool,
) -> Option<usize> {
	candidates
		.filter_map(|i| nodes.get(i).map(|node| (i, node)))
		.find(|(_, node)| node.contains(world) && is_interactive(node))
		.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
	use super::super::types::NodeKind;
	use super::*;

	/// Deterministic pseudo-random in [0, 1).
	fn pseudo_random(seed: f64) -> f64 {
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}

	fn node(i: usize, x: f64, y: f64, width: f64, height: f64, kind: NodeKind) -> CanvasNode {
		CanvasNode {
			id: format!("n{i}"),
			kind,
			x,
			y,
			width,
			height,
			color: None,
			label: None,
			text: Some(String::new()),
			file: None,
			url: None,
		}
	}

	fn layout(seed: f64, count: usize) -> Vec<CanvasNode> {
		(0..count)
			.map(|i| {
				let s = seed * 1000.0 + i as f64;
				let kind = if pseudo_random(s * 5.3) < 0.2 {
					NodeKind::Group
				} else {
					NodeKind::Text
				};
				node(
					i,
					pseudo_random(s * 1.1) * 6000.0 - 3000.0,
					pseudo_random(s * 2.3) * 6000.0 - 3000.0,
					20.0 + pseudo_random(s * 3.7) * 1500.0,
					20.0 + pseudo_random(s * 4.1) * 1500.0,
					kind,
				)
			})
			.collect()
	}

	fn interactive(node: &CanvasNode) -> bool {
		node.kind != NodeKind::Group
	}

	/// Exhaustive hit-test over every node.
	fn scan(nodes: &[CanvasNode], world: Point, is_interactive: impl Fn(&CanvasNode) -> bool) -> Option<usize> {
		first_hit(0..nodes.len(), nodes, world, is_interactive)
	}

	fn bucketed(index: &SpatialIndex) -> usize {
		index.grid.as_ref().map_or(0, |g| g.cells.values().map(Vec::len).sum())
	}

	#[test]
	fn index_matches_scan_on_random_layouts() {
		for layout_seed in 0..100 {
			let count = if layout_seed % 2 == 0 { 120 } else { 30 };
			let nodes = layout(layout_seed as f64 + 0.5, count);
			let mut index = SpatialIndex::default();
			index.rebuild(&nodes);
			assert_eq!(index.grid.is_some(), count >= DEFAULT_THRESHOLD);

			for q in 0..1000 {
				let s = layout_seed as f64 * 7919.0 + q as f64;
				let p = Point::new(
					pseudo_random(s * 6.7) * 8000.0 - 4000.0,
					pseudo_random(s * 7.9) * 8000.0 - 4000.0,
				);
				assert_eq!(
					index.hit_test(&nodes, p, interactive),
					scan(&nodes, p, interactive),
					"layout {layout_seed}, point {p:?}"
				);
			}
		}
	}

	#[test]
	fn below_threshold_returns_all_nodes() {
		let nodes = layout(3.0, 10);
		let mut index = SpatialIndex::default();
		index.rebuild(&nodes);
		assert!(index.grid.is_none());
		assert_eq!(index.query(Point::new(1e9, 1e9)).count(), 10);
	}

	#[test]
	fn node_spanning_cells_is_in_each() {
		let mut nodes = vec![node(0, 700.0, 700.0, 200.0, 200.0, NodeKind::Text)];
		nodes.extend((1..60).map(|i| node(i, 10_000.0 + i as f64 * 10.0, 0.0, 5.0, 5.0, NodeKind::Text)));
		let mut index = SpatialIndex::default();
		index.rebuild(&nodes);
		for p in [
			Point::new(750.0, 750.0),
			Point::new(850.0, 750.0),
			Point::new(750.0, 850.0),
			Point::new(850.0, 850.0),
		] {
			assert!(index.query(p).any(|i| i == 0), "{p:?}");
			assert_eq!(index.hit_test(&nodes, p, interactive), Some(0));
		}
	}

	#[test]
	fn huge_node_skips_the_grid() {
		let mut nodes: Vec<CanvasNode> = (0..60)
			.map(|i| node(i, i as f64 * 900.0, 0.0, 50.0, 50.0, NodeKind::Text))
			.collect();
		// Covers about 6e12 cells at the default size.
		nodes.insert(3, node(3, -1e9, -1e9, 2e9, 2e9, NodeKind::Text));
		nodes.push(node(61, -1e300, -1e300, f64::MAX, f64::MAX, NodeKind::Text));
		let mut index = SpatialIndex::default();
		index.rebuild(&nodes);
		assert_eq!(bucketed(&index), 60);

		let candidates: Vec<usize> = index.query(Point::new(10.0, 10.0)).collect();
		assert_eq!(candidates, vec![0, 3, 61]);
		assert_eq!(index.hit_test(&nodes, Point::new(10.0, 10.0), interactive), Some(0));
		assert_eq!(index.hit_test(&nodes, Point::new(1e6, 1e6), interactive), Some(3));
		assert_eq!(index.hit_test(&nodes, Point::new(2e9, 2e9), interactive), Some(61));
		for p in [Point::new(910.0, 10.0), Point::new(-5e8, 1e6), Point::new(4e6, -20.0)] {
			assert_eq!(
				index.hit_test(&nodes, p, interactive),
				scan(&nodes, p, interactive),
				"{p:?}"
			);
		}
	}

	#[test]
	fn empty_cell_has_no_candidates() {
		let nodes = layout(9.0, 60);
		let mut index = SpatialIndex::default();
		index.rebuild(&nodes);
		assert_eq!(index.query(Point::new(1e7, 1e7)).count(), 0);
	}

	#[test]
	fn non_interactive_nodes_are_skipped() {
		let nodes = vec![
			node(0, 0.0, 0.0, 500.0, 500.0, NodeKind::Group),
			node(1, 100.0, 100.0, 50.0, 50.0, NodeKind::Text),
		];
		assert_eq!(scan(&nodes, Point::new(10.0, 10.0), interactive), None);
		assert_eq!(scan(&nodes, Point::new(120.0, 120.0), interactive), Some(1));
	}
}
