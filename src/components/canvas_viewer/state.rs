//! Viewer engine state.
//!
//! Owns the viewport, gesture recognizer, zoom animator, spatial index, render
//! scheduler, and edge geometry cache for one loaded document. Input handlers
//! only mutate state and mark the scheduler dirty; all drawing happens in
//! [`CanvasViewerState::frame`], at most once per display refresh.

use log::{debug, info};

use super::classifier::{DefaultClassifier, Interaction, NodeClassifier};
use super::config::{ControlSchema, ViewerConfig};
use super::error::{Result, ViewerError};
use super::geometry::EdgeGeometryCache;
use super::gesture::{ContactTarget, GestureRecognizer, Intent, PointerId, PointerInput, WheelInput};
use super::scheduler::{FrameDecision, FrameTargets, RenderScheduler, Scene};
use super::spatial::SpatialIndex;
use super::transform::{Point, Viewport, container_to_world, screen_to_world};
use super::types::{CanvasData, CanvasDocument, CanvasNode};
use super::zoom::ZoomAnimator;

/// Events delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
	/// A normalized intent, before the engine applies it.
	Intent(Intent),
	/// A click resolved to an interactive node.
	Interact {
		/// Node id.
		node: String,
		/// How the node responds.
		interaction: Interaction,
	},
	/// A click hit nothing while a node was selected.
	SelectionCleared,
}

type Listener = Box<dyn FnMut(&ViewerEvent)>;

/// How a zoom intent reaches the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZoomPath {
	/// Applied immediately (pinch).
	Direct,
	/// Eased by the animator (wheel).
	Animated,
}

/// The viewer engine for one loaded document.
///
/// Every operation after [`dispose`](Self::dispose) fails with
/// [`ViewerError::Disposed`].
pub struct CanvasViewerState {
	config: ViewerConfig,
	document: CanvasDocument,
	viewport: Viewport,
	/// Container origin on screen.
	origin: Point,
	gestures: GestureRecognizer,
	zoom: ZoomAnimator,
	index: SpatialIndex,
	scheduler: RenderScheduler,
	edges: EdgeGeometryCache,
	classifier: Box<dyn NodeClassifier>,
	selected: Option<String>,
	selection_dirty: bool,
	listeners: Vec<Listener>,
	disposed: bool,
}

impl CanvasViewerState {
	/// Engine for a `width` x `height` container, fitted to the document,
	/// using [`DefaultClassifier`].
	pub fn new(data: CanvasData, config: ViewerConfig, width: f64, height: f64) -> Self {
		Self::with_classifier(data, config, width, height, Box::new(DefaultClassifier))
	}

	/// Like [`new`](Self::new) with a custom click policy. Out-of-range
	/// config values fall back to their defaults.
	pub fn with_classifier(
		data: CanvasData,
		config: ViewerConfig,
		width: f64,
		height: f64,
		classifier: Box<dyn NodeClassifier>,
	) -> Self {
		let config = config.validated();
		let document = CanvasDocument::new(data);
		let mut index = SpatialIndex::new(config.spatial.cell_size, config.spatial.threshold);
		index.rebuild(document.nodes());

		let mut viewport = Viewport::new(width, height);
		if let Some(bounds) = document.bounds() {
			viewport.fit(&bounds, config.initial_padding);
		}
		info!(
			"canvas-viewer: loaded {} nodes, {} edges at scale {:.3}",
			document.nodes().len(),
			document.edges().len(),
			viewport.scale()
		);

		Self {
			gestures: GestureRecognizer::new(config.gestures.clone()),
			zoom: ZoomAnimator::new(config.zoom.clone()),
			scheduler: RenderScheduler::new(config.render.clone()),
			config,
			document,
			viewport,
			origin: Point::default(),
			index,
			edges: EdgeGeometryCache::default(),
			classifier,
			selected: None,
			selection_dirty: false,
			listeners: Vec::new(),
			disposed: false,
		}
	}

	fn ensure_live(&self) -> Result<()> {
		if self.disposed {
			Err(ViewerError::Disposed)
		} else {
			Ok(())
		}
	}

	/// The loaded document.
	pub fn document(&self) -> &CanvasDocument {
		&self.document
	}

	/// Current view.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Effective (validated) configuration.
	pub fn config(&self) -> &ViewerConfig {
		&self.config
	}

	/// Id of the selected node.
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// Whether [`dispose`](Self::dispose) was called.
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// Whether the next [`frame`](Self::frame) may draw anything.
	pub fn needs_frame(&self) -> bool {
		!self.disposed && (self.scheduler.is_dirty() || self.zoom.is_active())
	}

	/// Releases listeners and stops input. Every later operation fails with
	/// [`ViewerError::Disposed`].
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		self.disposed = true;
		self.gestures.stop();
		self.zoom.cancel();
		self.listeners.clear();
		info!("canvas-viewer: disposed");
	}

	/// Registers a listener for intents and click results.
	pub fn subscribe(&mut self, listener: impl FnMut(&ViewerEvent) + 'static) -> Result<()> {
		self.ensure_live()?;
		self.listeners.push(Box::new(listener));
		Ok(())
	}

	fn emit(&mut self, event: ViewerEvent) {
		for listener in &mut self.listeners {
			listener(&event);
		}
	}

	/// Replaces the document. The spatial index and edge cache are rebuilt.
	pub fn set_data(&mut self, data: CanvasData) -> Result<()> {
		self.ensure_live()?;
		self.document = CanvasDocument::new(data);
		self.index.rebuild(self.document.nodes());
		self.edges.clear();
		if let Some(id) = self.selected.as_deref()
			&& self.document.node(id).is_none()
		{
			self.selected = None;
			self.selection_dirty = true;
		}
		self.scheduler.invalidate();
		Ok(())
	}

	// Input

	/// Updates the container's on-screen origin.
	pub fn set_origin(&mut self, origin: Point) -> Result<()> {
		self.ensure_live()?;
		self.origin = origin;
		self.gestures.set_origin(origin);
		Ok(())
	}

	/// Contact start.
	pub fn pointer_down(&mut self, input: PointerInput) -> Result<()> {
		self.ensure_live()?;
		self.gestures.pointer_down(input, self.viewport.scale());
		Ok(())
	}

	/// Contact move.
	pub fn pointer_move(&mut self, id: PointerId, position: Point) -> Result<()> {
		self.pointer_moves(&[(id, position)])
	}

	/// Coalesced moves of several contacts.
	pub fn pointer_moves(&mut self, moves: &[(PointerId, Point)]) -> Result<()> {
		self.ensure_live()?;
		let intents = self.gestures.pointer_moves(moves, self.viewport.scale());
		self.apply(intents, ZoomPath::Direct);
		Ok(())
	}

	/// Contact end; may pan or click.
	pub fn pointer_up(&mut self, id: PointerId, position: Point) -> Result<()> {
		self.ensure_live()?;
		let intents = self.gestures.pointer_up(id, position);
		self.apply(intents, ZoomPath::Direct);
		Ok(())
	}

	/// Contact lost without an end event.
	pub fn pointer_cancel(&mut self, id: PointerId) -> Result<()> {
		self.ensure_live()?;
		self.gestures.pointer_cancel(id);
		Ok(())
	}

	/// Wheel or trackpad input. Zoom is eased over the following frames.
	pub fn wheel(&mut self, input: WheelInput) -> Result<()> {
		self.ensure_live()?;
		let intents = self.gestures.wheel(input);
		self.apply(intents, ZoomPath::Animated);
		Ok(())
	}

	/// Resumes input handling after [`stop_interaction`](Self::stop_interaction).
	pub fn start_interaction(&mut self) -> Result<()> {
		self.ensure_live()?;
		self.gestures.start();
		Ok(())
	}

	/// Ignores input, for example while a modal preview is shown.
	pub fn stop_interaction(&mut self) -> Result<()> {
		self.ensure_live()?;
		self.gestures.stop();
		Ok(())
	}

	/// Switches how wheel input is interpreted.
	pub fn set_control_schema(&mut self, schema: ControlSchema) -> Result<()> {
		self.ensure_live()?;
		self.gestures.set_control_schema(schema);
		Ok(())
	}

	fn apply(&mut self, intents: Vec<Intent>, path: ZoomPath) {
		for intent in intents {
			self.emit(ViewerEvent::Intent(intent.clone()));
			match intent {
				Intent::Pan { dx, dy } => {
					self.viewport.pan_by(dx, dy);
					self.scheduler.mark_dirty();
				}
				Intent::Zoom { factor, anchor } => match path {
					ZoomPath::Direct => {
						self.zoom.cancel();
						if self.viewport.zoom_by(factor, anchor) {
							self.scheduler.mark_dirty();
						}
					}
					ZoomPath::Animated => {
						let base = self.zoom.target_scale().unwrap_or(self.viewport.scale());
						self.zoom.request_zoom(base * factor, anchor);
					}
				},
				Intent::Click { position, target } => self.dispatch_click(position, target),
			}
		}
	}

	fn dispatch_click(&mut self, position: Point, target: ContactTarget) {
		if target == ContactTarget::Control {
			debug!("canvas-viewer: click on a control, not resolving");
			return;
		}
		let world = container_to_world(position, &self.viewport);
		let classifier = &*self.classifier;
		let hit = self
			.index
			.hit_test(self.document.nodes(), world, |node| classifier.is_interactive(node))
			.map(|i| {
				let node = &self.document.nodes()[i];
				(node.id.clone(), classifier.classify(node))
			});

		match hit {
			Some((node, interaction)) => {
				debug!("canvas-viewer: click on {node} ({interaction:?})");
				if interaction == Interaction::Select {
					self.set_selection(Some(node.clone()));
				}
				self.emit(ViewerEvent::Interact { node, interaction });
			}
			None if self.selected.is_some() => {
				self.set_selection(None);
				self.emit(ViewerEvent::SelectionCleared);
			}
			None => {}
		}
	}

	fn set_selection(&mut self, id: Option<String>) {
		if self.selected != id {
			self.selected = id;
			self.selection_dirty = true;
			self.scheduler.mark_dirty();
		}
	}

	// Programmatic view control

	/// Selects a node by id; unknown ids and `None` clear the selection.
	pub fn select(&mut self, id: Option<&str>) -> Result<()> {
		self.ensure_live()?;
		let id = id.filter(|id| self.document.node(id).is_some()).map(str::to_string);
		self.set_selection(id);
		Ok(())
	}

	/// Eases the scale up by the configured step around the container center.
	pub fn zoom_in(&mut self) -> Result<()> {
		self.zoom_step(self.config.zoom.step)
	}

	/// Eases the scale down by the configured step around the container center.
	pub fn zoom_out(&mut self) -> Result<()> {
		self.zoom_step(1.0 / self.config.zoom.step)
	}

	fn zoom_step(&mut self, factor: f64) -> Result<()> {
		self.ensure_live()?;
		let base = self.zoom.target_scale().unwrap_or(self.viewport.scale());
		self.zoom.request_zoom(base * factor, self.viewport.center());
		Ok(())
	}

	/// Eases to an absolute scale around the container center.
	pub fn set_scale(&mut self, scale: f64) -> Result<()> {
		self.ensure_live()?;
		self.zoom.request_zoom(scale, self.viewport.center());
		Ok(())
	}

	/// Centers a world point.
	pub fn pan_to(&mut self, world: Point) -> Result<()> {
		self.ensure_live()?;
		self.viewport.pan_to(world);
		self.scheduler.mark_dirty();
		Ok(())
	}

	/// Fits every node into the container.
	pub fn reset_view(&mut self) -> Result<()> {
		self.ensure_live()?;
		self.zoom.cancel();
		if let Some(bounds) = self.document.bounds() {
			self.viewport.fit(&bounds, self.config.initial_padding);
		}
		self.scheduler.mark_dirty();
		Ok(())
	}

	/// Container resize. The raster is lost, so the next frame is a full redraw.
	pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
		self.ensure_live()?;
		self.viewport.resize(width, height);
		self.scheduler.invalidate();
		Ok(())
	}

	/// Topmost interactive node under a screen position.
	pub fn find_node_at(&self, screen: Point) -> Result<Option<&CanvasNode>> {
		self.ensure_live()?;
		let world = screen_to_world(screen, self.origin, &self.viewport);
		let classifier = &*self.classifier;
		Ok(self
			.index
			.hit_test(self.document.nodes(), world, |node| classifier.is_interactive(node))
			.map(|i| &self.document.nodes()[i]))
	}

	/// Advances the zoom animation and renders one frame at `now` (ms).
	pub fn frame(&mut self, now: f64, mut targets: FrameTargets<'_>) -> Result<FrameDecision> {
		self.ensure_live()?;
		if self.zoom.step(&mut self.viewport) {
			self.scheduler.mark_dirty();
		}
		if self.selection_dirty
			&& let Some(overlay) = targets.overlay.as_mut()
		{
			overlay.select(self.selected.as_deref());
			self.selection_dirty = false;
		}
		let scene = Scene {
			document: &self.document,
			viewport: &self.viewport,
			edges: &mut self.edges,
		};
		Ok(self.scheduler.run_frame(now, scene, targets))
	}
}
