//! Pointer and wheel gesture recognition.
//!
//! Raw contact and wheel input is folded into three normalized intents:
//! [`Intent::Pan`], [`Intent::Zoom`], and [`Intent::Click`]. Nothing else in
//! the viewer reads raw input.
//!
//! Contacts drive a small state machine:
//!
//! | state    | contact start       | move              | contact end                 |
//! |----------|---------------------|-------------------|-----------------------------|
//! | Idle     | → Panning           | -                 | -                           |
//! | Panning  | → Pinching          | pan delta         | → Idle (click if a tap)     |
//! | Pinching | ignored             | pan + zoom        | → Panning (remaining pointer)|
//!
//! Wheel input takes a separate stateless path, apart from the latched
//! trackpad classification.

use log::{debug, info};

use super::config::{ControlSchema, GestureConfig};
use super::transform::{Point, clamp_scale, screen_to_container};

/// Pointer identity as reported by the platform.
pub type PointerId = i32;

/// Ratio deviations below this are treated as "no zoom".
const FACTOR_EPSILON: f64 = 1e-9;

/// What a contact originally landed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactTarget {
	/// The canvas itself or a passive overlay.
	#[default]
	Canvas,
	/// A UI control (button, input, control panel). Clicks are not resolved.
	Control,
	/// An element currently capturing interaction, such as a focused overlay.
	Capturing,
}

/// A normalized interaction intent.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Move the view by a container-space delta.
	Pan {
		/// Horizontal delta (px).
		dx: f64,
		/// Vertical delta (px).
		dy: f64,
	},
	/// Multiply the scale by `factor`, keeping `anchor` (container coords) fixed.
	Zoom {
		/// Scale multiplier.
		factor: f64,
		/// Fixed point, container coordinates.
		anchor: Point,
	},
	/// A tap or click at a container position.
	Click {
		/// Container coordinates.
		position: Point,
		/// What the contact landed on.
		target: ContactTarget,
	},
}

/// A contact start or move report.
#[derive(Clone, Copy, Debug)]
pub struct PointerInput {
	/// Platform pointer id.
	pub id: PointerId,
	/// Screen position.
	pub position: Point,
	/// First contact of a touch sequence, or the mouse.
	pub primary: bool,
	/// What the contact landed on.
	pub target: ContactTarget,
}

/// A wheel report.
#[derive(Clone, Copy, Debug)]
pub struct WheelInput {
	/// Horizontal delta (px).
	pub delta_x: f64,
	/// Vertical delta (px).
	pub delta_y: f64,
	/// Screen position.
	pub position: Point,
	/// Platform zoom modifier (ctrl, or the synthetic ctrl of trackpad pinch).
	pub zoom_modifier: bool,
	/// Element under the pointer.
	pub target: ContactTarget,
}

#[derive(Clone, Debug)]
struct Contact {
	id: PointerId,
	start: Point,
	/// Last position a pan was emitted for.
	last: Point,
	/// Set once the contact took part in a multi-touch gesture.
	interrupted: bool,
	/// Set once the contact left the dead zone around `start`; pans are
	/// emitted from then on.
	dragging: bool,
	/// Started over a capturing element; single-contact gestures are dropped.
	suppressed: bool,
	target: ContactTarget,
}

impl Contact {
	fn new(input: &PointerInput) -> Self {
		Self {
			id: input.id,
			start: input.position,
			last: input.position,
			interrupted: false,
			dragging: false,
			suppressed: input.target == ContactTarget::Capturing,
			target: input.target,
		}
	}

	/// Makes the contact the sole pointer of a resumed drag.
	fn resume_drag(mut self) -> Self {
		self.start = self.last;
		self.dragging = true;
		self.suppressed = false;
		self
	}
}

/// Zero reference for a whole pinch, taken when the second contact lands.
#[derive(Clone, Copy, Debug)]
struct PinchSnapshot {
	distance: f64,
	scale: f64,
	/// Container coordinates.
	midpoint: Point,
	/// Midpoint drift already emitted as pan.
	emitted: Point,
}

#[derive(Clone, Debug, Default)]
enum Gesture {
	#[default]
	Idle,
	Panning(Contact),
	Pinching {
		contacts: [Contact; 2],
		snapshot: PinchSnapshot,
	},
}

/// Folds raw pointer and wheel input into [`Intent`]s.
#[derive(Clone, Debug)]
pub struct GestureRecognizer {
	config: GestureConfig,
	/// Container origin on screen.
	origin: Point,
	state: Gesture,
	trackpad: bool,
	enabled: bool,
}

impl GestureRecognizer {
	pub fn new(config: GestureConfig) -> Self {
		let config = config.validated();
		let trackpad = config.control_schema == ControlSchema::Trackpad;
		Self {
			config,
			origin: Point::default(),
			state: Gesture::Idle,
			trackpad,
			enabled: true,
		}
	}

	/// Updates the container's on-screen origin.
	pub fn set_origin(&mut self, origin: Point) {
		self.origin = origin;
	}

	/// Switches wheel classification. `Auto` restarts trackpad detection.
	pub fn set_control_schema(&mut self, schema: ControlSchema) {
		self.config.control_schema = schema;
		self.trackpad = schema == ControlSchema::Trackpad;
	}

	/// Resumes input handling.
	pub fn start(&mut self) {
		self.enabled = true;
	}

	/// Ignores input until [`start`](Self::start) and drops tracked contacts.
	pub fn stop(&mut self) {
		self.enabled = false;
		self.state = Gesture::Idle;
	}

	fn pinch_geometry(&self, contacts: &[Contact; 2]) -> (f64, Point) {
		let distance = contacts[0].last.distance(contacts[1].last);
		let midpoint = screen_to_container(contacts[0].last.midpoint(contacts[1].last), self.origin);
		(distance, midpoint)
	}

	fn snapshot(&self, contacts: &[Contact; 2], scale: f64) -> PinchSnapshot {
		let (distance, midpoint) = self.pinch_geometry(contacts);
		PinchSnapshot {
			distance,
			scale,
			midpoint,
			emitted: Point::default(),
		}
	}

	/// Contact start. `scale` is the current view scale, recorded as the
	/// pinch reference when this contact starts a pinch.
	pub fn pointer_down(&mut self, input: PointerInput, scale: f64) {
		if !self.enabled {
			return;
		}
		let contact = Contact::new(&input);

		self.state = match std::mem::take(&mut self.state) {
			Gesture::Idle => Gesture::Panning(contact),
			// A new primary contact means the previous one was lost without an end event.
			Gesture::Panning(_) if input.primary => Gesture::Panning(contact),
			Gesture::Panning(previous) if previous.id == contact.id => Gesture::Panning(contact),
			Gesture::Panning(mut first) => {
				first.interrupted = true;
				first.suppressed = false;
				let mut second = contact;
				second.interrupted = true;
				second.suppressed = false;
				let contacts = [first, second];
				let snapshot = self.snapshot(&contacts, scale);
				debug!(
					"canvas-viewer: pinch started, distance {:.1} at scale {:.3}",
					snapshot.distance, scale
				);
				Gesture::Pinching { contacts, snapshot }
			}
			pinching @ Gesture::Pinching { .. } => {
				debug!("canvas-viewer: ignoring contact {} during pinch", input.id);
				pinching
			}
		};
	}

	/// Contact move. `scale` is the current view scale.
	pub fn pointer_move(&mut self, id: PointerId, position: Point, scale: f64) -> Vec<Intent> {
		self.pointer_moves(&[(id, position)], scale)
	}

	/// Several contact moves that happened together (coalesced events).
	/// During a pinch all positions are applied before intents are computed.
	pub fn pointer_moves(&mut self, moves: &[(PointerId, Point)], scale: f64) -> Vec<Intent> {
		if !self.enabled {
			return Vec::new();
		}
		let tap_threshold = self.config.tap_threshold;
		match &mut self.state {
			Gesture::Idle => Vec::new(),
			Gesture::Panning(contact) => {
				let mut intents = Vec::new();
				if contact.suppressed {
					return intents;
				}
				let id = contact.id;
				for &(_, position) in moves.iter().filter(|(moved, _)| *moved == id) {
					if !contact.dragging {
						if position.manhattan(contact.start) < tap_threshold {
							continue;
						}
						contact.dragging = true;
					}
					intents.extend(pan_intent(position - contact.last));
					contact.last = position;
				}
				intents
			}
			Gesture::Pinching { contacts, .. } => {
				let mut moved = false;
				for &(id, position) in moves {
					if let Some(contact) = contacts.iter_mut().find(|c| c.id == id) {
						contact.last = position;
						moved = true;
					}
				}
				if moved {
					self.pinch_intents(scale)
				} else {
					Vec::new()
				}
			}
		}
	}

	fn pinch_intents(&mut self, scale: f64) -> Vec<Intent> {
		let Gesture::Pinching { contacts, snapshot } = &self.state else {
			return Vec::new();
		};
		let (distance, midpoint) = self.pinch_geometry(contacts);
		let mut snapshot = *snapshot;

		// Contacts that started on top of each other give no usable reference.
		if snapshot.distance <= f64::EPSILON {
			snapshot.distance = distance;
			snapshot.scale = scale;
		}

		let drift = midpoint - snapshot.midpoint - snapshot.emitted;
		snapshot.emitted = snapshot.emitted + drift;

		let mut intents: Vec<Intent> = pan_intent(drift).into_iter().collect();
		if snapshot.distance > f64::EPSILON && scale > 0.0 {
			let target = clamp_scale(snapshot.scale * distance / snapshot.distance);
			let factor = target / scale;
			if (factor - 1.0).abs() > FACTOR_EPSILON {
				intents.push(Intent::Zoom {
					factor,
					anchor: midpoint,
				});
			}
		}

		if let Gesture::Pinching { snapshot: stored, .. } = &mut self.state {
			*stored = snapshot;
		}
		intents
	}

	/// Contact end. Unknown identities are ignored.
	pub fn pointer_up(&mut self, id: PointerId, position: Point) -> Vec<Intent> {
		if !self.enabled {
			return Vec::new();
		}
		match std::mem::take(&mut self.state) {
			Gesture::Panning(contact) if contact.id == id => self.finish(contact, position),
			Gesture::Pinching { contacts, snapshot } => {
				let [first, second] = contacts;
				if first.id == id {
					self.state = Gesture::Panning(second.resume_drag());
				} else if second.id == id {
					self.state = Gesture::Panning(first.resume_drag());
				} else {
					self.state = Gesture::Pinching {
						contacts: [first, second],
						snapshot,
					};
				}
				Vec::new()
			}
			other => {
				self.state = other;
				Vec::new()
			}
		}
	}

	/// Contact cancelled by the platform: dropped without producing a click.
	pub fn pointer_cancel(&mut self, id: PointerId) {
		match std::mem::take(&mut self.state) {
			Gesture::Panning(contact) if contact.id == id => {}
			Gesture::Pinching { contacts, snapshot } => {
				let [first, second] = contacts;
				self.state = if first.id == id {
					Gesture::Panning(second.resume_drag())
				} else if second.id == id {
					Gesture::Panning(first.resume_drag())
				} else {
					Gesture::Pinching {
						contacts: [first, second],
						snapshot,
					}
				};
			}
			other => self.state = other,
		}
	}

	fn finish(&self, contact: Contact, position: Point) -> Vec<Intent> {
		if contact.suppressed {
			return Vec::new();
		}
		// Only the release position counts: a contact that wandered off and came
		// back still taps.
		let is_tap = !contact.interrupted && position.manhattan(contact.start) < self.config.tap_threshold;
		if is_tap {
			return vec![Intent::Click {
				position: screen_to_container(position, self.origin),
				target: contact.target,
			}];
		}
		pan_intent(position - contact.last).into_iter().collect()
	}

	/// Wheel input: trackpad pan or zoom around the pointer.
	pub fn wheel(&mut self, input: WheelInput) -> Vec<Intent> {
		if !self.enabled || (input.delta_x == 0.0 && input.delta_y == 0.0) {
			return Vec::new();
		}
		// Focused overlays scroll their own content; pinch-zoom still gets through.
		if input.target == ContactTarget::Capturing && !input.zoom_modifier {
			return Vec::new();
		}

		if self.config.control_schema == ControlSchema::Auto
			&& !self.config.lock_control_schema
			&& !self.trackpad
			&& (input.zoom_modifier
				|| input.delta_x.abs() > self.config.trackpad_ratio * input.delta_y.abs())
		{
			info!("canvas-viewer: trackpad detected, wheel now pans");
			self.trackpad = true;
		}

		if self.trackpad && !input.zoom_modifier {
			return vec![Intent::Pan {
				dx: input.delta_x,
				dy: input.delta_y,
			}];
		}

		let factor = (-self.config.wheel_zoom_speed * input.delta_y).exp();
		if (factor - 1.0).abs() <= FACTOR_EPSILON {
			return Vec::new();
		}
		vec![Intent::Zoom {
			factor,
			anchor: screen_to_container(input.position, self.origin),
		}]
	}
}

fn pan_intent(delta: Point) -> Option<Intent> {
	(delta.x != 0.0 || delta.y != 0.0).then_some(Intent::Pan {
		dx: delta.x,
		dy: delta.y,
	})
}
