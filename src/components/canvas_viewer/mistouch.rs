//! Mistouch prevention.
//!
//! A page that embeds the viewer keeps scrolling when a swipe happens to land
//! on the canvas. The guard freezes the viewer whenever a press lands outside
//! of it and unfreezes it on a tap inside: a press and release inside the
//! container that moved less than the tap threshold.

use super::transform::Point;

/// A freeze state change the host must apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardChange {
	/// Input must be ignored from now on.
	Froze,
	/// Input is accepted again.
	Released,
}

#[derive(Clone, Copy, Debug)]
struct Press {
	start: Point,
	last: Point,
}

#[derive(Clone, Debug)]
pub struct MistouchGuard {
	frozen: bool,
	tap_threshold: f64,
	/// Press inside the container while frozen.
	press: Option<Press>,
}

impl MistouchGuard {
	/// A guard that starts frozen, so the first touch on the page never pans.
	pub fn new(tap_threshold: f64) -> Self {
		Self {
			frozen: true,
			tap_threshold,
			press: None,
		}
	}

	pub fn is_frozen(&self) -> bool {
		self.frozen
	}

	/// Any press on the page. `inside` tells whether it hit the container.
	pub fn pointer_down(&mut self, position: Point, inside: bool) -> Option<GuardChange> {
		if !inside {
			self.press = None;
			if self.frozen {
				return None;
			}
			self.frozen = true;
			return Some(GuardChange::Froze);
		}
		if self.frozen {
			self.press = Some(Press {
				start: position,
				last: position,
			});
		}
		None
	}

	pub fn pointer_move(&mut self, position: Point) {
		if let Some(press) = &mut self.press {
			press.last = position;
		}
	}

	pub fn pointer_up(&mut self, position: Point) -> Option<GuardChange> {
		let mut press = self.press.take()?;
		press.last = position;
		if self.frozen && press.last.manhattan(press.start) < self.tap_threshold {
			self.frozen = false;
			return Some(GuardChange::Released);
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_frozen_and_tap_inside_releases() {
		let mut guard = MistouchGuard::new(5.0);
		assert!(guard.is_frozen());
		assert_eq!(guard.pointer_down(Point::new(10.0, 10.0), true), None);
		guard.pointer_move(Point::new(12.0, 11.0));
		assert_eq!(guard.pointer_up(Point::new(12.0, 11.0)), Some(GuardChange::Released));
		assert!(!guard.is_frozen());
	}

	#[test]
	fn swipe_inside_stays_frozen() {
		let mut guard = MistouchGuard::new(5.0);
		guard.pointer_down(Point::new(10.0, 10.0), true);
		guard.pointer_move(Point::new(10.0, 80.0));
		assert_eq!(guard.pointer_up(Point::new(10.0, 80.0)), None);
		assert!(guard.is_frozen());
	}

	#[test]
	fn press_outside_freezes_once() {
		let mut guard = MistouchGuard::new(5.0);
		guard.pointer_down(Point::default(), true);
		guard.pointer_up(Point::default());
		assert_eq!(guard.pointer_down(Point::new(-50.0, 0.0), false), Some(GuardChange::Froze));
		assert_eq!(guard.pointer_down(Point::new(-50.0, 0.0), false), None);
		assert!(guard.is_frozen());
	}

	#[test]
	fn presses_while_released_are_not_tracked() {
		let mut guard = MistouchGuard::new(5.0);
		guard.pointer_down(Point::default(), true);
		guard.pointer_up(Point::default());
		assert_eq!(guard.pointer_down(Point::new(5.0, 5.0), true), None);
		assert_eq!(guard.pointer_up(Point::new(5.0, 5.0)), None);
		assert!(!guard.is_frozen());
	}

	#[test]
	fn release_without_press_is_ignored() {
		let mut guard = MistouchGuard::new(5.0);
		guard.pointer_move(Point::new(3.0, 3.0));
		assert_eq!(guard.pointer_up(Point::new(3.0, 3.0)), None);
		assert!(guard.is_frozen());
	}
}
