//! Leptos component hosting the canvas viewer.
//!
//! The component creates a container with the raster canvas, the overlay
//! layer, and an optional minimap. Pointer and wheel events on the container
//! are forwarded to the engine as raw input; an animation loop driven by
//! `requestAnimationFrame` asks the engine to render each frame. With
//! `prevent_mistouch` set, window-level pointer listeners feed a
//! [`MistouchGuard`] that freezes and releases engine input.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlCanvasElement, HtmlElement, PointerEvent, WheelEvent, Window};

use super::classifier::Interaction;
use super::config::ViewerConfig;
use super::gesture::{ContactTarget, PointerInput, WheelInput};
use super::minimap::{MinimapIndicator, ViewportIndicator};
use super::mistouch::{GuardChange, MistouchGuard};
use super::overlay::{OverlayLayer, OverlaySync};
use super::render::CanvasSurface;
use super::scale::ScaleConfig;
use super::scheduler::FrameTargets;
use super::state::{CanvasViewerState, ViewerEvent};
use super::theme::Theme;
use super::transform::Point;
use super::types::CanvasData;

const CONTROL_SELECTOR: &str = "button, input, select, textarea, .controls";
const CAPTURING_SELECTOR: &str = ".overlay-container.active";
const LINE_HEIGHT: f64 = 16.0;

/// Engine state plus its DOM collaborators.
struct ViewerContext {
	state: CanvasViewerState,
	surface: CanvasSurface,
	overlay: Option<OverlayLayer>,
	indicator: Option<MinimapIndicator>,
	guard: Option<MistouchGuard>,
}

/// Classifies the element an event started on.
fn contact_target(ev: &Event) -> ContactTarget {
	let Some(element) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
		return ContactTarget::Canvas;
	};
	let matches = |selector: &str| element.closest(selector).ok().flatten().is_some();
	if matches(CONTROL_SELECTOR) {
		ContactTarget::Control
	} else if matches(CAPTURING_SELECTOR) {
		ContactTarget::Capturing
	} else {
		ContactTarget::Canvas
	}
}

fn client_point(ev: &PointerEvent) -> Point {
	Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn container_size(window: &Window, container: &HtmlElement, fullscreen: bool) -> (f64, f64) {
	if fullscreen {
		let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		(
			dimension(window.inner_width()).unwrap_or(800.0),
			dimension(window.inner_height()).unwrap_or(600.0),
		)
	} else {
		(f64::from(container.client_width()), f64::from(container.client_height()))
	}
}

fn container_origin(container: &HtmlElement) -> Point {
	let rect = container.get_bounding_client_rect();
	Point::new(rect.left(), rect.top())
}

fn container_contains(container: &HtmlElement, p: Point) -> bool {
	let rect = container.get_bounding_client_rect();
	p.x >= rect.left() && p.x <= rect.right() && p.y >= rect.top() && p.y <= rect.bottom()
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

/// Renders a JSON Canvas document with pan, zoom, and node selection.
///
/// The component fills its parent; set `fullscreen = true` to fill the
/// window instead. `base_dir` prefixes local file paths of image nodes.
/// `on_interact` receives every click resolved to an interactive node.
/// `scale` tunes zoom-dependent stroke and label sizes.
/// `config.prevent_mistouch` starts the viewer frozen behind a banner until
/// it is tapped, and freezes it again on any press elsewhere on the page.
#[component]
pub fn CanvasViewer(
	#[prop(into)] data: Signal<CanvasData>,
	#[prop(optional)] config: ViewerConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = false)] minimap: bool,
	#[prop(optional, into)] base_dir: String,
	#[prop(optional, into)] theme: Option<String>,
	#[prop(optional)] scale: ScaleConfig,
	#[prop(optional, into)] on_interact: Option<Callback<(String, Interaction)>>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let minimap_ref = NodeRef::<leptos::html::Div>::new();
	let context: Rc<RefCell<Option<ViewerContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let guard_cb: Rc<RefCell<Option<Closure<dyn FnMut(PointerEvent)>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init, guard_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone(), guard_cb.clone());
	let prevent_mistouch = config.prevent_mistouch;
	let frozen = RwSignal::new(false);

	Effect::new(move |_| {
		let (Some(container), Some(canvas)) = (container_ref.get(), canvas_ref.get()) else {
			return;
		};
		let container: HtmlElement = container.into();
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(document) = window.document() else {
			return;
		};
		let data = data.get();
		let minimap_element = minimap.then(|| minimap_ref.get()).flatten().map(HtmlElement::from);

		// New data for a mounted viewer: swap the document and rebuild the DOM collaborators.
		if let Some(ref mut c) = *context_init.borrow_mut() {
			if c.state.set_data(data).is_ok() {
				if let Some(mut old) = c.overlay.take() {
					old.dispose();
				}
				if let Some(old) = c.indicator.take() {
					old.dispose();
				}
				c.overlay = OverlayLayer::new(
					&document,
					&container,
					c.state.document().nodes(),
					&base_dir,
					config.overlay_margin,
				);
				c.indicator = minimap_element
					.zip(c.state.document().bounds())
					.and_then(|(element, bounds)| MinimapIndicator::new(&document, &element, &bounds));
			}
			return;
		}

		let theme = theme
			.as_deref()
			.and_then(|name| {
				let found = Theme::by_name(name);
				if found.is_none() {
					warn!("canvas-viewer: unknown theme {name:?}, using default");
				}
				found
			})
			.unwrap_or_default();
		let Some(mut surface) = CanvasSurface::new(canvas, scale.clone(), theme) else {
			warn!("canvas-viewer: 2D context unavailable");
			return;
		};
		let (w, h) = container_size(&window, &container, fullscreen);
		surface.resize(w, h, window.device_pixel_ratio());

		let mut state = CanvasViewerState::new(data, config.clone(), w, h);
		let _ = state.set_origin(container_origin(&container));
		if let Some(callback) = on_interact {
			let _ = state.subscribe(move |event| {
				if let ViewerEvent::Interact { node, interaction } = event {
					callback.run((node.clone(), *interaction));
				}
			});
		}

		let overlay = OverlayLayer::new(
			&document,
			&container,
			state.document().nodes(),
			&base_dir,
			config.overlay_margin,
		);
		let indicator = minimap_element
			.zip(state.document().bounds())
			.and_then(|(element, bounds)| MinimapIndicator::new(&document, &element, &bounds));
		info!(
			"canvas-viewer: mounted at {w}x{h}, overlays {}, minimap {}",
			overlay.is_some(),
			indicator.is_some()
		);

		let guard = prevent_mistouch.then(|| MistouchGuard::new(state.config().gestures.tap_threshold));
		if guard.as_ref().is_some_and(MistouchGuard::is_frozen) {
			let _ = state.stop_interaction();
			frozen.set(true);
		}

		*context_init.borrow_mut() = Some(ViewerContext {
			state,
			surface,
			overlay,
			indicator,
			guard,
		});

		if prevent_mistouch {
			let (context_guard, container_guard) = (context_init.clone(), container.clone());
			let cb: Closure<dyn FnMut(PointerEvent)> = Closure::new(move |ev: PointerEvent| {
				let position = client_point(&ev);
				let mut borrowed = context_guard.borrow_mut();
				let Some(c) = borrowed.as_mut() else {
					return;
				};
				let Some(guard) = c.guard.as_mut() else {
					return;
				};
				let change = match ev.type_().as_str() {
					"pointerdown" => guard.pointer_down(position, container_contains(&container_guard, position)),
					"pointermove" => {
						guard.pointer_move(position);
						None
					}
					"pointerup" => guard.pointer_up(position),
					_ => None,
				};
				match change {
					Some(GuardChange::Froze) => {
						info!("canvas-viewer: frozen after a press outside the viewer");
						let _ = c.state.stop_interaction();
						frozen.set(true);
					}
					Some(GuardChange::Released) => {
						info!("canvas-viewer: unfrozen");
						let _ = c.state.start_interaction();
						frozen.set(false);
					}
					None => {}
				}
			});
			for kind in ["pointerdown", "pointermove", "pointerup"] {
				let _ = window.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
			}
			*guard_cb_init.borrow_mut() = Some(cb);
		}

		let (context_resize, container_resize) = (context_init.clone(), container.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = container_size(&win, &container_resize, fullscreen);
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.surface.resize(nw, nh, win.device_pixel_ratio());
				let _ = c.state.resize(nw, nh);
				let _ = c.state.set_origin(container_origin(&container_resize));
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let mut running = true;
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let targets = FrameTargets {
					surface: &mut c.surface,
					overlay: c.overlay.as_mut().map(|o| o as &mut dyn OverlaySync),
					indicator: c.indicator.as_mut().map(|i| i as &mut dyn ViewportIndicator),
				};
				running = c.state.frame(now_ms(), targets).is_ok();
			}
			if !running {
				info!("canvas-viewer: animation loop stopped");
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow()
				&& let Some(win) = web_sys::window()
			{
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_pd = context.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		let target = contact_target(&ev);
		if target == ContactTarget::Canvas
			&& let Some(container) = container_ref.get()
		{
			let _ = container.set_pointer_capture(ev.pointer_id());
		}
		if let Some(ref mut c) = *context_pd.borrow_mut() {
			if let Some(container) = container_ref.get() {
				let _ = c.state.set_origin(container_origin(&container.into()));
			}
			let _ = c.state.pointer_down(PointerInput {
				id: ev.pointer_id(),
				position: client_point(&ev),
				primary: ev.is_primary(),
				target,
			});
		}
	};

	let context_pm = context.clone();
	let on_pointermove = move |ev: PointerEvent| {
		if let Some(ref mut c) = *context_pm.borrow_mut() {
			let _ = c.state.pointer_move(ev.pointer_id(), client_point(&ev));
		}
	};

	let context_pu = context.clone();
	let on_pointerup = move |ev: PointerEvent| {
		if let Some(ref mut c) = *context_pu.borrow_mut() {
			let _ = c.state.pointer_up(ev.pointer_id(), client_point(&ev));
		}
	};

	let context_pc = context.clone();
	let on_pointercancel = move |ev: PointerEvent| {
		if let Some(ref mut c) = *context_pc.borrow_mut() {
			let _ = c.state.pointer_cancel(ev.pointer_id());
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		let target = contact_target(&ev);
		let zoom_modifier = ev.ctrl_key();
		// Focused overlays keep native scrolling.
		if target == ContactTarget::Capturing && !zoom_modifier {
			return;
		}
		ev.prevent_default();
		let unit = match ev.delta_mode() {
			WheelEvent::DOM_DELTA_LINE => LINE_HEIGHT,
			WheelEvent::DOM_DELTA_PAGE => container_ref
				.get()
				.map(|c| f64::from(c.client_height()))
				.unwrap_or(LINE_HEIGHT),
			_ => 1.0,
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			if let Some(container) = container_ref.get() {
				let _ = c.state.set_origin(container_origin(&container.into()));
			}
			let _ = c.state.wheel(WheelInput {
				delta_x: ev.delta_x() * unit,
				delta_y: ev.delta_y() * unit,
				position: Point::new(f64::from(ev.client_x()), f64::from(ev.client_y())),
				zoom_modifier,
				target,
			});
		}
	};

	let container_style = if fullscreen {
		"position: fixed; inset: 0; overflow: hidden; touch-action: none;"
	} else {
		"position: relative; width: 100%; height: 100%; overflow: hidden; touch-action: none;"
	};

	view! {
		<div
			node_ref=container_ref
			class="canvas-viewer"
			style=container_style
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointercancel=on_pointercancel
			on:wheel=on_wheel
		>
			<canvas
				node_ref=canvas_ref
				class="main-canvas"
				style="position: absolute; left: 0; top: 0; display: block;"
			/>
			{prevent_mistouch.then(|| view! {
				<Show when=move || frozen.get()>
					<div
						class="prevention-container"
						style="position: absolute; left: 0; right: 0; top: 12px; display: flex; justify-content: center; pointer-events: none;"
					>
						<div class="prevention-banner">"Frozen to prevent mistouch, tap to unlock."</div>
					</div>
				</Show>
			})}
			{minimap.then(|| view! {
				<div
					node_ref=minimap_ref
					class="minimap"
					style="position: absolute; right: 12px; bottom: 12px; width: 200px; height: 150px; overflow: hidden;"
				/>
			})}
		</div>
	}
}
