/// Rubix Web - WebGL2 front-end for the cube simulation
///
/// The hosting page provides a canvas with id `canvasID` (and optionally a
/// button with id `buttonID`) and calls `runSimulation()` once.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{error, info};
use rubix_core::{Direction, HostEvent, Key, KeyInput, PointerKind, SimConfig, Simulation};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlButtonElement, HtmlCanvasElement, KeyboardEvent, PointerEvent,
    WebGl2RenderingContext,
};

pub mod surface;

pub use surface::WebGlSurface;

const CANVAS_ID: &str = "canvasID";
const BUTTON_ID: &str = "buttonID";

/// Host callbacks append here; the frame loop drains it once per tick
type EventQueue = Rc<RefCell<Vec<HostEvent>>>;

type FrameCallback = Closure<dyn FnMut(f64)>;

#[wasm_bindgen(js_name = runSimulation)]
pub fn run_simulation() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("canvas #canvasID not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let gl = canvas
        .get_context("webgl2")?
        .ok_or_else(|| JsValue::from_str("WebGL2 context not available"))?
        .dyn_into::<WebGl2RenderingContext>()?;

    let (width, height) = (canvas.width(), canvas.height());
    let seed = (js_sys::Math::random() * 2f64.powi(53)) as u64;
    let simulation = Simulation::new(&SimConfig::default(), seed, width, height)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let surface = WebGlSurface::new(gl, width, height)?;
    info!("rubix started on a {width}x{height} canvas");

    let events: EventQueue = Rc::new(RefCell::new(Vec::new()));
    attach_keyboard(&document, &events)?;
    attach_pointer(&canvas, &events)?;
    let button = attach_button(&document, &events)?;

    start_loop(WebApp {
        simulation,
        surface,
        canvas,
        button,
        events,
        size: (width, height),
        last_timestamp: None,
    })
}

struct WebApp {
    simulation: Simulation,
    surface: WebGlSurface,
    canvas: HtmlCanvasElement,
    button: Option<HtmlButtonElement>,
    events: EventQueue,
    size: (u32, u32),
    last_timestamp: Option<f64>,
}

impl WebApp {
    fn frame(&mut self, timestamp: f64) -> Result<(), JsValue> {
        let dt = match self.last_timestamp {
            Some(last) => Duration::from_secs_f64((timestamp - last).max(0.0) / 1000.0),
            None => Duration::ZERO,
        };
        self.last_timestamp = Some(timestamp);

        let mut events = std::mem::take(&mut *self.events.borrow_mut());
        let size = (self.canvas.width(), self.canvas.height());
        if size != self.size {
            self.size = size;
            self.surface.resize(size.0, size.1);
            events.push(HostEvent::Resize {
                width: size.0,
                height: size.1,
                physical_height: size.1,
            });
        }

        let report = self.simulation.tick(dt, events, &mut self.surface)?;
        if let (Some(direction), Some(button)) = (report.direction_changed, &self.button) {
            button.set_inner_text(direction_label(direction));
        }
        Ok(())
    }
}

fn start_loop(mut app: WebApp) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();
    *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        if let Err(err) = app.frame(timestamp) {
            error!("frame failed, stopping: {err:?}");
            return;
        }
        if let Some(next) = next.borrow().as_ref() {
            if let Err(err) = request_frame(next) {
                error!("requestAnimationFrame failed: {err:?}");
            }
        }
    }));

    let slot = callback.borrow();
    if let Some(first) = slot.as_ref() {
        request_frame(first)?;
    }
    Ok(())
}

fn request_frame(callback: &FrameCallback) -> Result<(), JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}

fn attach_keyboard(document: &Document, events: &EventQueue) -> Result<(), JsValue> {
    let events = events.clone();
    let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
        if e.ctrl_key() || e.meta_key() || e.alt_key() {
            return;
        }
        if let Some(input) = translate_key(&e.key(), e.shift_key()) {
            // Keep Tab and Space from moving focus or scrolling the page
            e.prevent_default();
            events.borrow_mut().push(HostEvent::Key(input));
        }
    });
    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();
    Ok(())
}

fn attach_pointer(canvas: &HtmlCanvasElement, events: &EventQueue) -> Result<(), JsValue> {
    let listeners = [
        ("pointerdown", PointerKind::Press),
        ("pointermove", PointerKind::Drag),
        ("pointerup", PointerKind::Release),
        ("pointercancel", PointerKind::Cancel),
    ];
    for (name, kind) in listeners {
        let events = events.clone();
        let target = canvas.clone();
        let listener = Closure::<dyn FnMut(PointerEvent)>::new(move |e: PointerEvent| {
            if e.button() > 0 && kind == PointerKind::Press {
                return;
            }
            // Hover without a pressed button is not a drag
            if kind == PointerKind::Drag && e.buttons() & 1 == 0 {
                return;
            }
            if kind == PointerKind::Press {
                let _ = target.set_pointer_capture(e.pointer_id());
            }
            let (x, y) = canvas_coords(&target, &e);
            events.borrow_mut().push(HostEvent::Pointer { x, y, kind });
        });
        canvas.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
        listener.forget();
    }
    Ok(())
}

/// The optional direction button behaves like the Tab key
fn attach_button(
    document: &Document,
    events: &EventQueue,
) -> Result<Option<HtmlButtonElement>, JsValue> {
    let Some(element) = document.get_element_by_id(BUTTON_ID) else {
        return Ok(None);
    };
    let button = element.dyn_into::<HtmlButtonElement>()?;
    button.set_inner_text(direction_label(Direction::Clockwise));

    let events = events.clone();
    let onclick = Closure::<dyn FnMut()>::new(move || {
        events
            .borrow_mut()
            .push(HostEvent::Key(KeyInput::new(Key::Tab, false)));
    });
    button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();
    Ok(Some(button))
}

/// CSS pixels relative to the canvas, scaled to drawing-buffer pixels
fn canvas_coords(canvas: &HtmlCanvasElement, e: &PointerEvent) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    let scale_x = canvas.width() as f64 / rect.width().max(1.0);
    let scale_y = canvas.height() as f64 / rect.height().max(1.0);
    (
        ((e.client_x() as f64 - rect.left()) * scale_x) as f32,
        ((e.client_y() as f64 - rect.top()) * scale_y) as f32,
    )
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Clockwise => "Turn: clockwise",
        Direction::CounterClockwise => "Turn: counter-clockwise",
        Direction::Double => "Turn: double",
    }
}

/// DOM `KeyboardEvent.key` to host-independent key. Quitting is left to the page.
pub fn translate_key(key: &str, shift: bool) -> Option<KeyInput> {
    let key = match key {
        " " => Key::Space,
        "ArrowUp" => Key::Up,
        "ArrowDown" => Key::Down,
        "ArrowLeft" => Key::Left,
        "ArrowRight" => Key::Right,
        "Tab" => Key::Tab,
        "Escape" => Key::Escape,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.eq_ignore_ascii_case(&'q') => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(KeyInput::new(key, shift))
}
