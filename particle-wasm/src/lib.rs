use particle_core::sketches::SketchKind;
use particle_core::{FrameInput, Simulation, Vector2D, Viewport};
use particle_shared::{SimulationSettings, SimulationStatus};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

pub mod painter;

use painter::CanvasPainter;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub(crate) fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Longest step taken in one frame, so a backgrounded tab does not fling
/// everything across the screen when it comes back.
const MAX_STEP: f32 = 0.1;

#[wasm_bindgen]
pub struct SketchSimulation {
    simulation: Box<dyn Simulation>,
    settings: SimulationSettings,
    canvas: HtmlCanvasElement,
    painter: CanvasPainter,
    debug: bool,
    elapsed: f32,
    fps: u32,
    fps_frames: u32,
    fps_window: f32,
}

#[wasm_bindgen]
impl SketchSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, sketch: &str, width: f64, height: f64) -> Result<SketchSimulation, JsValue> {
        let kind: SketchKind = sketch.parse().map_err(|e: String| JsValue::from_str(&e))?;

        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let now = js_sys::Date::now() as u64;
        let settings = SimulationSettings {
            viewport: Viewport::new(width as f32, height as f32).map_err(to_js)?,
            seed: now,
            noise_seed: now as u32,
            ..SimulationSettings::new(kind)
        };
        let simulation = settings.build().map_err(to_js)?;

        console_log!(
            "Starting {} sketch with {} particles on {}x{}",
            kind,
            simulation.population(),
            width,
            height
        );

        Ok(SketchSimulation {
            simulation,
            settings,
            canvas,
            painter: CanvasPainter::new(context, width, height),
            debug: false,
            elapsed: 0.0,
            fps: 0,
            fps_frames: 0,
            fps_window: 0.0,
        })
    }

    /// Advance by `dt_seconds` of wall-clock time.
    pub fn update(&mut self, dt_seconds: f64) -> Result<(), JsValue> {
        let dt = (dt_seconds as f32).clamp(f32::EPSILON, MAX_STEP);
        self.elapsed += dt;
        self.simulation
            .update(&FrameInput::new(dt, self.elapsed))
            .map_err(to_js)?;

        self.fps_frames += 1;
        self.fps_window += dt;
        if self.fps_window >= 1.0 {
            self.fps = (self.fps_frames as f32 / self.fps_window).round() as u32;
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }
        Ok(())
    }

    pub fn render(&mut self) {
        self.simulation.render(&mut self.painter, self.debug);
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        console_log!("Debug overlay {}", if self.debug { "on" } else { "off" });
        self.debug
    }

    /// Robots steer toward the pointer; fish and leaves ignore it unless a
    /// tuning override sets a pointer weight.
    pub fn handle_mouse_move(&mut self, event: MouseEvent) {
        let pointer = self.to_canvas(event.client_x() as f64, event.client_y() as f64);
        self.simulation.set_pointer(Some(pointer));
    }

    pub fn handle_touch(&mut self, event: TouchEvent) {
        let touches = event.touches();
        let pointer = touches
            .item(0)
            .map(|touch| self.to_canvas(touch.client_x() as f64, touch.client_y() as f64));
        self.simulation.set_pointer(pointer);
    }

    pub fn clear_pointer(&mut self) {
        self.simulation.set_pointer(None);
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.simulation
            .resize(width as f32, height as f32)
            .map_err(to_js)?;
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.painter.resize(width, height);
        self.settings.viewport = self.simulation.viewport();
        console_log!("Resized to {}x{}", width, height);
        Ok(())
    }

    pub fn population(&self) -> usize {
        self.simulation.population()
    }

    pub fn label(&self) -> String {
        self.simulation.label().to_string()
    }

    pub fn sketch(&self) -> String {
        self.settings.sketch.name().to_string()
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        let status = SimulationStatus {
            label: self.label(),
            population: self.population(),
            frame: self.simulation.frame_count(),
            fps: self.fps,
            pointer_active: self.simulation.pointer().is_some(),
        };
        serde_json::to_string(&status).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn to_canvas(&self, client_x: f64, client_y: f64) -> Vector2D {
        let canvas_element: &Element = self.canvas.as_ref();
        let rect = canvas_element.get_bounding_client_rect();
        Vector2D::new((client_x - rect.left()) as f32, (client_y - rect.top()) as f32)
    }
}

fn to_js<E: ToString>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
