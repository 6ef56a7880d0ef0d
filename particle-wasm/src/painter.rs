use particle_core::{Canvas, Hsla, PathStyle, Vector2D};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// CSS colour string for an [`Hsla`].
pub fn css_color(color: Hsla) -> String {
    format!(
        "hsla({}, {}%, {}%, {})",
        color.h.rem_euclid(360.0),
        color.s.clamp(0.0, 100.0),
        color.l.clamp(0.0, 100.0),
        color.a.clamp(0.0, 1.0)
    )
}

/// Quadratic segments `(control, end)` for a closed smooth curve through
/// `points`, starting from the returned start point. Each segment bends
/// through a point and ends halfway to the next.
pub fn smooth_segments(points: &[Vector2D]) -> Option<(Vector2D, Vec<(Vector2D, Vector2D)>)> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mid = |a: Vector2D, b: Vector2D| (a + b) * 0.5;
    let start = mid(points[n - 1], points[0]);
    let segments = (0..n)
        .map(|i| (points[i], mid(points[i], points[(i + 1) % n])))
        .collect();
    Some((start, segments))
}

#[derive(Clone, Copy)]
struct Style {
    fill: Option<Hsla>,
    stroke: Option<Hsla>,
}

/// [`Canvas`] on top of a browser 2D context.
pub struct CanvasPainter {
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    style: Style,
    saved: Vec<Style>,
}

impl CanvasPainter {
    pub fn new(context: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        context.set_text_align("center");
        context.set_text_baseline("middle");
        context.set_font("16px sans-serif");
        Self {
            context,
            width,
            height,
            style: Style {
                fill: Some(Hsla::gray(100.0)),
                stroke: Some(Hsla::BLACK),
            },
            saved: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn check(result: Result<(), JsValue>) {
        if let Err(err) = result {
            crate::log(&format!("canvas call failed: {:?}", err));
        }
    }

    fn finish_path(&self) {
        if self.style.fill.is_some() {
            self.context.fill();
        }
        if self.style.stroke.is_some() {
            self.context.stroke();
        }
    }
}

impl Canvas for CanvasPainter {
    fn background(&mut self, color: Hsla) {
        self.context.save();
        Self::check(self.context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        self.context.set_fill_style_str(&css_color(color));
        self.context.fill_rect(0.0, 0.0, self.width, self.height);
        self.context.restore();
    }

    fn fill(&mut self, color: Option<Hsla>) {
        self.style.fill = color;
        if let Some(color) = color {
            self.context.set_fill_style_str(&css_color(color));
        }
    }

    fn stroke(&mut self, color: Option<Hsla>, weight: f32) {
        self.style.stroke = color;
        if let Some(color) = color {
            self.context.set_stroke_style_str(&css_color(color));
            self.context.set_line_width(weight as f64);
        }
    }

    fn push(&mut self) {
        self.saved.push(self.style);
        self.context.save();
    }

    fn pop(&mut self) {
        if let Some(style) = self.saved.pop() {
            self.style = style;
        }
        self.context.restore();
    }

    fn translate(&mut self, offset: Vector2D) {
        Self::check(self.context.translate(offset.x as f64, offset.y as f64));
    }

    fn rotate(&mut self, angle: f32) {
        Self::check(self.context.rotate(angle as f64));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        Self::check(self.context.scale(sx as f64, sy as f64));
    }

    fn circle(&mut self, center: Vector2D, diameter: f32) {
        self.context.begin_path();
        Self::check(self.context.arc(
            center.x as f64,
            center.y as f64,
            (diameter as f64 / 2.0).max(0.0),
            0.0,
            std::f64::consts::TAU,
        ));
        self.finish_path();
    }

    fn rect(&mut self, origin: Vector2D, width: f32, height: f32) {
        let (x, y, w, h) = (origin.x as f64, origin.y as f64, width as f64, height as f64);
        if self.style.fill.is_some() {
            self.context.fill_rect(x, y, w, h);
        }
        if self.style.stroke.is_some() {
            self.context.stroke_rect(x, y, w, h);
        }
    }

    fn polygon(&mut self, points: &[Vector2D], style: PathStyle) {
        let Some(first) = points.first() else {
            return;
        };
        self.context.begin_path();
        match (style, smooth_segments(points)) {
            (PathStyle::Smooth, Some((start, segments))) => {
                self.context.move_to(start.x as f64, start.y as f64);
                for (control, end) in segments {
                    self.context
                        .quadratic_curve_to(control.x as f64, control.y as f64, end.x as f64, end.y as f64);
                }
            }
            _ => {
                self.context.move_to(first.x as f64, first.y as f64);
                for p in &points[1..] {
                    self.context.line_to(p.x as f64, p.y as f64);
                }
            }
        }
        self.context.close_path();
        self.finish_path();
    }

    fn line(&mut self, from: Vector2D, to: Vector2D) {
        if self.style.stroke.is_none() {
            return;
        }
        self.context.begin_path();
        self.context.move_to(from.x as f64, from.y as f64);
        self.context.line_to(to.x as f64, to.y as f64);
        self.context.stroke();
    }

    fn text(&mut self, text: &str, at: Vector2D) {
        if self.style.fill.is_some() {
            Self::check(self.context.fill_text(text, at.x as f64, at.y as f64));
        }
    }
}
