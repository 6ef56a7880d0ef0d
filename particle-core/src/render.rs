//! Drawing interface the host graphics context implements.
//!
//! Only render steps ever receive a [`Canvas`]; force calculation and
//! integration never touch it.

use crate::vector::Vector2D;

/// Colour in hue (degrees), saturation (%), lightness (%) and alpha (0..1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const BLACK: Hsla = Hsla::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub const fn opaque(h: f32, s: f32, l: f32) -> Self {
        Self::new(h, s, l, 1.0)
    }

    pub const fn gray(l: f32) -> Self {
        Self::new(0.0, 0.0, l, 1.0)
    }
}

/// Outline style used by [`Canvas::polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Straight segments between the points.
    Straight,
    /// A smooth curve through the points.
    Smooth,
}

/// Primitive drawing operations of a 2D graphics context.
///
/// Coordinates are in viewport units with the origin at the top-left.
/// `push`/`pop` save and restore the transform and style state.
pub trait Canvas {
    fn background(&mut self, color: Hsla);
    fn fill(&mut self, color: Option<Hsla>);
    fn stroke(&mut self, color: Option<Hsla>, weight: f32);

    fn push(&mut self);
    fn pop(&mut self);
    fn translate(&mut self, offset: Vector2D);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, sx: f32, sy: f32);

    fn circle(&mut self, center: Vector2D, diameter: f32);
    fn rect(&mut self, origin: Vector2D, width: f32, height: f32);
    fn polygon(&mut self, points: &[Vector2D], style: PathStyle);
    fn line(&mut self, from: Vector2D, to: Vector2D);
    fn text(&mut self, text: &str, at: Vector2D);

    /// Debug arrow for a force vector anchored at `origin`, drawn `scale` long.
    fn arrow(&mut self, origin: Vector2D, vector: Vector2D, scale: f32, color: Hsla) {
        let tip = origin + vector * scale;
        self.stroke(Some(color), 1.0);
        self.line(origin, tip);
        let length = (vector * scale).magnitude();
        if length > 0.0 {
            let head = (length * 0.25).min(6.0);
            let heading = vector.angle();
            let spread = 2.6;
            self.line(tip, tip + Vector2D::polar(head, heading + spread));
            self.line(tip, tip + Vector2D::polar(head, heading - spread));
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Canvas that records calls, shared by the unit tests.

    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Background(Hsla),
        Fill(Option<Hsla>),
        Stroke(Option<Hsla>),
        Push,
        Pop,
        Translate(Vector2D),
        Rotate(f32),
        Scale(f32, f32),
        Circle(Vector2D, f32),
        Rect(Vector2D),
        Polygon(usize, PathStyle),
        Line(Vector2D, Vector2D),
        Text(String),
    }

    #[derive(Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<Op>,
    }

    impl RecordingCanvas {
        pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn background(&mut self, color: Hsla) {
            self.ops.push(Op::Background(color));
        }
        fn fill(&mut self, color: Option<Hsla>) {
            self.ops.push(Op::Fill(color));
        }
        fn stroke(&mut self, color: Option<Hsla>, _weight: f32) {
            self.ops.push(Op::Stroke(color));
        }
        fn push(&mut self) {
            self.ops.push(Op::Push);
        }
        fn pop(&mut self) {
            self.ops.push(Op::Pop);
        }
        fn translate(&mut self, offset: Vector2D) {
            self.ops.push(Op::Translate(offset));
        }
        fn rotate(&mut self, angle: f32) {
            self.ops.push(Op::Rotate(angle));
        }
        fn scale(&mut self, sx: f32, sy: f32) {
            self.ops.push(Op::Scale(sx, sy));
        }
        fn circle(&mut self, center: Vector2D, diameter: f32) {
            self.ops.push(Op::Circle(center, diameter));
        }
        fn rect(&mut self, origin: Vector2D, _width: f32, _height: f32) {
            self.ops.push(Op::Rect(origin));
        }
        fn polygon(&mut self, points: &[Vector2D], style: PathStyle) {
            self.ops.push(Op::Polygon(points.len(), style));
        }
        fn line(&mut self, from: Vector2D, to: Vector2D) {
            self.ops.push(Op::Line(from, to));
        }
        fn text(&mut self, text: &str, _at: Vector2D) {
            self.ops.push(Op::Text(String::from(text)));
        }
    }

    #[test]
    fn test_arrow_draws_shaft_and_head() {
        let mut canvas = RecordingCanvas::default();
        canvas.arrow(Vector2D::zero(), Vector2D::new(100.0, 0.0), 0.2, Hsla::BLACK);
        assert_eq!(canvas.count(|op| matches!(op, Op::Line(..))), 3);
        assert_eq!(
            canvas.ops[1],
            Op::Line(Vector2D::zero(), Vector2D::new(20.0, 0.0))
        );
    }

    #[test]
    fn test_zero_arrow_has_no_head() {
        let mut canvas = RecordingCanvas::default();
        canvas.arrow(Vector2D::zero(), Vector2D::zero(), 0.2, Hsla::BLACK);
        assert_eq!(canvas.count(|op| matches!(op, Op::Line(..))), 1);
    }
}
