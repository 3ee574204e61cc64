use crate::foundation::core::Rgba8;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Immediate-mode drawing surface driven once per frame.
///
/// Coordinates are in pixels. Until [`Surface::invert_y`] is called the origin is the top-left
/// corner with y growing downward; afterwards the origin is bottom-left with y growing upward.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Fill the whole surface with `color`, discarding previous content.
    fn clear(&mut self, color: Rgba8);

    /// Set the paint used by subsequent fills and text.
    fn set_color(&mut self, color: Rgba8);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);

    /// Draw `text` with its baseline origin at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64);

    fn invert_y(&mut self);

    /// Rasterize everything drawn so far. Surfaces without pixels return `None`.
    fn snapshot(&mut self) -> Option<FrameRGBA> {
        None
    }
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub inverted: bool,
    pub ops: Vec<DrawCall>,
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear(Rgba8),
    SetColor(Rgba8),
    Circle { x: f64, y: f64, radius: f64 },
    Text { text: String, x: f64, y: f64 },
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn circles(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawCall::Circle { .. }))
            .count()
    }

    /// Text drawn since the last clear.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba8) {
        self.ops.clear();
        self.ops.push(DrawCall::Clear(color));
    }

    fn set_color(&mut self, color: Rgba8) {
        self.ops.push(DrawCall::SetColor(color));
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawCall::Circle { x, y, radius });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn invert_y(&mut self) {
        self.inverted = true;
    }
}
