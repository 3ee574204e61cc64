use crate::{
    foundation::core::{Canvas, Rgba8},
    render::surface::Surface,
};

/// Text drawn above a scene's particles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caption {
    /// Clock counting toward midnight as particles are admitted: `23:59:55` up to `00:00:00`.
    Countdown,
    /// Fixed text.
    Banner(String),
}

impl Caption {
    pub fn text(&self, admitted: usize, total: usize) -> String {
        match self {
            Self::Countdown => {
                let seconds = 55 + (5 * admitted).checked_div(total).unwrap_or(5);
                if seconds < 60 {
                    format!("23:59:{seconds}")
                } else {
                    "00:00:00".to_string()
                }
            }
            Self::Banner(text) => text.clone(),
        }
    }

    /// Baseline position relative to the canvas center.
    fn anchor(&self, canvas: Canvas) -> (f64, f64) {
        let dy = match self {
            Self::Countdown => 10.0,
            Self::Banner(_) => 5.0,
        };
        (canvas.width_f64() / 2.0 - 20.0, canvas.height_f64() / 2.0 + dy)
    }
}

/// Per-frame backdrop of a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decor {
    pub background: Rgba8,
    pub caption: Caption,
    pub caption_color: Rgba8,
}

impl Decor {
    pub fn snowfall() -> Self {
        Self {
            background: Rgba8::BLACK,
            caption: Caption::Countdown,
            caption_color: Rgba8::WHITE,
        }
    }

    pub fn fireworks() -> Self {
        Self {
            background: Rgba8::BLACK,
            caption: Caption::Banner("NEW YEAR".to_string()),
            caption_color: Rgba8::WHITE,
        }
    }

    /// Clear to the background and draw the caption.
    pub fn draw(&self, surface: &mut dyn Surface, canvas: Canvas, admitted: usize, total: usize) {
        surface.clear(self.background);
        surface.set_color(self.caption_color);
        let (x, y) = self.caption.anchor(canvas);
        surface.draw_text(&self.caption.text(admitted, total), x, y);
    }
}
