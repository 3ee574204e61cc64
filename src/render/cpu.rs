use vello_cpu::kurbo::{Affine, Circle, Rect, Shape as _};

use crate::{
    foundation::{
        core::Rgba8,
        error::{SceneError, SceneResult},
    },
    render::surface::{FrameRGBA, Surface},
};

/// Curve flattening tolerance for circles, in pixels.
const CIRCLE_TOLERANCE: f64 = 0.1;

/// Default caption size in pixels.
pub const DEFAULT_FONT_SIZE_PX: f32 = 24.0;

/// Headless raster surface backed by `vello_cpu`.
///
/// Draw calls are recorded into a render context and rasterized on [`Surface::snapshot`]. Output
/// is premultiplied RGBA8.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    base: Affine,
    inverted: bool,
    color: Rgba8,
    text: Option<TextRenderer>,
    missing_font_logged: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("inverted", &self.inverted)
            .field("has_font", &self.text.is_some())
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::validation("surface width/height must be non-zero"));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| SceneError::render(format!("surface width exceeds u16: {width}")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| SceneError::render(format!("surface height exceeds u16: {height}")))?;

        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            base: Affine::IDENTITY,
            inverted: false,
            color: Rgba8::WHITE,
            text: None,
            missing_font_logged: false,
        })
    }

    /// Enable text drawing with the given font file contents.
    pub fn with_font(mut self, font_bytes: Vec<u8>, size_px: f32) -> SceneResult<Self> {
        self.text = Some(TextRenderer::new(font_bytes, size_px)?);
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    fn paint(&mut self) {
        let c = self.color;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }
}

impl Surface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a));
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        if !(radius.is_finite() && radius > 0.0 && x.is_finite() && y.is_finite()) {
            return;
        }
        self.ctx.set_transform(self.base);
        self.paint();
        let path = Circle::new((x, y), radius).to_path(CIRCLE_TOLERANCE);
        self.ctx.fill_path(&path);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        let Some(renderer) = self.text.as_mut() else {
            if !self.missing_font_logged {
                tracing::debug!(text, "no font configured, skipping text");
                self.missing_font_logged = true;
            }
            return;
        };

        let font = renderer.font.clone();
        let layout = match renderer.layout(text) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, text, "text layout failed");
                return;
            }
        };
        let baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or(0.0);

        // Glyph outlines are y-down; undo the canvas flip for them.
        let flip = if self.inverted {
            Affine::scale_non_uniform(1.0, -1.0)
        } else {
            Affine::IDENTITY
        };
        let tr = self.base * Affine::translate((x, y)) * flip * Affine::translate((0.0, -baseline));

        let c = self.color;
        self.ctx.set_transform(tr);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn invert_y(&mut self) {
        self.inverted = true;
        self.base = Affine::translate((0.0, f64::from(self.height)))
            * Affine::scale_non_uniform(1.0, -1.0);
    }

    fn snapshot(&mut self) -> Option<FrameRGBA> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Some(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

/// Parley layout state for a single registered font.
struct TextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
    cached: Option<(String, parley::Layout<Rgba8>)>,
}

impl TextRenderer {
    fn new(font_bytes: Vec<u8>, size_px: f32) -> SceneResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SceneError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SceneError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SceneError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
            size_px,
            cached: None,
        })
    }

    /// Lay out `text` on a single line, reusing the previous layout when the text is unchanged.
    fn layout(&mut self, text: &str) -> SceneResult<&parley::Layout<Rgba8>> {
        let stale = self.cached.as_ref().is_none_or(|(t, _)| t != text);
        if stale {
            let mut builder = self
                .layout_ctx
                .ranged_builder(&mut self.font_ctx, text, 1.0, true);
            builder.push_default(parley::style::StyleProperty::FontStack(
                parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
            ));
            builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
            builder.push_default(parley::style::StyleProperty::Brush(Rgba8::WHITE));

            let mut layout: parley::Layout<Rgba8> = builder.build(text);
            layout.break_all_lines(None);
            self.cached = Some((text.to_string(), layout));
        }
        self.cached
            .as_ref()
            .map(|(_, layout)| layout)
            .ok_or_else(|| SceneError::render("text layout cache is empty (unexpected)"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
