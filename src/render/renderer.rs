use std::sync::Arc;

use crate::animation::curve::AnimationState;
use crate::assets::raster::ImageAsset;
use crate::foundation::core::{Affine, CanvasDimensions, FocusPoint};
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::render::surface::Surface;
use crate::render::text::{TextBrushRgba8, TextLayoutEngine, TextOverlay, font_size_px};

/// Renderer settings shared by every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Color the surface is cleared to before each frame (straight RGBA8).
    pub background_rgba: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background_rgba: [0, 0, 0, 255],
        }
    }
}

/// Transform that zooms by `state.scale` and rotates by `state.rotation` around `focus`.
///
/// Equivalent to translating to the focus pixel, scaling, rotating, then translating back.
pub fn focus_transform(
    focus: FocusPoint,
    state: &AnimationState,
    dims: CanvasDimensions,
) -> Affine {
    let f = focus.to_pixels(dims);
    Affine::translate(f)
        * Affine::scale(state.scale)
        * Affine::rotate(state.rotation)
        * Affine::translate(-f)
}

#[derive(Clone)]
struct ImagePaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU frame renderer powered by `vello_cpu`.
///
/// Reuses its render context, the image paint, and the caption font across frames.
pub struct FrameRenderer {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
    image_paint: Option<ImagePaint>,
    text_engine: TextLayoutEngine,
}

impl FrameRenderer {
    /// Create a renderer.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ctx: None,
            image_paint: None,
            text_engine: TextLayoutEngine::new(),
        }
    }

    /// Renderer settings.
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Paint one frame of the superzoom onto `surface`.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        image: &ImageAsset,
        focus: FocusPoint,
        state: &AnimationState,
        overlay: Option<&TextOverlay>,
    ) -> SuperzoomResult<()> {
        if !focus.is_finite() {
            return Err(SuperzoomError::validation("focus point must be finite"));
        }
        let finite_state = [
            state.scale,
            state.rotation,
            state.text_x,
            state.text_y,
            state.text_size,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite_state {
            return Err(SuperzoomError::animation("animation state must be finite"));
        }

        let dims = surface.dimensions();
        let image_tr = focus_transform(focus, state, dims) * fill_transform(image, dims);
        let paint = self.image_paint_for(image)?;
        let caption = match overlay {
            Some(o) if state.text_size > 0.0 && !o.text.is_empty() => Some(o),
            _ => None,
        };

        self.with_ctx_mut(surface, |this, ctx| {
            this.clear(ctx, dims);

            ctx.set_transform(affine_to_cpu(image_tr));
            ctx.set_paint(paint.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(paint.w),
                f64::from(paint.h),
            ));

            // Overlay is placed in plain surface coordinates.
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if let Some(o) = caption {
                this.draw_caption(ctx, o, state, dims)?;
            }
            Ok(())
        })
    }

    /// Paint the unanimated image (identity transform, no caption).
    pub fn render_static(&mut self, surface: &mut Surface, image: &ImageAsset) -> SuperzoomResult<()> {
        self.render(
            surface,
            image,
            FocusPoint::center(),
            &AnimationState::identity(),
            None,
        )
    }

    fn with_ctx_mut(
        &mut self,
        surface: &mut Surface,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> SuperzoomResult<()>,
    ) -> SuperzoomResult<()> {
        let pixmap = surface.pixmap_mut();
        let (width, height) = (pixmap.width(), pixmap.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        f(self, &mut ctx)?;
        ctx.flush();
        ctx.render_to_pixmap(pixmap);
        self.ctx = Some(ctx);
        Ok(())
    }

    fn clear(&self, ctx: &mut vello_cpu::RenderContext, dims: CanvasDimensions) {
        let [r, g, b, a] = self.settings.background_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(dims.width),
            f64::from(dims.height),
        ));
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        overlay: &TextOverlay,
        state: &AnimationState,
        dims: CanvasDimensions,
    ) -> SuperzoomResult<()> {
        let size = font_size_px(dims.width, state.text_size) as f32;
        if size < 0.5 {
            return Ok(());
        }
        let font = self.text_engine.font_for(overlay)?;
        let layout = self.text_engine.layout_caption(
            &overlay.text,
            size,
            TextBrushRgba8::from(overlay.fill_rgba),
        )?;

        // Caption is centered on (text_x, text_y).
        let origin_x = state.text_x * f64::from(dims.width) - f64::from(layout.width()) / 2.0;
        let origin_y = state.text_y * f64::from(dims.height) - f64::from(layout.height()) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));

        let [or, og, ob, oa] = overlay.outline_rgba;
        let stroke_width = (f64::from(size) / 24.0).max(1.0);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = || {
                    run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                };
                let font_size = run.run().font_size();

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                ctx.glyph_run(&font).font_size(font_size).fill_glyphs(glyphs());

                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(or, og, ob, oa));
                ctx.glyph_run(&font).font_size(font_size).stroke_glyphs(glyphs());
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn image_paint_for(&mut self, image: &ImageAsset) -> SuperzoomResult<ImagePaint> {
        if let Some(p) = self
            .image_paint
            .as_ref()
            .filter(|p| Arc::ptr_eq(&p.source, &image.rgba8_premul))
        {
            return Ok(p.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let out = ImagePaint {
            source: Arc::clone(&image.rgba8_premul),
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: image.width,
            h: image.height,
        };
        self.image_paint = Some(out.clone());
        Ok(out)
    }
}

/// Scale from intrinsic image pixels to the surface box.
fn fill_transform(image: &ImageAsset, dims: CanvasDimensions) -> Affine {
    Affine::scale_non_uniform(
        f64::from(dims.width) / f64::from(image.width),
        f64::from(dims.height) / f64::from(image.height),
    )
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SuperzoomResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SuperzoomError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SuperzoomError::validation("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SuperzoomError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
