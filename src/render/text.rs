use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// Brush color carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Caption drawn over the zoomed image, filled and outlined for contrast.
#[derive(Clone, Debug)]
pub struct TextOverlay {
    /// Caption text.
    pub text: String,
    /// Raw font file bytes (TTF/OTF).
    pub font_bytes: Arc<Vec<u8>>,
    /// Fill color (straight RGBA8).
    pub fill_rgba: [u8; 4],
    /// Outline color (straight RGBA8).
    pub outline_rgba: [u8; 4],
}

impl TextOverlay {
    /// White text with a black outline using the given font bytes.
    pub fn new(text: impl Into<String>, font_bytes: Vec<u8>) -> Self {
        Self {
            text: text.into(),
            font_bytes: Arc::new(font_bytes),
            fill_rgba: [255, 255, 255, 255],
            outline_rgba: [0, 0, 0, 255],
        }
    }

    /// Read the font from disk.
    pub fn from_font_file(text: impl Into<String>, font_path: &Path) -> SuperzoomResult<Self> {
        let bytes = std::fs::read(font_path)
            .with_context(|| format!("read font file '{}'", font_path.display()))?;
        Ok(Self::new(text, bytes))
    }
}

/// Ratio between surface width and the base caption font size.
pub const FONT_SIZE_DIVISOR: f64 = 17.0;

/// Base font size for a surface `width` scaled by the animated `text_size`.
pub fn font_size_px(width: u32, text_size: f64) -> f64 {
    f64::from(width) / FONT_SIZE_DIVISOR * text_size
}

struct RegisteredFont {
    source: Arc<Vec<u8>>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Parley contexts plus the last registered overlay font.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: Option<RegisteredFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: None,
        }
    }

    /// Register the overlay font once per shared byte buffer and return its paint handle.
    pub(crate) fn font_for(
        &mut self,
        overlay: &TextOverlay,
    ) -> SuperzoomResult<vello_cpu::peniko::FontData> {
        if let Some(reg) = self
            .registered
            .as_ref()
            .filter(|r| Arc::ptr_eq(&r.source, &overlay.font_bytes))
        {
            return Ok(reg.font.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(overlay.font_bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SuperzoomError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SuperzoomError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(overlay.font_bytes.as_ref().clone()),
            0,
        );
        self.registered = Some(RegisteredFont {
            source: Arc::clone(&overlay.font_bytes),
            family_name,
            font: font.clone(),
        });
        Ok(font)
    }

    /// Shape a single-line caption in the registered font.
    pub(crate) fn layout_caption(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SuperzoomResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SuperzoomError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self
            .registered
            .as_ref()
            .map(|r| r.family_name.clone())
            .ok_or_else(|| SuperzoomError::validation("no overlay font registered"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
