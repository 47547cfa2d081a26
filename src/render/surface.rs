use crate::foundation::core::CanvasDimensions;
use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// A sampled frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Convert to a straight-alpha `image` buffer (for PNG/GIF encoders).
    pub fn to_rgba_image(&self) -> SuperzoomResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| SuperzoomError::validation("frame data size mismatch with width*height*4"))
    }
}

/// The drawing surface a controller paints into and recording sinks sample from.
///
/// Pixels are premultiplied RGBA8. Sinks read the surface directly through [`Surface::pixels`].
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    dims: CanvasDimensions,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("dims", &self.dims).finish()
    }
}

impl Surface {
    /// Allocate a transparent surface. Both sides must fit in `u16`.
    pub fn new(dims: CanvasDimensions) -> SuperzoomResult<Self> {
        let w: u16 = dims
            .width
            .try_into()
            .map_err(|_| SuperzoomError::validation("surface width exceeds u16"))?;
        let h: u16 = dims
            .height
            .try_into()
            .map_err(|_| SuperzoomError::validation("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(SuperzoomError::validation(
                "surface width/height must be non-zero",
            ));
        }
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
            dims,
        })
    }

    /// Surface size in pixels.
    pub fn dimensions(&self) -> CanvasDimensions {
        self.dims
    }

    /// Premultiplied RGBA8 pixels of the last painted frame.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy the current pixels into a [`FrameRGBA`].
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.dims.width,
            height: self.dims.height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
