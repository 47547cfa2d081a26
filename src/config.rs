use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::animation::curve::CurveProfile;
use crate::assets::loader::DEFAULT_PROXY_PREFIX;
use crate::foundation::core::Fps;
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::render::renderer::RenderSettings;
use crate::render::text::TextOverlay;

/// Caption settings: the text and the font file used to draw it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayConfig {
    /// Caption text.
    pub text: String,
    /// TTF/OTF font file.
    pub font_path: PathBuf,
}

/// Engine configuration, loaded from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SuperzoomConfig {
    /// Tick rate for fixed-step playback and previews.
    pub fps: u32,
    /// Cap on the surface width; taller/wider images are scaled down keeping aspect ratio.
    pub max_width: Option<u32>,
    /// Clear color (straight RGBA8).
    pub background: [u8; 4],
    /// Animation curve.
    pub curve: CurveProfile,
    /// Optional caption.
    pub overlay: Option<OverlayConfig>,
    /// GIF sampling rate in Hz.
    pub gif_sample_hz: f64,
    /// Video frame rate.
    pub video_fps: f64,
    /// Proxy prefix for the single fallback fetch of remote images (`null` disables it).
    pub proxy_prefix: Option<String>,
    /// Export artifact name without extension.
    pub export_name: String,
    /// Base URL for share links.
    pub share_base: String,
}

impl Default for SuperzoomConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            max_width: None,
            background: [0, 0, 0, 255],
            curve: CurveProfile::classic(),
            overlay: None,
            gif_sample_hz: 20.0,
            video_fps: 30.0,
            proxy_prefix: Some(DEFAULT_PROXY_PREFIX.to_string()),
            export_name: "superzoom".to_string(),
            share_base: "https://superzoom.local/".to_string(),
        }
    }
}

impl SuperzoomConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SuperzoomResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SuperzoomError::validation(format!("parse superzoom config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SuperzoomResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SuperzoomError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges and the curve.
    pub fn validate(&self) -> SuperzoomResult<()> {
        if self.fps == 0 {
            return Err(SuperzoomError::validation("fps must be > 0"));
        }
        if self.max_width == Some(0) {
            return Err(SuperzoomError::validation("max_width must be > 0"));
        }
        if !self.gif_sample_hz.is_finite() || self.gif_sample_hz <= 0.0 {
            return Err(SuperzoomError::validation("gif_sample_hz must be finite and > 0"));
        }
        if !self.video_fps.is_finite() || self.video_fps <= 0.0 {
            return Err(SuperzoomError::validation("video_fps must be finite and > 0"));
        }
        if let Some(o) = &self.overlay
            && o.text.trim().is_empty()
        {
            return Err(SuperzoomError::validation("overlay text must not be empty"));
        }
        self.curve.validate()
    }

    /// Playback rate as [`Fps`].
    pub fn fps(&self) -> SuperzoomResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Renderer settings derived from this config.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            background_rgba: self.background,
        }
    }

    /// Load the caption font, if a caption is configured.
    pub fn text_overlay(&self) -> SuperzoomResult<Option<TextOverlay>> {
        self.overlay
            .as_ref()
            .map(|o| TextOverlay::from_font_file(o.text.clone(), &o.font_path))
            .transpose()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
