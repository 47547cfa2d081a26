use std::path::Path;
use std::time::Duration;

use crate::assets::raster::ImageAsset;
use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// Fallback proxy used when a remote image cannot be fetched directly.
pub const DEFAULT_PROXY_PREFIX: &str = "https://cors-anywhere.herokuapp.com/";

/// Collaborator that turns an image source (path or URL) into a decoded [`ImageAsset`].
///
/// Failures are reported as [`SuperzoomError::Load`].
pub trait ImageLoader {
    /// Fetch and decode `src`.
    fn load(&self, src: &str) -> SuperzoomResult<ImageAsset>;
}

/// Return `true` for `http://` and `https://` sources.
pub fn is_remote(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loads images from the local filesystem (plain paths or `file://` URLs).
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, src: &str) -> SuperzoomResult<ImageAsset> {
        let path = src.strip_prefix("file://").unwrap_or(src);
        let bytes = std::fs::read(Path::new(path))
            .map_err(|e| SuperzoomError::load(format!("failed to read image '{path}': {e}")))?;
        ImageAsset::decode(&bytes)
    }
}

/// Loads images over HTTP(S) with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::blocking::Client,
}

impl HttpImageLoader {
    /// Build a loader with a 30s timeout and a bounded redirect policy.
    pub fn new() -> SuperzoomResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("superzoom/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SuperzoomError::load(format!("http client error: {e}")))?;
        Ok(Self { client })
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, src: &str) -> SuperzoomResult<ImageAsset> {
        let response = self
            .client
            .get(src)
            .header("Accept", "image/png,image/jpeg,image/gif,image/*;q=0.8")
            .send()
            .map_err(|e| SuperzoomError::load(format!("request for '{src}' failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SuperzoomError::load(format!("'{src}' returned HTTP {status}")));
        }
        let bytes = response
            .bytes()
            .map_err(|e| SuperzoomError::load(format!("reading '{src}' failed: {e}")))?;
        ImageAsset::decode(&bytes)
    }
}

/// Dispatches remote sources to HTTP and everything else to the filesystem.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    fs: FsImageLoader,
    http: HttpImageLoader,
}

impl SourceLoader {
    /// Create a loader for both local and remote sources.
    pub fn new() -> SuperzoomResult<Self> {
        Ok(Self {
            fs: FsImageLoader,
            http: HttpImageLoader::new()?,
        })
    }
}

impl ImageLoader for SourceLoader {
    fn load(&self, src: &str) -> SuperzoomResult<ImageAsset> {
        if is_remote(src) {
            self.http.load(src)
        } else {
            self.fs.load(src)
        }
    }
}

/// Load `src`, retrying a remote source once through `proxy_prefix`.
///
/// Local sources and loads without a proxy are attempted exactly once.
#[tracing::instrument(skip(loader))]
pub fn load_with_fallback(
    loader: &dyn ImageLoader,
    src: &str,
    proxy_prefix: Option<&str>,
) -> SuperzoomResult<ImageAsset> {
    let first = match loader.load(src) {
        Ok(img) => return Ok(img),
        Err(e) => e,
    };
    let Some(prefix) = proxy_prefix.filter(|_| is_remote(src)) else {
        return Err(first);
    };

    tracing::info!(error = %first, "direct image load failed, retrying through proxy");
    let proxied = format!("{prefix}{src}");
    loader.load(&proxied).map_err(|second| {
        SuperzoomError::load(format!(
            "image could not be loaded directly ({first}) or through the fallback proxy ({second})"
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
