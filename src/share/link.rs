use url::form_urlencoded;

use crate::foundation::core::{FocusPoint, round2};

/// Image extensions whose leading dot is protected in share links.
pub const PROTECTED_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "avif"];

/// Replaces the dot in front of a protected extension so link-preview rewriters leave it alone.
pub const DOT_MARKER: &str = "!--!";

/// A shareable view: the focus point plus the source image URL.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShareLink {
    /// Focus point, rounded to two decimals when encoded.
    pub focus: FocusPoint,
    /// Source image URL (may be empty when decoded from a link without one).
    pub image_url: String,
}

impl ShareLink {
    /// Create a link for `image_url` zooming toward `focus`.
    pub fn new(focus: FocusPoint, image_url: impl Into<String>) -> Self {
        Self {
            focus,
            image_url: image_url.into(),
        }
    }

    /// Query-string form: `<base>?f=<x>x<y>&u=<encoded url>`.
    pub fn encode(&self, base: &str) -> String {
        format!(
            "{base}?f={}&u={}",
            focus_token(self.focus),
            protect_extensions(&form_urlencoded::byte_serialize(self.image_url.as_bytes()).collect::<String>())
        )
    }

    /// Path form: `<base>/i/<x>x<y>/<encoded url>`.
    ///
    /// Spaces are written as `%20`, since a `+` in a path segment is read back literally.
    pub fn encode_path(&self, base: &str) -> String {
        let encoded = form_urlencoded::byte_serialize(self.image_url.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!(
            "{}/i/{}/{}",
            base.trim_end_matches('/'),
            focus_token(self.focus),
            protect_extensions(&encoded)
        )
    }

    /// Parse the query-string form. Never fails.
    ///
    /// A missing or malformed `f` yields the center focus; a missing `u` yields an empty URL.
    /// Anything before `?` is ignored, as is a `#fragment`.
    pub fn decode(link: &str) -> Self {
        let query = link.split_once('?').map(|(_, q)| q).unwrap_or(link);
        let query = query.split_once('#').map(|(q, _)| q).unwrap_or(query);
        let query = query.replace(DOT_MARKER, ".");

        let mut focus = None;
        let mut image_url = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "f" if focus.is_none() => focus = Some(parse_focus(&value)),
                "u" if image_url.is_none() => image_url = Some(value.into_owned()),
                _ => {}
            }
        }
        Self {
            focus: focus.flatten().unwrap_or_default(),
            image_url: image_url.unwrap_or_default(),
        }
    }

    /// Parse the path form `/i/<x>x<y>/<url>`. Never fails.
    ///
    /// The URL keeps its own slashes; `+` is kept literally.
    pub fn decode_path(path: &str) -> Self {
        let path = path.split_once('#').map(|(p, _)| p).unwrap_or(path);
        let rest = match path.find("/i/") {
            Some(i) => &path[i + 3..],
            None => path.trim_start_matches('/'),
        };
        let (focus_part, url_part) = rest.split_once('/').unwrap_or((rest, ""));
        let url_part = url_part.replace(DOT_MARKER, ".").replace('+', "%2B");
        let image_url = form_urlencoded::parse(format!("u={url_part}").as_bytes())
            .find(|(k, _)| k == "u")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        Self {
            focus: parse_focus(focus_part).unwrap_or_default(),
            image_url,
        }
    }
}

fn focus_token(focus: FocusPoint) -> String {
    let f = focus.rounded();
    format!("{}x{}", f.x, f.y)
}

fn parse_focus(token: &str) -> Option<FocusPoint> {
    let (x, y) = token.trim().split_once('x')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then(|| FocusPoint::new(round2(x), round2(y)))
}

/// Swap `.ext` for `!--!ext` where `ext` is a protected extension ending a token.
fn protect_extensions(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = String::with_capacity(encoded.len() + 8);
    let mut last = 0;
    for (i, _) in encoded.match_indices('.') {
        let tail = &encoded[i + 1..];
        let hit = PROTECTED_EXTENSIONS.iter().find(|ext| {
            tail.len() >= ext.len()
                && tail.as_bytes()[..ext.len()].eq_ignore_ascii_case(ext.as_bytes())
                && !bytes
                    .get(i + 1 + ext.len())
                    .is_some_and(|b| b.is_ascii_alphanumeric())
        });
        if hit.is_some() {
            out.push_str(&encoded[last..i]);
            out.push_str(DOT_MARKER);
            last = i + 1;
        }
    }
    out.push_str(&encoded[last..]);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/share/link.rs"]
mod tests;
