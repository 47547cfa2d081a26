use std::cell::RefCell;
use std::path::PathBuf;

use super::*;

/// Records requested sources and succeeds only for those in `ok`.
struct ScriptedLoader {
    ok: Vec<String>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedLoader {
    fn new(ok: &[&str]) -> Self {
        Self {
            ok: ok.iter().map(|s| s.to_string()).collect(),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, src: &str) -> SuperzoomResult<ImageAsset> {
        self.seen.borrow_mut().push(src.to_string());
        if self.ok.iter().any(|s| s == src) {
            ImageAsset::from_rgba8(1, 1, vec![1, 2, 3, 255])
        } else {
            Err(SuperzoomError::load(format!("no such image: {src}")))
        }
    }
}

#[test]
fn remote_detection() {
    assert!(is_remote("https://example.com/a.png"));
    assert!(is_remote("HTTP://example.com/a.png"));
    assert!(!is_remote("/tmp/a.png"));
    assert!(!is_remote("file:///tmp/a.png"));
}

#[test]
fn direct_success_skips_proxy() {
    let l = ScriptedLoader::new(&["https://x.test/a.png"]);
    load_with_fallback(&l, "https://x.test/a.png", Some("https://proxy/")).unwrap();
    assert_eq!(l.seen.borrow().len(), 1);
}

#[test]
fn remote_failure_retries_once_through_proxy() {
    let l = ScriptedLoader::new(&["https://proxy/https://x.test/a.png"]);
    load_with_fallback(&l, "https://x.test/a.png", Some("https://proxy/")).unwrap();
    assert_eq!(
        l.seen.borrow().as_slice(),
        &[
            "https://x.test/a.png".to_string(),
            "https://proxy/https://x.test/a.png".to_string()
        ]
    );
}

#[test]
fn both_attempts_failing_is_a_single_load_error() {
    let l = ScriptedLoader::new(&[]);
    let err = load_with_fallback(&l, "https://x.test/a.png", Some("https://proxy/")).unwrap_err();
    assert!(matches!(err, SuperzoomError::Load(_)));
    assert!(err.to_string().contains("fallback proxy"));
    assert_eq!(l.seen.borrow().len(), 2);
}

#[test]
fn local_sources_never_use_proxy() {
    let l = ScriptedLoader::new(&[]);
    assert!(load_with_fallback(&l, "/nope.png", Some("https://proxy/")).is_err());
    assert_eq!(l.seen.borrow().len(), 1);
}

#[test]
fn fs_loader_reads_file_urls() {
    let dir = PathBuf::from("target").join("loader_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("one.png");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let abs = std::fs::canonicalize(&path).unwrap();
    let url = format!("file://{}", abs.display());
    let img = FsImageLoader.load(&url).unwrap();
    assert_eq!((img.width, img.height), (3, 2));

    let err = FsImageLoader.load("target/loader_unit/missing.png").unwrap_err();
    assert!(matches!(err, SuperzoomError::Load(_)));
}
