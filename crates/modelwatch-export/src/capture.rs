//! Capture adapter contract: rasterize a named visual region.
//!
//! Capturing is owned by whatever renders the charts. The export path only
//! needs image bytes for a region id, and treats a missing region as a
//! degraded section rather than an error.
use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Raster image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl CapturedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: "image/png".to_string(),
        }
    }

    /// `data:` URI for embedding in a self-contained artifact.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Produces a raster image of a named visual region.
///
/// Implementations must not fail: a region that does not exist (or cannot be
/// rasterized) yields `None` and a warning.
#[async_trait]
pub trait CaptureAdapter: Send + Sync {
    async fn capture(&self, target: &str) -> Option<CapturedImage>;
}

/// Adapter that has nothing rendered; every capture misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCaptureAdapter;

#[async_trait]
impl CaptureAdapter for NullCaptureAdapter {
    async fn capture(&self, target: &str) -> Option<CapturedImage> {
        log::warn!("No renderer attached; region '{}' not captured", target);
        None
    }
}

/// Reads pre-rendered section images from `<root>/<target>.{png,jpg,jpeg}`.
#[derive(Debug, Clone)]
pub struct DirectoryCaptureAdapter {
    root: PathBuf,
}

impl DirectoryCaptureAdapter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

const IMAGE_EXTENSIONS: [(&str, &str); 3] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

#[async_trait]
impl CaptureAdapter for DirectoryCaptureAdapter {
    async fn capture(&self, target: &str) -> Option<CapturedImage> {
        for (ext, mime) in IMAGE_EXTENSIONS {
            let path = self.root.join(format!("{}.{}", target, ext));
            match tokio::fs::read(&path).await {
                Ok(bytes) if bytes.is_empty() => {
                    log::warn!("Capture for '{}' is empty: {}", target, path.display());
                    return None;
                }
                Ok(bytes) => {
                    log::debug!("Captured '{}' from {} ({} bytes)", target, path.display(), bytes.len());
                    return Some(CapturedImage {
                        bytes,
                        mime: mime.to_string(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Failed to read capture {}: {}", path.display(), e);
                    return None;
                }
            }
        }
        log::warn!(
            "Region '{}' not found under {}; section will be exported without an image",
            target,
            self.root.display()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_adapter_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("section-a.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let adapter = DirectoryCaptureAdapter::new(dir.path());
        let image = adapter.capture("section-a").await.unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes.len(), 4);
    }

    #[tokio::test]
    async fn directory_adapter_misses_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = DirectoryCaptureAdapter::new(dir.path());
        assert!(adapter.capture("section-missing").await.is_none());
    }

    #[test]
    fn data_uri_is_base64() {
        let image = CapturedImage::png(b"abc".to_vec());
        assert_eq!(image.data_uri(), "data:image/png;base64,YWJj");
    }
}
