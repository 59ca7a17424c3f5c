//! FileSystem 経由で画像を読む ImageLoader 実装
//!
//! MIME 種別は拡張子から決める（中身は見ない）。

use crate::ports::outbound::{ImageLoader, ImagePayload};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::error::Error;
use common::ports::outbound::FileSystem;
use std::path::Path;
use std::sync::Arc;

/// 送信できる画像の上限
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

pub struct StdImageLoader {
    fs: Arc<dyn FileSystem>,
}

impl StdImageLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

/// 拡張子（大文字小文字無視）から画像の MIME 種別を返す
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

impl ImageLoader for StdImageLoader {
    fn load(&self, path: &Path) -> Result<ImagePayload, Error> {
        let mime_type = mime_type_for(path).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Please upload an image file (png, jpg, webp, gif, heic): {}",
                path.display()
            ))
        })?;

        let meta = self.fs.metadata(path)?;
        if !meta.is_file() {
            return Err(Error::invalid_argument(format!(
                "Not a file: {}",
                path.display()
            )));
        }
        if meta.len() > MAX_IMAGE_BYTES {
            return Err(Error::invalid_argument(format!(
                "Image is too large ({} bytes, limit {} bytes): {}",
                meta.len(),
                MAX_IMAGE_BYTES,
                path.display()
            )));
        }

        let bytes = self.fs.read(path)?;
        Ok(ImagePayload::new(mime_type, STANDARD.encode(bytes)))
    }
}
