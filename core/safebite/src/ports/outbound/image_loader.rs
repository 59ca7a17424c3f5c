//! 画像読み込みの Outbound ポート

use common::error::Error;
use std::path::Path;

/// モデルへ送る画像（base64 済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// 例: image/jpeg
    pub mime_type: String,
    /// 標準 base64（パディングあり）
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// レコードに残す `data:<mime>;base64,<data>` 形式
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// パスから画像を読み、MIME 種別と base64 データにする能力
pub trait ImageLoader: Send + Sync {
    /// 対応外の拡張子・サイズ超過は Error::InvalidArgument、読めなければ Error::Io
    fn load(&self, path: &Path) -> Result<ImagePayload, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let img = ImagePayload::new("image/png", "iVBORw0KGgo=");
        assert_eq!(img.data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }
}
