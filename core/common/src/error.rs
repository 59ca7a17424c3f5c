//! エラーハンドリング
//!
//! 1 回のコマンド実行で扱うエラーを 1 つの enum にまとめ、終了コード（sysexits 準拠）を持たせる。

use thiserror::Error;

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// 認証情報・設定が無い
    #[error("{0}")]
    NotConfigured(String),
    /// 通信・サービス側のエラー（そのまま呼び出し元へ返す）
    #[error("{0}")]
    Http(String),
    /// モデルの応答が空
    #[error("{0}")]
    NoResponse(String),
    /// モデルの応答から使える JSON を取り出せない
    #[error("{0}")]
    MalformedResponse(String),
    /// ローカル JSON（設定ファイル等）の解析エラー
    #[error("{0}")]
    Json(String),
    /// キー・バリューストアの容量超過
    #[error("{0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn no_response(msg: impl Into<String>) -> Self {
        Self::NoResponse(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// プロセスの終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::NoResponse(_) | Self::MalformedResponse(_) | Self::Json(_) => 65,
            Self::Http(_) => 69,
            Self::System(_) => 70,
            Self::QuotaExceeded(_) => 73,
            Self::Io(_) => 74,
            Self::NotConfigured(_) => 78,
        }
    }

    /// usage を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::invalid_argument("x").exit_code(), 64);
        assert_eq!(Error::malformed("x").exit_code(), 65);
        assert_eq!(Error::no_response("x").exit_code(), 65);
        assert_eq!(Error::http("x").exit_code(), 69);
        assert_eq!(Error::quota_exceeded("x").exit_code(), 73);
        assert_eq!(Error::io_msg("x").exit_code(), 74);
        assert_eq!(Error::not_configured("x").exit_code(), 78);
    }

    #[test]
    fn test_display_is_message() {
        let err = Error::http("Gemini API error: quota");
        assert_eq!(err.to_string(), "Gemini API error: quota");
    }

    #[test]
    fn test_is_usage() {
        assert!(Error::invalid_argument("bad").is_usage());
        assert!(!Error::system("bad").is_usage());
    }
}
