//! エラーハンドリング
//!
//! 検索サブシステム全体で使用するエラー型を定義
//! セッション操作はエラーを呼び出し元へ返さず、ここで定義したレベルでログに記録する

use std::path::PathBuf;
use thiserror::Error;

use crate::document::{DocumentId, DocumentKind};

/// 検索サブシステムのエラー型
#[derive(Error, Debug)]
pub enum FindError {
    /// plain / rich 以外のドキュメントに対して呼び出された
    #[error("Unsupported document type: {kind}")]
    InvalidDocumentType { kind: String },

    /// 読み取り専用ドキュメントは検索対象外
    #[error("Document is read-only")]
    ReadOnlyDocument,

    /// 非同期に解決されたアダプタが、すでに別ドキュメントへ切り替わった後に届いた
    #[error("Stale adapter for {requested}, active document is {active}")]
    StaleAsyncResult {
        requested: DocumentId,
        active: DocumentId,
    },

    /// セッションがアタッチしたものとは別のドキュメントが渡された
    #[error("Session is attached to {attached}, got {given}")]
    DocumentMismatch {
        attached: DocumentId,
        given: DocumentId,
    },

    /// セッションが開かれていない
    #[error("Search session is closed")]
    SessionClosed,

    /// 検索パターンの構築に失敗
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// ハイライトの作成に失敗
    #[error("Failed to create highlight: {message}")]
    Highlight { message: String },

    /// 設定ファイルの内容が不正
    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IOエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// デバッグ時のみ記録する
    Debug,
    /// 呼び出し規約違反など、処理は継続できるもの
    Warning,
    /// 操作が失敗したもの
    Error,
}

impl ErrorLevel {
    /// `log` クレートのレベルへ変換
    pub fn as_log_level(self) -> log::Level {
        match self {
            ErrorLevel::Debug => log::Level::Debug,
            ErrorLevel::Warning => log::Level::Warn,
            ErrorLevel::Error => log::Level::Error,
        }
    }
}

impl FindError {
    /// 種別からレベルを決定
    pub fn level(&self) -> ErrorLevel {
        match self {
            FindError::StaleAsyncResult { .. } | FindError::SessionClosed => ErrorLevel::Debug,
            FindError::InvalidDocumentType { .. }
            | FindError::ReadOnlyDocument
            | FindError::DocumentMismatch { .. } => ErrorLevel::Warning,
            FindError::InvalidPattern(_)
            | FindError::Highlight { .. }
            | FindError::Config { .. }
            | FindError::Io(_) => ErrorLevel::Error,
        }
    }

    /// 未対応のドキュメント種別エラーを作成
    pub fn invalid_kind(kind: DocumentKind) -> Self {
        FindError::InvalidDocumentType {
            kind: kind.to_string(),
        }
    }

    /// レベルに応じてログへ出力
    pub fn log(&self, context: &str) {
        log::log!(
            target: "notefind",
            self.level().as_log_level(),
            "{} in {}",
            self,
            context
        );
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, FindError>;

/// エラーを記録して破棄するためのトレイト
///
/// セッションの公開操作はエラーを伝播しないため、内部処理の結果をここで吸収する
pub trait LogOnError<T> {
    fn log_on_error(self, context: &str) -> Option<T>;
}

impl<T> LogOnError<T> for Result<T> {
    fn log_on_error(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                err.log(context);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_results_are_debug_only() {
        let err = FindError::StaleAsyncResult {
            requested: DocumentId::new(1),
            active: DocumentId::new(2),
        };
        assert_eq!(err.level(), ErrorLevel::Debug);
        assert!(err.to_string().contains("doc#1"));
    }

    #[test]
    fn contract_violations_are_warnings() {
        let err = FindError::invalid_kind(DocumentKind::Other("canvas".to_string()));
        assert_eq!(err.level(), ErrorLevel::Warning);
        assert!(err.to_string().contains("canvas"));
    }

    #[test]
    fn regex_error_converts() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: FindError = regex_err.into();
        assert!(matches!(err, FindError::InvalidPattern(_)));
        assert_eq!(err.level(), ErrorLevel::Error);
    }

    #[test]
    fn log_on_error_swallows_failure() {
        let failed: Result<usize> = Err(FindError::SessionClosed);
        assert_eq!(failed.log_on_error("test"), None);

        let ok: Result<usize> = Ok(3);
        assert_eq!(ok.log_on_error("test"), Some(3));
    }
}
