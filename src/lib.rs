//! notefind - ノート内インクリメンタル検索
//!
//! プレーンテキストバッファとリッチテキスト文書の両方に対して、
//! 検索・ハイライト・マッチ間移動を提供する

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// ドキュメント層
pub mod document;
pub mod host;

// ロジック層
pub mod search;

// 公開API
pub use config::{FindConfig, SearchMode};
pub use document::{DocumentAdapter, DocumentId, DocumentKind};
pub use error::{FindError, Result};
pub use search::{SearchCounters, SearchDirection, SearchSession};
