//! ドキュメントアダプタ
//!
//! 検索セッションとホストのエディタをつなぐインターフェース。
//! プレーンテキストバッファ（テキスト全体を取得して自前で照合）と
//! リッチドキュメント（ホストのネイティブ検索に委譲）の2種類の実装を持つ

pub mod plain;
pub mod rich;

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::search::{HighlightClass, MatchSpan, SearchDirection, SearchOptions};

pub use plain::{MemoryBuffer, PlainBufferAdapter, PlainBufferHost};
pub use rich::{MemoryRichDocument, RichAnchor, RichDocumentAdapter, RichDocumentHost};

/// ドキュメントの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// ドキュメント種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// 行・列で位置を表すプレーンテキスト
    Plain,
    /// 構造化されたリッチテキスト
    Rich,
    /// 検索非対応の種別
    Other(String),
}

impl DocumentKind {
    /// 検索対象にできる種別か
    pub fn is_searchable(&self) -> bool {
        matches!(self, DocumentKind::Plain | DocumentKind::Rich)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Plain => f.write_str("plain"),
            DocumentKind::Rich => f.write_str("rich"),
            DocumentKind::Other(name) => f.write_str(name),
        }
    }
}

/// ネイティブの次/前検索コマンドの実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// ネイティブの移動コマンドを持たない
    Unsupported,
    /// 実行済み。ホストが選択したマッチ番号が分かれば返す
    Stepped { selected: Option<usize> },
}

/// 検索セッションから見たドキュメント
///
/// アダプタはドキュメントを借用するだけで、ドキュメントより長く生存してはならない
pub trait DocumentAdapter {
    /// 位置を表す型
    type Anchor: Copy + Ord + fmt::Debug;
    /// ホストのハイライトハンドル
    type Handle: fmt::Debug;

    /// 対象ドキュメントの識別子
    fn document_id(&self) -> DocumentId;

    /// ドキュメント種別
    fn kind(&self) -> DocumentKind;

    /// クエリのマッチを文書順で列挙する
    fn locate(
        &mut self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<MatchSpan<Self::Anchor>>>;

    /// 範囲にハイライトを作成
    fn highlight(
        &mut self,
        span: &MatchSpan<Self::Anchor>,
        class: HighlightClass,
    ) -> Result<Self::Handle>;

    /// ハイライトを解除
    fn clear_highlight(&mut self, handle: Self::Handle);

    /// ハイライトの現在の範囲（外部編集で移動している可能性がある）
    fn marker_span(&self, handle: &Self::Handle) -> Option<MatchSpan<Self::Anchor>>;

    /// キャレット位置
    fn caret(&self) -> Self::Anchor;

    /// 範囲を画面内へスクロール
    fn scroll_into_view(&mut self, span: &MatchSpan<Self::Anchor>);

    /// 選択範囲を設定
    fn set_selection(&mut self, span: &MatchSpan<Self::Anchor>);

    /// ドキュメントへフォーカスを戻す
    fn focus(&mut self);

    /// 描画の遅延を開始
    fn begin_batch(&mut self);

    /// 描画の遅延を終了
    fn end_batch(&mut self);

    /// 現在選択中のテキスト（検索語の初期値に使う）
    fn selected_text(&self) -> Option<String> {
        None
    }

    /// セッション開始時の処理
    fn on_session_open(&mut self) {}

    /// セッション終了時の処理
    fn on_session_close(&mut self) {}

    /// ネイティブの次/前検索を `from` 番目から実行する
    fn native_step(&mut self, from: usize, direction: SearchDirection) -> StepOutcome {
        let _ = (from, direction);
        StepOutcome::Unsupported
    }
}

/// バッチ描画のスコープ
///
/// 生成時に `begin_batch`、破棄時に `end_batch` を呼ぶ。
/// パニックや早期リターンでも必ず `end_batch` が呼ばれる
pub struct BatchGuard<'a, D: DocumentAdapter + ?Sized> {
    doc: &'a mut D,
}

impl<'a, D: DocumentAdapter + ?Sized> BatchGuard<'a, D> {
    pub fn new(doc: &'a mut D) -> Self {
        doc.begin_batch();
        Self { doc }
    }
}

impl<D: DocumentAdapter + ?Sized> Deref for BatchGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.doc
    }
}

impl<D: DocumentAdapter + ?Sized> DerefMut for BatchGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: DocumentAdapter + ?Sized> Drop for BatchGuard<'_, D> {
    fn drop(&mut self) {
        self.doc.end_batch();
    }
}

/// `f` をバッチ描画スコープ内で実行する
pub fn run_batched<D, R, F>(doc: &mut D, f: F) -> R
where
    D: DocumentAdapter + ?Sized,
    F: FnOnce(&mut D) -> R,
{
    let mut guard = BatchGuard::new(doc);
    f(&mut *guard)
}
