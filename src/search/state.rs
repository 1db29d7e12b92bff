//! 検索セッションの状態管理

use crate::document::{DocumentAdapter, DocumentId};

use super::marker::MarkerSet;
use super::types::SearchCounters;

/// 1回の検索操作（検索ボックスを開いてから閉じるまで）の内部状態
#[derive(Debug)]
pub struct SearchState<D: DocumentAdapter> {
    /// アタッチ中のドキュメント（`None` なら Closed）
    pub document: Option<DocumentId>,
    /// 入力欄の現在値（遅延中は `query` より先に進んでいる）
    pub input: String,
    /// マッチ集合を計算したクエリ
    pub query: String,
    /// マッチごとのハイライト
    pub markers: MarkerSet<D>,
    /// 現在選択されているマッチ
    pub current_index: Option<usize>,
    /// 直前の移動で折り返したか
    pub wrapped: bool,
}

impl<D: DocumentAdapter> SearchState<D> {
    /// 新しい状態を作成
    pub fn new() -> Self {
        Self {
            document: None,
            input: String::new(),
            query: String::new(),
            markers: MarkerSet::new(),
            current_index: None,
            wrapped: false,
        }
    }

    /// 開いているか
    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// 状態をリセット
    ///
    /// マーカーはドキュメントに触れずに破棄するため、先に `clear_all` しておくこと
    pub fn reset(&mut self) {
        self.document = None;
        self.input.clear();
        self.query.clear();
        self.markers.forget();
        self.current_index = None;
        self.wrapped = false;
    }

    /// 表示用カウンタ
    pub fn counters(&self) -> SearchCounters {
        match self.current_index {
            Some(idx) if !self.markers.is_empty() => {
                SearchCounters::new(idx + 1, self.markers.len())
            }
            _ => SearchCounters::empty(),
        }
    }
}

impl<D: DocumentAdapter> Default for SearchState<D> {
    fn default() -> Self {
        Self::new()
    }
}
