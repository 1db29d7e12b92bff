//! 検索関連の共通型

use std::fmt;

use serde::{Deserialize, Serialize};

/// プレーンテキストバッファ内の位置（0ベース）
///
/// 行→列の順で比較される
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// 行番号
    pub line: usize,
    /// 列番号（文字単位）
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 1件のマッチ範囲
///
/// プレーンテキストでは `A = Position`、リッチドキュメントではホストのアンカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan<A> {
    /// 開始位置
    pub start: A,
    /// 終了位置（排他的）
    pub end: A,
}

impl<A> MatchSpan<A> {
    pub fn new(start: A, end: A) -> Self {
        Self { start, end }
    }
}

/// ハイライトの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightClass {
    /// 通常のマッチ
    Normal,
    /// 現在選択中のマッチ
    Selected,
}

impl HighlightClass {
    /// ホストに渡すスタイルクラス名
    pub fn css_class(self) -> &'static str {
        match self {
            HighlightClass::Normal => "find-result",
            HighlightClass::Selected => "find-result-selected",
        }
    }
}

/// 移動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// 次のマッチへ（Enter / F3）
    Forward,
    /// 前のマッチへ（Shift+Enter / Shift+F3）
    Backward,
}

impl SearchDirection {
    /// インデックスの増分
    pub fn delta(self) -> isize {
        match self {
            SearchDirection::Forward => 1,
            SearchDirection::Backward => -1,
        }
    }

    /// Shift 修飾の有無から方向を決定
    pub fn from_shift(shift: bool) -> Self {
        if shift {
            SearchDirection::Backward
        } else {
            SearchDirection::Forward
        }
    }
}

/// 検索オプション
///
/// `regex` と `whole_word` は予約のみで、指定されてもリテラル検索として扱う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// 大文字小文字を区別する
    pub case_sensitive: bool,
    /// 正規表現検索（未対応）
    pub regex: bool,
    /// 単語単位検索（未対応）
    pub whole_word: bool,
}

/// UI に表示するカウンタ（現在番号は1ベース、`0/0` は未検索またはマッチなし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchCounters {
    /// 現在のマッチ番号
    pub current: usize,
    /// 総マッチ数
    pub total: usize,
}

impl SearchCounters {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// `0/0` 状態
    pub fn empty() -> Self {
        Self::default()
    }
}

impl fmt::Display for SearchCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// 検索状態の表示ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// 検索語が空
    Idle,
    /// 検索中（マッチあり）
    Active,
    /// マッチが見つからない
    NotFound,
    /// 折り返しが発生
    Wrapped,
}

/// 検索ボックスに表示する状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUiState {
    /// 入力欄の現在値
    pub input: String,
    /// 最後に検索したクエリ
    pub query: String,
    /// ステータス
    pub status: SearchStatus,
    /// カウンタ
    pub counters: SearchCounters,
    /// 検索待ちがあるか
    pub pending: bool,
}

impl SearchUiState {
    /// エラー表示すべきか判定
    pub fn is_error(&self) -> bool {
        matches!(self.status, SearchStatus::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn counters_display() {
        assert_eq!(SearchCounters::new(1, 3).to_string(), "1/3");
        assert_eq!(SearchCounters::empty().to_string(), "0/0");
    }

    #[test]
    fn shift_selects_backward() {
        assert_eq!(SearchDirection::from_shift(true), SearchDirection::Backward);
        assert_eq!(SearchDirection::from_shift(false).delta(), 1);
    }
}
