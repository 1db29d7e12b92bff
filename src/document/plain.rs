//! プレーンテキストバッファ用アダプタ
//!
//! テキスト全体を取得してリテラルマッチャーで照合し、行・列で範囲を扱う

use std::fmt;

use super::{DocumentAdapter, DocumentId, DocumentKind};
use crate::error::{FindError, Result};
use crate::search::{
    HighlightClass, LiteralMatcher, MatchSpan, Position, SearchOptions, StringMatcher,
};

/// プレーンテキストエディタがホスト側で提供する操作
pub trait PlainBufferHost {
    /// マーカーハンドル
    type Mark: fmt::Debug;

    /// バッファ全体のテキスト
    fn text(&self) -> String;

    /// 範囲にスタイルクラス付きのマーカーを付ける
    fn mark_text(&mut self, from: Position, to: Position, class: HighlightClass) -> Result<Self::Mark>;

    /// マーカーを外す
    fn clear_mark(&mut self, mark: Self::Mark);

    /// マーカーの現在範囲
    fn find_mark(&self, mark: &Self::Mark) -> Option<(Position, Position)>;

    /// カーソル位置
    fn cursor(&self) -> Position;

    /// 選択範囲を設定（カーソルは `from` に置く）
    fn set_selection(&mut self, from: Position, to: Position);

    /// 選択中のテキスト
    fn selection_text(&self) -> String;

    /// 位置を画面内へスクロール
    fn scroll_into_view(&mut self, pos: Position);

    /// フォーカスを得る
    fn focus(&mut self);

    /// カーソル下の単語を強調する機能の有効状態
    fn highlight_selection_matches(&self) -> bool;

    /// カーソル下の単語を強調する機能を切り替える
    fn set_highlight_selection_matches(&mut self, enabled: bool);

    /// 描画をまとめる操作の開始
    fn begin_operation(&mut self);

    /// 描画をまとめる操作の終了
    fn end_operation(&mut self);
}

impl<T: PlainBufferHost + ?Sized> PlainBufferHost for &mut T {
    type Mark = T::Mark;

    fn text(&self) -> String {
        (**self).text()
    }

    fn mark_text(&mut self, from: Position, to: Position, class: HighlightClass) -> Result<Self::Mark> {
        (**self).mark_text(from, to, class)
    }

    fn clear_mark(&mut self, mark: Self::Mark) {
        (**self).clear_mark(mark)
    }

    fn find_mark(&self, mark: &Self::Mark) -> Option<(Position, Position)> {
        (**self).find_mark(mark)
    }

    fn cursor(&self) -> Position {
        (**self).cursor()
    }

    fn set_selection(&mut self, from: Position, to: Position) {
        (**self).set_selection(from, to)
    }

    fn selection_text(&self) -> String {
        (**self).selection_text()
    }

    fn scroll_into_view(&mut self, pos: Position) {
        (**self).scroll_into_view(pos)
    }

    fn focus(&mut self) {
        (**self).focus()
    }

    fn highlight_selection_matches(&self) -> bool {
        (**self).highlight_selection_matches()
    }

    fn set_highlight_selection_matches(&mut self, enabled: bool) {
        (**self).set_highlight_selection_matches(enabled)
    }

    fn begin_operation(&mut self) {
        (**self).begin_operation()
    }

    fn end_operation(&mut self) {
        (**self).end_operation()
    }
}

/// プレーンテキストバッファのアダプタ
#[derive(Debug)]
pub struct PlainBufferAdapter<B: PlainBufferHost, M: StringMatcher = LiteralMatcher> {
    id: DocumentId,
    host: B,
    matcher: M,
    saved_highlight_matches: Option<bool>,
}

impl<B: PlainBufferHost> PlainBufferAdapter<B, LiteralMatcher> {
    /// 既定のリテラルマッチャーで作成
    pub fn new(id: DocumentId, host: B) -> Self {
        Self::with_matcher(id, host, LiteralMatcher::new())
    }
}

impl<B: PlainBufferHost, M: StringMatcher> PlainBufferAdapter<B, M> {
    /// マッチャーを差し替えて作成
    pub fn with_matcher(id: DocumentId, host: B, matcher: M) -> Self {
        Self {
            id,
            host,
            matcher,
            saved_highlight_matches: None,
        }
    }

    /// バッファ全体のテキスト
    pub fn full_text(&self) -> String {
        self.host.text()
    }

    pub fn host(&self) -> &B {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut B {
        &mut self.host
    }

    pub fn into_host(self) -> B {
        self.host
    }
}

impl<B: PlainBufferHost, M: StringMatcher> DocumentAdapter for PlainBufferAdapter<B, M> {
    type Anchor = Position;
    type Handle = B::Mark;

    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Plain
    }

    fn locate(&mut self, query: &str, options: &SearchOptions) -> Result<Vec<MatchSpan<Position>>> {
        let text = self.full_text();
        self.matcher.find_all(&text, query, options)
    }

    fn highlight(&mut self, span: &MatchSpan<Position>, class: HighlightClass) -> Result<B::Mark> {
        self.host.mark_text(span.start, span.end, class)
    }

    fn clear_highlight(&mut self, handle: B::Mark) {
        self.host.clear_mark(handle);
    }

    fn marker_span(&self, handle: &B::Mark) -> Option<MatchSpan<Position>> {
        self.host
            .find_mark(handle)
            .map(|(from, to)| MatchSpan::new(from, to))
    }

    fn caret(&self) -> Position {
        self.host.cursor()
    }

    fn scroll_into_view(&mut self, span: &MatchSpan<Position>) {
        self.host.scroll_into_view(span.start);
    }

    fn set_selection(&mut self, span: &MatchSpan<Position>) {
        self.host.set_selection(span.start, span.end);
    }

    fn focus(&mut self) {
        self.host.focus();
    }

    fn begin_batch(&mut self) {
        self.host.begin_operation();
    }

    fn end_batch(&mut self) {
        self.host.end_operation();
    }

    fn selected_text(&self) -> Option<String> {
        let text = self.host.selection_text();
        (!text.is_empty()).then_some(text)
    }

    fn on_session_open(&mut self) {
        // 単語強調は検索ハイライトを隠してしまうため、セッション中は無効化する
        if self.saved_highlight_matches.is_none() {
            self.saved_highlight_matches = Some(self.host.highlight_selection_matches());
        }
        self.host.set_highlight_selection_matches(false);
    }

    fn on_session_close(&mut self) {
        if let Some(enabled) = self.saved_highlight_matches.take() {
            self.host.set_highlight_selection_matches(enabled);
        }
    }
}

/// `MemoryBuffer` のマーカーID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(usize);

#[derive(Debug, Clone)]
struct MarkRecord {
    from: Position,
    to: Position,
    class: HighlightClass,
}

/// メモリ上のプレーンテキストバッファ
///
/// CLI とテストで使う参照実装
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    lines: Vec<String>,
    cursor: Position,
    selection: Option<(Position, Position)>,
    marks: Vec<Option<MarkRecord>>,
    operation_depth: usize,
    reflows: usize,
    last_scroll: Option<Position>,
    focused: bool,
    highlight_selection_matches: bool,
    rejected_class: Option<HighlightClass>,
}

impl MemoryBuffer {
    pub fn from_str(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
            cursor: Position::default(),
            selection: None,
            marks: Vec::new(),
            operation_depth: 0,
            reflows: 0,
            last_scroll: None,
            focused: false,
            highlight_selection_matches: true,
            rejected_class: None,
        }
    }

    /// 指定クラスのハイライト作成を失敗させる（描画エラーを起こすホストを模擬する）
    pub fn reject_highlights(&mut self, class: Option<HighlightClass>) {
        self.rejected_class = class;
    }

    /// カーソルを移動（選択は解除）
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
        self.selection = None;
    }

    /// 現在の選択範囲
    pub fn selection(&self) -> Option<(Position, Position)> {
        self.selection
    }

    /// 有効なマーカーを文書順で返す
    pub fn live_marks(&self) -> Vec<(Position, Position, HighlightClass)> {
        let mut marks: Vec<_> = self
            .marks
            .iter()
            .flatten()
            .map(|m| (m.from, m.to, m.class))
            .collect();
        marks.sort_by_key(|(from, _, _)| *from);
        marks
    }

    /// 指定クラスのマーカー数
    pub fn count_marks(&self, class: HighlightClass) -> usize {
        self.marks.iter().flatten().filter(|m| m.class == class).count()
    }

    pub fn operation_depth(&self) -> usize {
        self.operation_depth
    }

    /// 操作終了による再描画回数
    pub fn reflow_count(&self) -> usize {
        self.reflows
    }

    pub fn last_scroll(&self) -> Option<Position> {
        self.last_scroll
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// 行頭にテキストを挿入し、同じ行のマーカーをずらす
    pub fn insert_at_line_start(&mut self, line: usize, text: &str) {
        let Some(target) = self.lines.get_mut(line) else {
            return;
        };
        target.insert_str(0, text);
        let shift = text.chars().count();
        for mark in self.marks.iter_mut().flatten() {
            if mark.from.line == line {
                mark.from.column += shift;
            }
            if mark.to.line == line {
                mark.to.column += shift;
            }
        }
    }

    fn line_len(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.chars().count())
    }

    fn contains(&self, pos: Position) -> bool {
        self.line_len(pos.line)
            .is_some_and(|len| pos.column <= len)
    }

    fn slice(&self, from: Position, to: Position) -> String {
        let mut out = String::new();
        for line in from.line..=to.line {
            let Some(text) = self.lines.get(line) else {
                break;
            };
            let start = if line == from.line { from.column } else { 0 };
            let end = if line == to.line {
                to.column
            } else {
                text.chars().count()
            };
            out.extend(text.chars().skip(start).take(end.saturating_sub(start)));
            if line != to.line {
                out.push('\n');
            }
        }
        out
    }
}

impl PlainBufferHost for MemoryBuffer {
    type Mark = MarkId;

    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn mark_text(&mut self, from: Position, to: Position, class: HighlightClass) -> Result<MarkId> {
        if self.rejected_class == Some(class) {
            return Err(FindError::Highlight {
                message: format!("{} highlights are rejected", class.css_class()),
            });
        }
        if !self.contains(from) || !self.contains(to) || to < from {
            return Err(FindError::Highlight {
                message: format!("range {}..{} is outside the buffer", from, to),
            });
        }
        self.marks.push(Some(MarkRecord { from, to, class }));
        Ok(MarkId(self.marks.len() - 1))
    }

    fn clear_mark(&mut self, mark: MarkId) {
        if let Some(slot) = self.marks.get_mut(mark.0) {
            *slot = None;
        }
    }

    fn find_mark(&self, mark: &MarkId) -> Option<(Position, Position)> {
        self.marks
            .get(mark.0)
            .and_then(|slot| slot.as_ref())
            .map(|m| (m.from, m.to))
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_selection(&mut self, from: Position, to: Position) {
        self.cursor = from;
        self.selection = Some((from, to));
    }

    fn selection_text(&self) -> String {
        match self.selection {
            Some((from, to)) => self.slice(from, to),
            None => String::new(),
        }
    }

    fn scroll_into_view(&mut self, pos: Position) {
        self.last_scroll = Some(pos);
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn highlight_selection_matches(&self) -> bool {
        self.highlight_selection_matches
    }

    fn set_highlight_selection_matches(&mut self, enabled: bool) {
        self.highlight_selection_matches = enabled;
    }

    fn begin_operation(&mut self) {
        self.operation_depth += 1;
    }

    fn end_operation(&mut self) {
        self.operation_depth = self.operation_depth.saturating_sub(1);
        if self.operation_depth == 0 {
            self.reflows += 1;
        }
    }
}
