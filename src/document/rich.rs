//! リッチドキュメント用アダプタ
//!
//! 文書モデルの内部表現は不透明なため、照合はホストのネイティブ検索に委譲し、
//! 結果を共通の `MatchSpan` へ変換する

use std::fmt;

use super::{DocumentAdapter, DocumentId, DocumentKind, StepOutcome};
use crate::error::{FindError, Result};
use crate::search::{
    HighlightClass, LiteralMatcher, MatchSpan, SearchDirection, SearchOptions, StringMatcher,
};

/// ネイティブ検索の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSearch<A> {
    /// 文書順のマッチ
    pub matches: Vec<MatchSpan<A>>,
    /// ホストが現在とみなしているマッチ
    pub current_guess: Option<usize>,
}

/// リッチテキストエディタがホスト側で提供する操作
pub trait RichDocumentHost {
    /// 文書モデル上の位置
    type Anchor: Copy + Ord + fmt::Debug;
    /// 文書モデルのマーカー
    type Marker: fmt::Debug;

    /// ネイティブの検索コマンド
    fn find(&mut self, query: &str, options: &SearchOptions) -> Result<NativeSearch<Self::Anchor>>;

    /// ネイティブ検索の状態を破棄
    fn clear_find_state(&mut self);

    /// ネイティブ検索の現在位置を合わせる
    fn sync_find_current(&mut self, index: usize);

    /// ネイティブの次/前検索コマンド。選択したマッチ番号を返す
    fn find_step(&mut self, direction: SearchDirection) -> Option<usize>;

    /// 範囲にマーカーを追加
    fn add_marker(&mut self, span: &MatchSpan<Self::Anchor>, class: HighlightClass) -> Result<Self::Marker>;

    /// マーカーを削除
    fn remove_marker(&mut self, marker: Self::Marker);

    /// マーカーの現在範囲
    fn marker_range(&self, marker: &Self::Marker) -> Option<MatchSpan<Self::Anchor>>;

    /// 選択範囲の先頭
    fn selection_start(&self) -> Self::Anchor;

    /// 選択範囲の最初のテキスト要素
    fn first_selected_text(&self) -> Option<String>;

    /// 選択範囲を設定
    fn set_selection(&mut self, span: &MatchSpan<Self::Anchor>);

    /// 範囲を画面内へスクロール
    fn scroll_to(&mut self, span: &MatchSpan<Self::Anchor>);

    /// フォーカスを得る
    fn focus(&mut self);

    /// モデル変更のまとまりを開始
    fn begin_change(&mut self);

    /// モデル変更のまとまりを終了
    fn end_change(&mut self);
}

/// リッチドキュメントのアダプタ
#[derive(Debug)]
pub struct RichDocumentAdapter<R: RichDocumentHost> {
    id: DocumentId,
    host: R,
}

impl<R: RichDocumentHost> RichDocumentAdapter<R> {
    pub fn new(id: DocumentId, host: R) -> Self {
        Self { id, host }
    }

    /// ホストのネイティブ検索を実行
    pub fn native_search(
        &mut self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<NativeSearch<R::Anchor>> {
        self.host.clear_find_state();
        self.host.find(query, options)
    }

    pub fn host(&self) -> &R {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut R {
        &mut self.host
    }

    pub fn into_host(self) -> R {
        self.host
    }
}

impl<R: RichDocumentHost> DocumentAdapter for RichDocumentAdapter<R> {
    type Anchor = R::Anchor;
    type Handle = R::Marker;

    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Rich
    }

    fn locate(&mut self, query: &str, options: &SearchOptions) -> Result<Vec<MatchSpan<R::Anchor>>> {
        let found = self.native_search(query, options)?;
        log::trace!(
            target: "notefind",
            "native find: {} results, host current {:?}",
            found.matches.len(),
            found.current_guess
        );
        Ok(found.matches)
    }

    fn highlight(&mut self, span: &MatchSpan<R::Anchor>, class: HighlightClass) -> Result<R::Marker> {
        self.host.add_marker(span, class)
    }

    fn clear_highlight(&mut self, handle: R::Marker) {
        self.host.remove_marker(handle);
    }

    fn marker_span(&self, handle: &R::Marker) -> Option<MatchSpan<R::Anchor>> {
        self.host.marker_range(handle)
    }

    fn caret(&self) -> R::Anchor {
        self.host.selection_start()
    }

    fn scroll_into_view(&mut self, span: &MatchSpan<R::Anchor>) {
        self.host.scroll_to(span);
    }

    fn set_selection(&mut self, span: &MatchSpan<R::Anchor>) {
        self.host.set_selection(span);
    }

    fn focus(&mut self) {
        self.host.focus();
    }

    fn begin_batch(&mut self) {
        self.host.begin_change();
    }

    fn end_batch(&mut self) {
        self.host.end_change();
    }

    fn selected_text(&self) -> Option<String> {
        self.host.first_selected_text().filter(|text| !text.is_empty())
    }

    fn on_session_close(&mut self) {
        self.host.clear_find_state();
    }

    fn native_step(&mut self, from: usize, direction: SearchDirection) -> StepOutcome {
        self.host.sync_find_current(from);
        StepOutcome::Stepped {
            selected: self.host.find_step(direction),
        }
    }
}

/// `MemoryRichDocument` の位置（段落番号と段落内の文字オフセット）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RichAnchor {
    pub block: usize,
    pub offset: usize,
}

impl RichAnchor {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// `MemoryRichDocument` のマーカーID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RichMarkerId(usize);

/// メモリ上のリッチドキュメント（段落の列）
///
/// CLI とテストで使う参照実装。ネイティブ検索は段落単位で行う
#[derive(Debug, Clone)]
pub struct MemoryRichDocument {
    blocks: Vec<String>,
    selection: MatchSpan<RichAnchor>,
    markers: Vec<Option<(MatchSpan<RichAnchor>, HighlightClass)>>,
    find_results: Vec<MatchSpan<RichAnchor>>,
    find_current: Option<usize>,
    ignores_sync: bool,
    change_depth: usize,
    committed_changes: usize,
    last_scroll: Option<MatchSpan<RichAnchor>>,
    focused: bool,
}

impl MemoryRichDocument {
    pub fn new<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origin = RichAnchor::default();
        Self {
            blocks: blocks.into_iter().map(Into::into).collect(),
            selection: MatchSpan::new(origin, origin),
            markers: Vec::new(),
            find_results: Vec::new(),
            find_current: None,
            ignores_sync: false,
            change_depth: 0,
            committed_changes: 0,
            last_scroll: None,
            focused: false,
        }
    }

    /// キャレットを移動（選択は空になる）
    pub fn set_caret(&mut self, anchor: RichAnchor) {
        self.selection = MatchSpan::new(anchor, anchor);
    }

    pub fn selection(&self) -> MatchSpan<RichAnchor> {
        self.selection
    }

    /// 有効なマーカーを文書順で返す
    pub fn live_markers(&self) -> Vec<(MatchSpan<RichAnchor>, HighlightClass)> {
        let mut markers: Vec<_> = self.markers.iter().flatten().copied().collect();
        markers.sort_by_key(|(span, _)| span.start);
        markers
    }

    /// ネイティブ検索の現在位置
    pub fn find_current(&self) -> Option<usize> {
        self.find_current
    }

    /// ネイティブ検索の結果数
    pub fn find_result_count(&self) -> usize {
        self.find_results.len()
    }

    /// 位置合わせを無視するホストを模擬する
    pub fn set_ignores_sync(&mut self, ignores: bool) {
        self.ignores_sync = ignores;
    }

    pub fn committed_changes(&self) -> usize {
        self.committed_changes
    }

    pub fn change_depth(&self) -> usize {
        self.change_depth
    }

    pub fn last_scroll(&self) -> Option<MatchSpan<RichAnchor>> {
        self.last_scroll
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn contains(&self, anchor: RichAnchor) -> bool {
        self.blocks
            .get(anchor.block)
            .is_some_and(|text| anchor.offset <= text.chars().count())
    }
}

impl RichDocumentHost for MemoryRichDocument {
    type Anchor = RichAnchor;
    type Marker = RichMarkerId;

    fn find(&mut self, query: &str, options: &SearchOptions) -> Result<NativeSearch<RichAnchor>> {
        let matcher = LiteralMatcher::new();
        let mut matches = Vec::new();
        for (block, text) in self.blocks.iter().enumerate() {
            for span in matcher.find_all(text, query, options)? {
                matches.push(MatchSpan::new(
                    RichAnchor::new(block, span.start.column),
                    RichAnchor::new(block, span.end.column),
                ));
            }
        }
        self.find_results = matches.clone();
        self.find_current = None;
        Ok(NativeSearch {
            current_guess: (!matches.is_empty()).then_some(0),
            matches,
        })
    }

    fn clear_find_state(&mut self) {
        self.find_results.clear();
        self.find_current = None;
    }

    fn sync_find_current(&mut self, index: usize) {
        if !self.ignores_sync && index < self.find_results.len() {
            self.find_current = Some(index);
        }
    }

    fn find_step(&mut self, direction: SearchDirection) -> Option<usize> {
        let total = self.find_results.len();
        if total == 0 {
            return None;
        }
        let next = match (self.find_current, direction) {
            (None, SearchDirection::Forward) => 0,
            (None, SearchDirection::Backward) => total - 1,
            (Some(current), SearchDirection::Forward) => (current + 1) % total,
            (Some(current), SearchDirection::Backward) => (current + total - 1) % total,
        };
        self.find_current = Some(next);
        self.selection = self.find_results[next];
        Some(next)
    }

    fn add_marker(&mut self, span: &MatchSpan<RichAnchor>, class: HighlightClass) -> Result<RichMarkerId> {
        if !self.contains(span.start) || !self.contains(span.end) {
            return Err(FindError::Highlight {
                message: format!("range {:?} is outside the document", span),
            });
        }
        self.markers.push(Some((*span, class)));
        Ok(RichMarkerId(self.markers.len() - 1))
    }

    fn remove_marker(&mut self, marker: RichMarkerId) {
        if let Some(slot) = self.markers.get_mut(marker.0) {
            *slot = None;
        }
    }

    fn marker_range(&self, marker: &RichMarkerId) -> Option<MatchSpan<RichAnchor>> {
        self.markers
            .get(marker.0)
            .and_then(|slot| slot.as_ref())
            .map(|(span, _)| *span)
    }

    fn selection_start(&self) -> RichAnchor {
        self.selection.start
    }

    fn first_selected_text(&self) -> Option<String> {
        let MatchSpan { start, end } = self.selection;
        if start == end {
            return None;
        }
        // 最初のテキスト要素（先頭段落内の部分）だけを返す
        let text = self.blocks.get(start.block)?;
        let stop = if end.block == start.block {
            end.offset
        } else {
            text.chars().count()
        };
        Some(
            text.chars()
                .skip(start.offset)
                .take(stop.saturating_sub(start.offset))
                .collect(),
        )
    }

    fn set_selection(&mut self, span: &MatchSpan<RichAnchor>) {
        self.selection = *span;
    }

    fn scroll_to(&mut self, span: &MatchSpan<RichAnchor>) {
        self.last_scroll = Some(*span);
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn begin_change(&mut self) {
        self.change_depth += 1;
    }

    fn end_change(&mut self) {
        self.change_depth = self.change_depth.saturating_sub(1);
        if self.change_depth == 0 {
            self.committed_changes += 1;
        }
    }
}
