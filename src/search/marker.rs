//! マッチのハイライト管理
//!
//! マーカーは作成後に変更しない。クラスを変えるときは同じ範囲で解除→再作成する

use crate::document::{run_batched, DocumentAdapter};
use crate::error::Result;

use super::types::{HighlightClass, MatchSpan};

/// 1件のマッチに対応するハイライト
#[derive(Debug)]
pub struct Marker<H, A> {
    handle: Option<H>,
    span: MatchSpan<A>,
    class: HighlightClass,
}

impl<H, A: Copy> Marker<H, A> {
    /// 作成時の範囲
    pub fn span(&self) -> MatchSpan<A> {
        self.span
    }

    pub fn class(&self) -> HighlightClass {
        self.class
    }

    /// ドキュメント上にハイライトが存在するか
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

/// 文書順に並んだマーカーの集合
#[derive(Debug)]
pub struct MarkerSet<D: DocumentAdapter> {
    markers: Vec<Marker<D::Handle, D::Anchor>>,
}

impl<D: DocumentAdapter> Default for MarkerSet<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DocumentAdapter> MarkerSet<D> {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker<D::Handle, D::Anchor>> {
        self.markers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker<D::Handle, D::Anchor>> {
        self.markers.iter()
    }

    /// 作成時の範囲を文書順で返す
    pub fn spans(&self) -> Vec<MatchSpan<D::Anchor>> {
        self.markers.iter().map(|m| m.span).collect()
    }

    /// `Selected` のマーカー数
    pub fn selected_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.class == HighlightClass::Selected)
            .count()
    }

    /// 全マッチのハイライトを1回のバッチで作成する
    ///
    /// 途中で失敗した場合、作成済みのマーカーはそのまま残る
    pub fn build(&mut self, doc: &mut D, spans: &[MatchSpan<D::Anchor>], selected: usize) -> Result<()> {
        let markers = &mut self.markers;
        run_batched(doc, |doc| {
            for (idx, span) in spans.iter().enumerate() {
                let class = if idx == selected {
                    HighlightClass::Selected
                } else {
                    HighlightClass::Normal
                };
                let handle = doc.highlight(span, class)?;
                markers.push(Marker {
                    handle: Some(handle),
                    span: *span,
                    class,
                });
            }
            Ok(())
        })
    }

    /// すべてのハイライトを解除して空にする
    pub fn clear_all(&mut self, doc: &mut D) {
        if self.markers.is_empty() {
            return;
        }
        let markers = std::mem::take(&mut self.markers);
        run_batched(doc, |doc| {
            for marker in markers {
                if let Some(handle) = marker.handle {
                    doc.clear_highlight(handle);
                }
            }
        });
    }

    /// ドキュメントに触れずに破棄する（ドキュメントが既に無い場合）
    pub fn forget(&mut self) {
        self.markers.clear();
    }

    /// マーカーの現在範囲（ドキュメントから取得できなければ作成時の範囲）
    pub fn current_span(&self, doc: &D, index: usize) -> Option<MatchSpan<D::Anchor>> {
        let marker = self.markers.get(index)?;
        let live = marker
            .handle
            .as_ref()
            .and_then(|handle| doc.marker_span(handle));
        Some(live.unwrap_or(marker.span))
    }

    /// `index` のマーカーを別クラスで作り直す
    ///
    /// 新しいハイライトを作成できた場合だけ古いものを解除する。失敗時は元のまま
    pub fn retag(&mut self, doc: &mut D, index: usize, class: HighlightClass) -> Result<()> {
        let Some(span) = self.current_span(doc, index) else {
            return Ok(());
        };
        let handle = doc.highlight(&span, class)?;
        let marker = &mut self.markers[index];
        if let Some(old) = marker.handle.replace(handle) {
            doc.clear_highlight(old);
        }
        marker.span = span;
        marker.class = class;
        Ok(())
    }

    /// `index` のハイライトだけを解除し、`Normal` として残す
    ///
    /// 範囲は保持するので、次の `retag` で作り直せる
    pub fn release(&mut self, doc: &mut D, index: usize) {
        let Some(span) = self.current_span(doc, index) else {
            return;
        };
        let marker = &mut self.markers[index];
        if let Some(handle) = marker.handle.take() {
            doc.clear_highlight(handle);
        }
        marker.span = span;
        marker.class = HighlightClass::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentId, MemoryBuffer, PlainBufferAdapter};
    use crate::search::{Position, SearchOptions};

    type Doc = PlainBufferAdapter<MemoryBuffer>;

    fn setup(text: &str, query: &str) -> (Doc, Vec<MatchSpan<Position>>) {
        let mut doc = PlainBufferAdapter::new(DocumentId::new(1), MemoryBuffer::from_str(text));
        let spans = doc.locate(query, &SearchOptions::default()).unwrap();
        (doc, spans)
    }

    #[test]
    fn build_selects_one_marker_in_one_batch() {
        let (mut doc, spans) = setup("ab ab ab", "ab");
        let mut set = MarkerSet::<Doc>::new();
        set.build(&mut doc, &spans, 1).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.selected_count(), 1);
        assert_eq!(set.get(1).unwrap().class(), HighlightClass::Selected);
        assert_eq!(doc.host().reflow_count(), 1);
        assert_eq!(doc.host().count_marks(HighlightClass::Normal), 2);
    }

    #[test]
    fn clear_all_is_noop_when_empty() {
        let (mut doc, _) = setup("abc", "zz");
        let mut set = MarkerSet::<Doc>::new();
        set.clear_all(&mut doc);
        assert_eq!(doc.host().reflow_count(), 0);
    }

    #[test]
    fn clear_all_releases_every_highlight() {
        let (mut doc, spans) = setup("ab ab", "ab");
        let mut set = MarkerSet::<Doc>::new();
        set.build(&mut doc, &spans, 0).unwrap();
        set.clear_all(&mut doc);

        assert!(set.is_empty());
        assert!(doc.host().live_marks().is_empty());
        assert_eq!(doc.host().operation_depth(), 0);
    }

    #[test]
    fn retag_recreates_at_live_range() {
        let (mut doc, spans) = setup("ab ab", "ab");
        let mut set = MarkerSet::<Doc>::new();
        set.build(&mut doc, &spans, 0).unwrap();

        doc.host_mut().insert_at_line_start(0, "xx");
        set.retag(&mut doc, 1, HighlightClass::Selected).unwrap();

        let marker = set.get(1).unwrap();
        assert_eq!(marker.span().start, Position::new(0, 5));
        assert_eq!(marker.class(), HighlightClass::Selected);
        assert_eq!(doc.host().live_marks().len(), 2);
    }

    #[test]
    fn failed_retag_keeps_previous_highlight() {
        let (mut doc, spans) = setup("ab ab", "ab");
        let mut set = MarkerSet::<Doc>::new();
        set.build(&mut doc, &spans, 0).unwrap();

        doc.host_mut().reject_highlights(Some(HighlightClass::Normal));
        assert!(set.retag(&mut doc, 0, HighlightClass::Normal).is_err());

        let marker = set.get(0).unwrap();
        assert!(marker.is_live());
        assert_eq!(marker.class(), HighlightClass::Selected);
        assert_eq!(doc.host().count_marks(HighlightClass::Selected), 1);
        assert_eq!(doc.host().live_marks().len(), 2);
    }

    #[test]
    fn release_drops_highlight_but_keeps_span() {
        let (mut doc, spans) = setup("ab ab", "ab");
        let mut set = MarkerSet::<Doc>::new();
        set.build(&mut doc, &spans, 0).unwrap();

        set.release(&mut doc, 0);
        assert!(!set.get(0).unwrap().is_live());
        assert_eq!(set.selected_count(), 0);
        assert_eq!(doc.host().live_marks().len(), 1);

        set.retag(&mut doc, 0, HighlightClass::Selected).unwrap();
        assert!(set.get(0).unwrap().is_live());
        assert_eq!(doc.host().count_marks(HighlightClass::Selected), 1);
    }

    #[test]
    fn partial_build_keeps_created_markers() {
        let (mut doc, mut spans) = setup("ab ab", "ab");
        spans.push(MatchSpan::new(Position::new(4, 0), Position::new(4, 2)));
        let mut set = MarkerSet::<Doc>::new();

        assert!(set.build(&mut doc, &spans, 0).is_err());
        assert_eq!(set.len(), 2);
        assert_eq!(doc.host().operation_depth(), 0);
    }
}
