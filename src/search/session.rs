//! 検索セッション
//!
//! 検索ボックスを開いてから閉じるまでの状態遷移を管理する。
//! ドキュメントは所有せず、各操作の引数として借用する

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::config::{FindConfig, SearchMode};
use crate::document::{run_batched, DocumentAdapter, DocumentId, StepOutcome};
use crate::error::{FindError, LogOnError, Result};
use crate::host::{open_gate, ActiveDocument, AdapterRequest};

use super::debounce::Debouncer;
use super::marker::MarkerSet;
use super::state::SearchState;
use super::types::{
    HighlightClass, MatchSpan, SearchCounters, SearchDirection, SearchStatus, SearchUiState,
};

/// `open` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    /// セッションが開いたか（未対応の種別なら `false`）
    pub opened: bool,
    /// 同じドキュメントで既に開いていた（ホストは入力欄を全選択する）
    pub already_open: bool,
    /// 選択テキストから入力した検索語
    pub prefilled: Option<String>,
    /// 表示用カウンタ
    pub counters: SearchCounters,
}

/// `current` から `direction` へ1つ進めた番号（両方向に折り返す）
///
/// `total` が 0 なら `current` をそのまま返す
pub fn wrap_index(current: usize, direction: SearchDirection, total: usize) -> usize {
    if total == 0 {
        return current;
    }
    let total = total as isize;
    (current as isize + direction.delta() + total).rem_euclid(total) as usize
}

/// インクリメンタル検索のセッション
#[derive(Debug)]
pub struct SearchSession<D: DocumentAdapter> {
    config: FindConfig,
    mode: SearchMode,
    state: SearchState<D>,
    debouncer: Debouncer,
    generation: u64,
}

impl<D: DocumentAdapter> SearchSession<D> {
    /// 設定を読み込んでセッションを作成
    pub fn new(config: FindConfig) -> Self {
        let mode = config.mode();
        let delay = match mode {
            SearchMode::Debounced(delay) => delay,
            SearchMode::WaitForConfirm => Duration::ZERO,
        };
        Self {
            config,
            mode,
            state: SearchState::new(),
            debouncer: Debouncer::new(delay),
            generation: 0,
        }
    }

    pub fn config(&self) -> &FindConfig {
        &self.config
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// アタッチ中のドキュメント
    pub fn document(&self) -> Option<DocumentId> {
        self.state.document
    }

    /// セッション世代（開閉のたびに進む）
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 入力欄の現在値
    pub fn input(&self) -> &str {
        &self.state.input
    }

    /// 最後に検索したクエリ
    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn match_count(&self) -> usize {
        self.state.markers.len()
    }

    pub fn markers(&self) -> &MarkerSet<D> {
        &self.state.markers
    }

    /// マッチ範囲（作成時）を文書順で返す
    pub fn match_spans(&self) -> Vec<MatchSpan<D::Anchor>> {
        self.state.markers.spans()
    }

    pub fn counters(&self) -> SearchCounters {
        self.state.counters()
    }

    /// 遅延中の検索の期限
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// 検索ボックスの表示状態
    pub fn ui_state(&self) -> Option<SearchUiState> {
        if !self.state.is_open() {
            return None;
        }
        let status = if self.state.query.is_empty() {
            SearchStatus::Idle
        } else if self.state.markers.is_empty() {
            SearchStatus::NotFound
        } else if self.state.wrapped {
            SearchStatus::Wrapped
        } else {
            SearchStatus::Active
        };
        Some(SearchUiState {
            input: self.state.input.clone(),
            query: self.state.query.clone(),
            status,
            counters: self.counters(),
            pending: self.debouncer.is_pending(),
        })
    }

    /// アダプタ解決を要求する
    ///
    /// 開けないドキュメントはここで弾く
    pub fn request_adapter<H: ActiveDocument + ?Sized>(&self, active: &H) -> Result<AdapterRequest> {
        let kind = open_gate(active)?;
        Ok(AdapterRequest::new(active.document_id(), kind, self.generation))
    }

    /// 解決済みアダプタを受け取る
    ///
    /// 要求後にアクティブなノートかセッション世代が変わっていれば破棄する
    pub fn accept_adapter(&self, request: &AdapterRequest, active: DocumentId, adapter: D) -> Option<D> {
        request
            .check(active, adapter.document_id(), self.generation)
            .log_on_error("adapter resolution")?;
        Some(adapter)
    }

    /// 検索ボックスを開く
    pub fn open(&mut self, doc: &mut D) -> OpenOutcome {
        let id = doc.document_id();
        let kind = doc.kind();
        if !kind.is_searchable() {
            FindError::invalid_kind(kind).log("open");
            return OpenOutcome {
                opened: false,
                already_open: false,
                prefilled: None,
                counters: self.counters(),
            };
        }

        match self.state.document {
            Some(attached) if attached == id => {
                debug!(target: "notefind", "find box already open on {}", id);
                return OpenOutcome {
                    opened: true,
                    already_open: true,
                    prefilled: None,
                    counters: self.counters(),
                };
            }
            Some(attached) => {
                // 前のドキュメントのハイライトと設定を戻すため、先に close させる
                warn!(
                    target: "notefind",
                    "{} still attached, close it before opening {}",
                    attached,
                    id
                );
                return OpenOutcome {
                    opened: false,
                    already_open: false,
                    prefilled: None,
                    counters: self.counters(),
                };
            }
            None => {}
        }

        self.generation += 1;
        self.state.reset();
        self.state.document = Some(id);
        doc.on_session_open();
        debug!(target: "notefind", "opened find on {} ({})", id, doc.kind());

        let prefilled = doc.selected_text();
        if let Some(text) = &prefilled {
            self.state.input = text.clone();
            self.run_search(doc, text);
        }
        OpenOutcome {
            opened: true,
            already_open: false,
            prefilled,
            counters: self.counters(),
        }
    }

    /// 入力欄が変化した
    ///
    /// 遅延モードではタイマーを張り直す。確定待ちモードでは入力値を覚えるだけ
    pub fn on_query_changed(&mut self, raw: &str, now: Instant) {
        if !self.state.is_open() {
            FindError::SessionClosed.log("query change");
            return;
        }
        self.state.input = raw.to_string();
        if let SearchMode::Debounced(_) = self.mode {
            let handle = self.debouncer.arm(raw, now, self.generation);
            trace!(target: "notefind", "armed {:?} for {:?}", handle, raw);
        }
    }

    /// 期限を過ぎた遅延検索を実行する。実行したら `true`
    pub fn poll(&mut self, doc: &mut D, now: Instant) -> bool {
        let Some(fired) = self.debouncer.poll(now) else {
            return false;
        };
        if fired.generation != self.generation {
            FindError::SessionClosed.log("debounced search");
            return false;
        }
        if self.check_document(doc).log_on_error("debounced search").is_none() {
            return false;
        }
        self.run_search(doc, &fired.query);
        true
    }

    /// 検索してハイライトを作り直す
    pub fn search(&mut self, doc: &mut D, raw: &str) -> SearchCounters {
        if self.check_document(doc).log_on_error("search").is_none() {
            return self.counters();
        }
        self.state.input = raw.to_string();
        self.run_search(doc, raw);
        self.counters()
    }

    /// 次/前のマッチへ移動（Enter / F3）
    pub fn confirm(&mut self, doc: &mut D, direction: SearchDirection) -> SearchCounters {
        if self.check_document(doc).log_on_error("confirm").is_none() {
            return self.counters();
        }

        let pending = match self.mode {
            SearchMode::WaitForConfirm => {
                (self.state.input != self.state.query).then(|| self.state.input.clone())
            }
            SearchMode::Debounced(_) => self
                .debouncer
                .flush()
                .filter(|fired| fired.generation == self.generation)
                .map(|fired| fired.query),
        };
        if let Some(query) = pending {
            self.run_search(doc, &query);
        }

        self.step(doc, direction);
        self.counters()
    }

    /// 入力フォーカスをドキュメントへ戻す（ハイライトは残す）
    pub fn escape(&mut self, doc: &mut D) {
        if self.check_document(doc).log_on_error("escape").is_some() {
            doc.focus();
        }
    }

    /// 検索ボックスを閉じる
    ///
    /// 現在のマッチを選択してからハイライトをすべて解除する
    pub fn close(&mut self, doc: &mut D) {
        if !self.state.is_open() {
            return;
        }
        if self.check_document(doc).log_on_error("close").is_none() {
            return;
        }

        if self.debouncer.cancel() {
            debug!(target: "notefind", "pending search cancelled by close");
        }
        if let Some(index) = self.state.current_index {
            if let Some(span) = self.state.markers.current_span(doc, index) {
                doc.set_selection(&span);
                doc.scroll_into_view(&span);
            }
        }
        self.state.markers.clear_all(doc);
        doc.on_session_close();
        self.state.reset();
        self.generation += 1;
        debug!(target: "notefind", "closed find");
    }

    /// ドキュメントに触れずにセッションを破棄する
    ///
    /// ドキュメントが既に破棄された場合に使う
    pub fn discard(&mut self) {
        self.debouncer.cancel();
        self.state.reset();
        self.generation += 1;
    }

    fn check_document(&self, doc: &D) -> Result<()> {
        match self.state.document {
            None => Err(FindError::SessionClosed),
            Some(attached) if attached != doc.document_id() => Err(FindError::DocumentMismatch {
                attached,
                given: doc.document_id(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn run_search(&mut self, doc: &mut D, raw: &str) {
        self.state.markers.clear_all(doc);
        self.state.current_index = None;
        self.state.wrapped = false;
        self.state.query = raw.to_string();

        if raw.is_empty() {
            trace!(target: "notefind", "empty query");
            return;
        }

        let Some(spans) = doc
            .locate(raw, &self.config.options)
            .log_on_error("search")
        else {
            return;
        };
        if spans.is_empty() {
            debug!(target: "notefind", "no matches for {:?}", raw);
            return;
        }

        // キャレット以降の最初のマッチから再開。無ければ先頭へ折り返す
        let caret = doc.caret();
        let (mut index, wrapped) = match spans.iter().position(|span| span.start >= caret) {
            Some(index) => (index, false),
            None => (0, true),
        };
        self.state.wrapped = wrapped;

        self.state
            .markers
            .build(doc, &spans, index)
            .log_on_error("search");
        if self.state.markers.is_empty() {
            return;
        }
        if index >= self.state.markers.len() {
            index = self.state.markers.len() - 1;
            self.state
                .markers
                .retag(doc, index, HighlightClass::Selected)
                .log_on_error("search");
        }

        self.state.current_index = Some(index);
        if let Some(span) = self.state.markers.current_span(doc, index) {
            doc.scroll_into_view(&span);
        }
        debug!(
            target: "notefind",
            "{} matches for {:?}, current {}",
            self.state.markers.len(),
            raw,
            index + 1
        );
    }

    fn step(&mut self, doc: &mut D, direction: SearchDirection) {
        let total = self.state.markers.len();
        if total == 0 {
            return;
        }
        let current = self.state.current_index.unwrap_or(0);
        let expected = wrap_index(current, direction, total);

        let next = match doc.native_step(current, direction) {
            StepOutcome::Unsupported | StepOutcome::Stepped { selected: None } => expected,
            StepOutcome::Stepped {
                selected: Some(selected),
            } if selected < total => {
                if selected != expected {
                    debug!(
                        target: "notefind",
                        "native step selected {} instead of {}, following the document",
                        selected,
                        expected
                    );
                }
                selected
            }
            StepOutcome::Stepped {
                selected: Some(selected),
            } => {
                warn!(
                    target: "notefind",
                    "native step selected {} of {} matches, ignoring",
                    selected,
                    total
                );
                expected
            }
        };

        if next != current {
            let markers = &mut self.state.markers;
            let moved = run_batched(doc, |doc| {
                if markers
                    .retag(doc, next, HighlightClass::Selected)
                    .log_on_error("confirm")
                    .is_none()
                {
                    return false;
                }
                // 選択中のマーカーは常に1つ。戻せなければハイライトごと外す
                if markers
                    .retag(doc, current, HighlightClass::Normal)
                    .log_on_error("confirm")
                    .is_none()
                {
                    markers.release(doc, current);
                }
                true
            });
            if !moved {
                return;
            }
        }

        self.state.wrapped = total > 1
            && match direction {
                SearchDirection::Forward => next <= current,
                SearchDirection::Backward => next >= current,
            };
        self.state.current_index = Some(next);
        if let Some(span) = self.state.markers.current_span(doc, next) {
            doc.scroll_into_view(&span);
        }
    }
}
