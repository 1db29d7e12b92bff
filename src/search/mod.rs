//! 検索モジュール
//!
//! インクリメンタル検索のセッション管理、マッチ計算、ハイライト管理を提供

mod debounce;
mod escape;
mod marker;
mod matcher;
mod session;
mod state;
pub mod types;

pub use debounce::{Debouncer, FiredSearch, TimerHandle};
pub use escape::escape;
pub use marker::{Marker, MarkerSet};
pub use matcher::{LiteralMatcher, StringMatcher};
pub use session::{wrap_index, OpenOutcome, SearchSession};
pub use state::SearchState;
pub use types::{
    HighlightClass, MatchSpan, Position, SearchCounters, SearchDirection, SearchOptions,
    SearchStatus, SearchUiState,
};
