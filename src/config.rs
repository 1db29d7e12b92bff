//! 検索設定
//!
//! セッション生成時に一度だけ読み込まれる

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FindError, Result};
use crate::logging::DebugVerbosity;
use crate::search::SearchOptions;

/// 既定の入力遅延（ミリ秒）
pub const DEFAULT_SEARCH_DELAY_MS: i64 = 200;

/// 入力から検索を起動する方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// 入力が止まってから指定時間後に検索
    Debounced(Duration),
    /// Enter / F3 で確定したときだけ検索
    WaitForConfirm,
}

/// 検索設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindConfig {
    /// 入力遅延（負値なら確定待ちモード）
    pub search_delay_milliseconds: i64,
    /// デバッグ出力の詳細度
    pub debug_verbosity: DebugVerbosity,
    /// ログファイル出力先
    pub log_file: Option<PathBuf>,
    /// 検索オプション
    pub options: SearchOptions,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            search_delay_milliseconds: DEFAULT_SEARCH_DELAY_MS,
            debug_verbosity: DebugVerbosity::default(),
            log_file: None,
            options: SearchOptions::default(),
        }
    }
}

impl FindConfig {
    /// JSONファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|err| FindError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// ファイルが無ければ既定値を返す
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!(target: "notefind", "no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 既定の設定ファイルパス（`<config_dir>/notefind/config.json`）
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notefind").join("config.json"))
    }

    /// 検索起動方式を取得
    pub fn mode(&self) -> SearchMode {
        if self.search_delay_milliseconds < 0 {
            SearchMode::WaitForConfirm
        } else {
            SearchMode::Debounced(Duration::from_millis(self.search_delay_milliseconds as u64))
        }
    }

    /// 確定待ちモードの設定を作成
    pub fn wait_for_confirm() -> Self {
        Self {
            search_delay_milliseconds: -1,
            ..Self::default()
        }
    }

    /// 遅延を指定した設定を作成
    pub fn with_delay(milliseconds: i64) -> Self {
        Self {
            search_delay_milliseconds: milliseconds,
            ..Self::default()
        }
    }
}
