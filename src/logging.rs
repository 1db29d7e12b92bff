//! ロギングシステム
//!
//! `log` ファサード向けのバックエンドを提供する
//! 出力レベルは設定の `debug_verbosity` で決まる

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use log::{LevelFilter, Log, Metadata, Record};
use serde::{Deserialize, Serialize};

use crate::config::FindConfig;

/// デバッグ出力の詳細度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DebugVerbosity {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl DebugVerbosity {
    /// `log` のフィルタへ変換
    pub fn level_filter(self) -> LevelFilter {
        match self {
            DebugVerbosity::Off => LevelFilter::Off,
            DebugVerbosity::Error => LevelFilter::Error,
            DebugVerbosity::Warn => LevelFilter::Warn,
            DebugVerbosity::Info => LevelFilter::Info,
            DebugVerbosity::Debug => LevelFilter::Debug,
            DebugVerbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// ロガー
///
/// * 標準エラー出力へ `LEVEL: message` 形式で書き出す
/// * ファイル出力先が設定されていれば追記する
#[derive(Debug, Clone)]
pub struct FindLogger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
}

impl FindLogger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 設定から構築
    pub fn from_config(config: &FindConfig) -> Self {
        let mut logger = Self::new(config.debug_verbosity.level_filter());
        if let Some(path) = &config.log_file {
            logger = logger.with_file_output(path.clone());
        }
        logger
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化（テスト向け）
    #[cfg(test)]
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn should_log(&self, level: log::Level) -> bool {
        level <= self.level
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", message);
            }
        }
    }
}

impl Log for FindLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.should_log(metadata.level())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "{}: notefind: {}",
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

/// グローバルロガーを設定する
///
/// 既に設定済みの場合は何もせず `false` を返す
pub fn init(config: &FindConfig) -> bool {
    let logger = FindLogger::from_config(config);
    let level = logger.level();
    match log::set_boxed_logger(Box::new(logger)) {
        Ok(()) => {
            log::set_max_level(level);
            true
        }
        Err(_) => false,
    }
}
