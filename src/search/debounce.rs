//! 入力の遅延実行
//!
//! キー入力ごとにタイマーを張り直し、最後の入力だけを検索する。
//! イベントループから `poll` を呼んで期限切れを検出する

use std::time::{Duration, Instant};

/// 予約済み検索のハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

/// 期限を迎えた検索
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredSearch {
    /// 検索するクエリ
    pub query: String,
    /// 予約時のセッション世代
    pub generation: u64,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    handle: TimerHandle,
    query: String,
    deadline: Instant,
    generation: u64,
}

/// 一回限りの遅延タイマー
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<PendingSearch>,
    next_handle: u64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// タイマーを張る。予約済みのものは取り消される
    pub fn arm(&mut self, query: impl Into<String>, now: Instant, generation: u64) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        if let Some(previous) = self.pending.take() {
            log::trace!(target: "notefind", "debounce {:?} superseded", previous.handle);
        }
        self.pending = Some(PendingSearch {
            handle,
            query: query.into(),
            deadline: now + self.delay,
            generation,
        });
        handle
    }

    /// 予約を取り消す
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 予約中の検索の期限
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// 予約中のハンドル
    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending.as_ref().map(|p| p.handle)
    }

    /// 期限を過ぎていれば予約を取り出す
    pub fn poll(&mut self, now: Instant) -> Option<FiredSearch> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// 期限を待たずに予約を取り出す
    pub fn flush(&mut self) -> Option<FiredSearch> {
        self.pending.take().map(|p| FiredSearch {
            query: p.query,
            generation: p.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_after_delay() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(ms(200));
        debouncer.arm("cat", base, 1);

        assert_eq!(debouncer.poll(base + ms(199)), None);
        let fired = debouncer.poll(base + ms(200)).unwrap();
        assert_eq!(fired.query, "cat");
        assert_eq!(fired.generation, 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn rearm_keeps_only_last_query() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(ms(200));
        let first = debouncer.arm("c", base, 1);
        let second = debouncer.arm("ca", base + ms(50), 1);
        assert_ne!(first, second);

        assert_eq!(debouncer.poll(base + ms(200)), None);
        let fired = debouncer.poll(base + ms(250)).unwrap();
        assert_eq!(fired.query, "ca");
        assert_eq!(debouncer.poll(base + ms(1000)), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(ms(10));
        debouncer.arm("x", base, 3);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(base + ms(100)), None);
    }
}
