//! 照合とマッチ間移動のプロパティテスト
//!
//! 公開 API だけを使い、任意のテキストと検索語に対する不変条件を確認する

use notefind::document::{MemoryBuffer, PlainBufferAdapter};
use notefind::search::{LiteralMatcher, MatchSpan, Position, SearchOptions, StringMatcher};
use notefind::{DocumentId, FindConfig, SearchDirection, SearchSession};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn haystack() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('B'),
            Just('.'),
            Just('*'),
            Just('\n'),
            Just(' '),
            Just('ä'),
            Just('猫'),
        ],
        0..64,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn needle() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![Just('a'), Just('b'), Just('.'), Just('*'), Just('猫')],
        1..4,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// 左から貪欲に、重ならないように数える（ASCII の大文字小文字を無視）
fn naive_count(text: &str, needle: &str) -> usize {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let needle: Vec<char> = needle.chars().map(|c| c.to_ascii_lowercase()).collect();
    let mut count = 0;
    let mut idx = 0;
    while idx + needle.len() <= text.len() {
        if text[idx..idx + needle.len()] == needle[..] {
            count += 1;
            idx += needle.len();
        } else {
            idx += 1;
        }
    }
    count
}

/// 行・列の範囲に対応する部分文字列
fn slice(text: &str, span: &MatchSpan<Position>) -> Option<String> {
    if span.start.line != span.end.line {
        return None;
    }
    let line = text.split('\n').nth(span.start.line)?;
    Some(
        line.chars()
            .skip(span.start.column)
            .take(span.end.column - span.start.column)
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn matches_equal_needle_and_count(text in haystack(), needle in needle()) {
        let spans = LiteralMatcher::new()
            .find_all(&text, &needle, &SearchOptions::default())
            .unwrap();

        prop_assert_eq!(spans.len(), naive_count(&text, &needle));
        for span in &spans {
            let found = slice(&text, span).expect("needle has no newline");
            prop_assert!(found.eq_ignore_ascii_case(&needle));
        }
        for pair in spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn navigation_is_cyclic(count in 1usize..12, start in 0usize..12) {
        let text = vec!["x"; count].join(" ");
        let start = start % count;
        let mut doc = PlainBufferAdapter::new(DocumentId::new(1), MemoryBuffer::from_str(&text));
        doc.host_mut().set_cursor(Position::new(0, start * 2));

        let mut session = SearchSession::new(FindConfig::default());
        session.open(&mut doc);
        session.search(&mut doc, "x");
        prop_assert_eq!(session.current_index(), Some(start));

        for _ in 0..count {
            session.confirm(&mut doc, SearchDirection::Forward);
        }
        prop_assert_eq!(session.current_index(), Some(start));

        session.confirm(&mut doc, SearchDirection::Forward);
        session.confirm(&mut doc, SearchDirection::Backward);
        prop_assert_eq!(session.current_index(), Some(start));
    }

    #[test]
    fn empty_query_always_resets(text in haystack(), needle in needle()) {
        let mut doc = PlainBufferAdapter::new(DocumentId::new(1), MemoryBuffer::from_str(&text));
        let mut session = SearchSession::new(FindConfig::default());
        session.open(&mut doc);
        session.search(&mut doc, &needle);

        let counters = session.search(&mut doc, "");
        prop_assert_eq!(counters.total, 0);
        prop_assert_eq!(counters.current, 0);
        prop_assert!(doc.host().live_marks().is_empty());
    }
}
