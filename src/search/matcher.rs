//! 検索用マッチャー

use regex::RegexBuilder;

use super::escape::escape;
use super::types::{MatchSpan, Position, SearchOptions};
use crate::error::Result;

/// 文字列マッチング戦略
pub trait StringMatcher {
    /// 文字列内のすべてのマッチを文書順で返す
    fn find_all(
        &self,
        text: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<MatchSpan<Position>>>;
}

/// リテラル部分一致マッチャー
///
/// クエリをエスケープしてから正規表現エンジンで走査し、
/// 行・列はテキストを一度だけ走査しながら求める
#[derive(Debug, Default, Clone)]
pub struct LiteralMatcher;

impl LiteralMatcher {
    /// インスタンスを作成
    pub fn new() -> Self {
        Self
    }
}

impl StringMatcher for LiteralMatcher {
    fn find_all(
        &self,
        text: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<MatchSpan<Position>>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        if options.regex || options.whole_word {
            log::warn!(
                target: "notefind",
                "regex/whole-word search is not supported, searching literally"
            );
        }

        let regex = RegexBuilder::new(&escape(query))
            .case_insensitive(!options.case_sensitive)
            .build()?;

        let mut walker = LineWalker::new(text);
        let mut matches = Vec::new();
        for m in regex.find_iter(text) {
            // find_iter は空一致を返しうるが、空でないリテラルでは起こらない
            if m.start() == m.end() {
                continue;
            }
            let start = walker.advance_to(m.start());
            let end = walker.advance_to(m.end());
            matches.push(MatchSpan::new(start, end));
        }

        Ok(matches)
    }
}

/// テキストを先頭から一方向に進みながら行・列を追跡する
struct LineWalker<'a> {
    text: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> LineWalker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            position: Position::default(),
        }
    }

    /// バイトオフセット `target` まで進め、その位置を返す
    ///
    /// `target` は単調増加で与えること
    fn advance_to(&mut self, target: usize) -> Position {
        debug_assert!(target >= self.offset);
        for ch in self.text[self.offset..target].chars() {
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
        }
        self.offset = target;
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::{LiteralMatcher, StringMatcher};
    use crate::search::types::{MatchSpan, Position, SearchOptions};

    fn find(text: &str, query: &str) -> Vec<MatchSpan<Position>> {
        LiteralMatcher::new()
            .find_all(text, query, &SearchOptions::default())
            .unwrap()
    }

    #[test]
    fn finds_basic_matches() {
        let result = find("the cat sat on the mat", "at");
        let columns: Vec<usize> = result.iter().map(|m| m.start.column).collect();
        assert_eq!(columns, vec![5, 9, 20]);
        assert_eq!(result[0].end, Position::new(0, 7));
    }

    #[test]
    fn handles_newlines() {
        let result = find("hello\nworld\n  world", "world");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].start, Position::new(1, 0));
        assert_eq!(result[1].start, Position::new(2, 2));
        assert_eq!(result[1].end, Position::new(2, 7));
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(find("anything", "").is_empty());
    }

    #[test]
    fn returns_empty_for_non_match() {
        assert!(find("abc", "z").is_empty());
    }

    #[test]
    fn case_insensitive_by_default() {
        let result = find("Hello HELLO hello", "hello");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn case_sensitive_option() {
        let options = SearchOptions {
            case_sensitive: true,
            ..SearchOptions::default()
        };
        let result = LiteralMatcher::new()
            .find_all("Hello HELLO hello", "hello", &options)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start.column, 12);
    }

    #[test]
    fn meta_characters_match_literally() {
        let result = find("cost: $5 (approx.) or $5.", "$5.");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start.column, 22);
    }

    #[test]
    fn matches_do_not_overlap() {
        let result = find("aaaa", "aa");
        let columns: Vec<usize> = result.iter().map(|m| m.start.column).collect();
        assert_eq!(columns, vec![0, 2]);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let result = find("日本語のテキスト、テキスト", "テキスト");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].start.column, 4);
        assert_eq!(result[1].start.column, 9);
        assert_eq!(result[1].end.column, 13);
    }

    #[test]
    fn reserved_flags_fall_back_to_literal() {
        let options = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let result = LiteralMatcher::new().find_all("a.c abc", "a.c", &options).unwrap();
        assert_eq!(result.len(), 1);
    }
}
