//! 検索語のエスケープ

/// 正規表現のメタ文字
const META_CHARS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// 入力をリテラル一致用のパターンへ変換する
///
/// メタ文字の前にバックスラッシュを付け、それ以外の文字はそのまま残す
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if META_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn empty_stays_empty() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape("hello world - #1 & ~"), "hello world - #1 & ~");
    }

    #[test]
    fn every_meta_char_is_escaped() {
        assert_eq!(
            escape(r".*+?^${}()|[]\"),
            r"\.\*\+\?\^\$\{\}\(\)\|\[\]\\"
        );
    }

    #[test]
    fn escaped_pattern_matches_literally() {
        let pattern = escape("a.b(c)");
        let re = regex::Regex::new(&pattern).unwrap();
        assert!(re.is_match("xx a.b(c) yy"));
        assert!(!re.is_match("axb(c)"));
    }
}
