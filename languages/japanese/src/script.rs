use kage_core::ScriptPredicate;

/// Hiragana and katakana.
const KANA: std::ops::RangeInclusive<char> = '\u{3040}'..='\u{30FF}';
/// CJK unified ideographs in everyday use.
const KANJI: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FAF}';

pub fn is_japanese_char(c: char) -> bool {
    KANA.contains(&c) || KANJI.contains(&c)
}

/// Matches text containing at least one kana or kanji.
pub struct JapaneseScript;

impl ScriptPredicate for JapaneseScript {
    fn name(&self) -> &str {
        "ja"
    }

    fn matches(&self, text: &str) -> bool {
        text.chars().any(is_japanese_char)
    }
}
