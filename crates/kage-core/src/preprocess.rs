use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default preprocessor for recognized text
    fn process(&self, text: &str) -> String {
        let mut text = text.trim().to_string();

        if text.is_empty() {
            return text;
        }

        // Unicode normalization (NFKC)
        text = text.nfkc().collect();

        // OCR line breaks inside one detection
        join_lines(&text)
    }
}

/// Join wrapped lines and collapse whitespace runs to one space. Lines meet
/// without a space when either side is CJK.
fn join_lines(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            continue;
        }
        let spaced = match (joined.chars().last(), line.chars().next()) {
            (Some(prev), Some(next)) => !is_cjk(prev) && !is_cjk(next),
            _ => false,
        };
        if spaced {
            joined.push(' ');
        }
        joined.push_str(&line);
    }
    joined
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' | '\u{FF00}'..='\u{FFEF}'
        | '\u{20000}'..='\u{2FA1F}')
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
