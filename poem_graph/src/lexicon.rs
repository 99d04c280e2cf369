//! The frozen word-extension table and the word splitter.
//!
//! Clicking a word inside a poem window extends it into a new fragment
//! drawn from this table.  Unknown words fall back to the `default` set,
//! so a lookup never fails.

// ════════════════════════════════════════════════════════════════════════════
// Extension table
// ════════════════════════════════════════════════════════════════════════════

/// Text of the bootstrap node created at startup.
pub const BOOTSTRAP_TEXT: &str = "你好嗎？";

/// Fallback set used for every word without its own entry.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "你在窗前的目光，直視著看不見的他",
    "那像是夢的邊界",
    "在資訊之海上，留下訊號的節點",
];

/// Extension phrases for a clicked word.  A fixed mapping with a defined
/// fallback key — never an error path.
pub fn extensions_for(word: &str) -> &'static [&'static str] {
    match word {
        "你好嗎？" => &[
            "思緒是一種超連結，轉瞬即現。",
            "點一下，我的想法被帶到了遠方。",
            "你的目光被連到哪裡呢?",
        ],
        "你" => &["是否聽見回音", "消失在窗外", "等待另一段對話"],
        "好" => &["就像雨後的光", "也許是假象", "藏在照片裡的你"],
        "嗎" => &["誰也說不清", "這像是結束還是開始", "語句打轉"],
        "我" => &["並沒有說出口", "寫進日記裡", "不小心提起了你"],
        "風" => &["有些微涼", "寫進失望裡", "不小心忘記了"],
        _ => DEFAULT_EXTENSIONS,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Word splitting
// ════════════════════════════════════════════════════════════════════════════

/// Separator set: whitespace plus the CJK/ASCII punctuation the lexicon
/// texts actually use.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '，' | '。' | '？' | '?' | '！' | '!')
}

/// Split a fragment into clickable words, dropping separators and empties.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split(is_separator).filter(|w| !w.is_empty()).collect()
}

/// One run of a fragment: either a word or a separator stretch, with its
/// position in Unicode scalars.  The presentation layer needs the offsets
/// to render a partially revealed text and to keep punctuation visible
/// but unclickable.
#[derive(Clone, Debug, PartialEq)]
pub struct WordSpan {
    pub text:       String,
    /// Inclusive start, in chars.
    pub char_start: usize,
    /// Exclusive end, in chars.
    pub char_end:   usize,
    pub separator:  bool,
}

/// Split a fragment into alternating word/separator spans covering the
/// whole text.
pub fn word_spans(text: &str) -> Vec<WordSpan> {
    let mut spans: Vec<WordSpan> = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let sep = is_separator(c);
        match spans.last_mut() {
            Some(last) if last.separator == sep && last.char_end == i => {
                last.text.push(c);
                last.char_end = i + 1;
            }
            _ => spans.push(WordSpan {
                text:       c.to_string(),
                char_start: i,
                char_end:   i + 1,
                separator:  sep,
            }),
        }
    }
    spans
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
