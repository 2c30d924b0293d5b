//! Minimal RTF to plain text conversion.

use super::MarkupNormalizer;

/// Destinations whose content is never visible text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "colorschememapping",
    "colortbl",
    "datastore",
    "filetbl",
    "fldinst",
    "fonttbl",
    "footer",
    "footerf",
    "footerl",
    "footerr",
    "generator",
    "header",
    "headerf",
    "headerl",
    "headerr",
    "info",
    "latentstyles",
    "listoverridetable",
    "listtable",
    "object",
    "pict",
    "revtbl",
    "rsidtbl",
    "stylesheet",
    "themedata",
    "xmlnstbl",
];

/// Strips RTF control words and groups down to the document text.
///
/// Handles paragraph/line breaks, tabs, escaped characters, `\'hh` byte
/// escapes (decoded as Latin-1) and `\uN` Unicode escapes with their
/// fallback characters. Formatting is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtfStripper;

impl RtfStripper {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupNormalizer for RtfStripper {
    fn is_markup(&self, text: &str) -> bool {
        text.trim().starts_with("{\\rtf")
    }

    fn to_plain_text(&self, text: &str) -> String {
        Stripper::new(text).run()
    }
}

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    unicode_skip: usize,
}

struct Stripper {
    chars: Vec<char>,
    pos: usize,
    out: String,
    state: GroupState,
    stack: Vec<GroupState>,
    /// Fallback characters still to drop after a `\uN` escape.
    pending_fallback: usize,
}

impl Stripper {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            out: String::with_capacity(text.len() / 2),
            state: GroupState {
                skip: false,
                unicode_skip: 1,
            },
            stack: Vec::new(),
            pending_fallback: 0,
        }
    }

    fn run(mut self) -> String {
        while let Some(&c) = self.chars.get(self.pos) {
            match c {
                '{' => {
                    self.stack.push(self.state);
                    self.pos += 1;
                }
                '}' => {
                    if let Some(state) = self.stack.pop() {
                        self.state = state;
                    }
                    self.pending_fallback = 0;
                    self.pos += 1;
                }
                '\\' => self.control(),
                '\r' | '\n' => self.pos += 1,
                _ => {
                    self.text(c);
                    self.pos += 1;
                }
            }
        }
        self.out
    }

    /// Visible character, possibly consumed as a `\uN` fallback.
    fn text(&mut self, c: char) {
        if self.pending_fallback > 0 {
            self.pending_fallback -= 1;
        } else if !self.state.skip {
            self.out.push(c);
        }
    }

    /// Character produced by a control word.
    fn emit(&mut self, c: char) {
        self.pending_fallback = 0;
        if !self.state.skip {
            self.out.push(c);
        }
    }

    fn control(&mut self) {
        let Some(&next) = self.chars.get(self.pos + 1) else {
            self.pos += 1;
            return;
        };

        if next.is_ascii_alphabetic() {
            self.control_word();
            return;
        }

        self.pos += 2;
        match next {
            '\'' => {
                let hex: String = self.chars.iter().skip(self.pos).take(2).collect();
                self.pos += hex.chars().count();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    self.text(char::from(byte));
                }
            }
            '*' => self.state.skip = true,
            '\\' | '{' | '}' => self.text(next),
            '~' => self.emit('\u{a0}'),
            '_' => self.emit('-'),
            '\r' | '\n' => self.emit('\n'),
            _ => {}
        }
    }

    fn control_word(&mut self) {
        let start = self.pos + 1;
        let mut end = start;
        while self.chars.get(end).is_some_and(char::is_ascii_alphabetic) {
            end += 1;
        }
        let word: String = self.chars[start..end].iter().collect();

        let mut param_end = end;
        if self.chars.get(param_end) == Some(&'-') {
            param_end += 1;
        }
        while self.chars.get(param_end).is_some_and(char::is_ascii_digit) {
            param_end += 1;
        }
        let param: Option<i64> = if param_end > end {
            self.chars[end..param_end]
                .iter()
                .collect::<String>()
                .parse()
                .ok()
        } else {
            None
        };
        let consumed_digits = param.is_some();

        self.pos = if consumed_digits { param_end } else { end };
        if self.chars.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }

        match word.as_str() {
            "par" | "line" | "sect" | "page" => self.emit('\n'),
            "tab" => self.emit('\t'),
            "emdash" => self.emit('\u{2014}'),
            "endash" => self.emit('\u{2013}'),
            "bullet" => self.emit('\u{2022}'),
            "lquote" => self.emit('\u{2018}'),
            "rquote" => self.emit('\u{2019}'),
            "ldblquote" => self.emit('\u{201c}'),
            "rdblquote" => self.emit('\u{201d}'),
            "uc" => {
                self.state.unicode_skip = param.unwrap_or(1).max(0) as usize;
            }
            "u" => {
                if let Some(code) = param {
                    let code = if code < 0 { code + 65536 } else { code };
                    if let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) {
                        self.emit(c);
                    }
                    self.pending_fallback = self.state.unicode_skip;
                }
            }
            "bin" => {
                self.pos += param.unwrap_or(0).max(0) as usize;
            }
            w if SKIPPED_DESTINATIONS.contains(&w) => self.state.skip = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_rtf() {
        let stripper = RtfStripper::new();
        assert!(stripper.is_markup("  {\\rtf1\\ansi hello}"));
        assert!(!stripper.is_markup("Detail Description 1: Door"));
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = "Detail Description 1: Door\nORDER REMARK";
        assert_eq!(RtfStripper::new().normalize(text), text);
    }

    #[test]
    fn test_strips_document_to_lines() {
        let rtf = "{\\rtf1\\ansi\\deff0{\\fonttbl{\\f0 Arial;}}{\\colortbl;\\red0\\green0\\blue0;}\
                   \\f0\\fs20 Detail Description 1: Door\\par\n\
                   Detail Description 2: Panel (F)\\par\n\
                   ORDER REMARK\\par\n\
                   first remark\\par}";
        let text = RtfStripper::new().normalize(rtf);
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                "Detail Description 1: Door",
                "Detail Description 2: Panel (F)",
                "ORDER REMARK",
                "first remark",
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let stripper = RtfStripper::new();
        assert_eq!(stripper.to_plain_text("{\\rtf1 caf\\'e9}"), "café");
        assert_eq!(stripper.to_plain_text("{\\rtf1 a\\u8212?b}"), "a\u{2014}b");
        assert_eq!(stripper.to_plain_text("{\\rtf1 \\{x\\}\\\\}"), "{x}\\");
        assert_eq!(stripper.to_plain_text("{\\rtf1 a\\tab b}"), "a\tb");
    }

    #[test]
    fn test_ignorable_destination_is_skipped() {
        let rtf = "{\\rtf1{\\*\\generator Riched20 10.0;}visible}";
        assert_eq!(RtfStripper::new().to_plain_text(rtf), "visible");
    }
}
