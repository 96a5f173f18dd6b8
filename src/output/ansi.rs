//! ANSI escape sequence interpreter.
//!
//! Handles the subset of control sequences a remote shell prompt commonly
//! emits: SGR colors and weight, erase display (`J`), erase line (`K`) and
//! cursor home (`H`/`f`). Other CSI sequences are consumed without effect.
//! An escape that does not start a well-formed CSI sequence is dropped and
//! the characters after it are kept as literal text, so the interpreter
//! never fails on hostile or truncated input.

use super::style::{Color, Style};

const ESC: char = '\x1b';

/// Longest unterminated escape held back for the next chunk.
pub const MAX_ESCAPE_CARRY: usize = 64;

/// Control signal produced alongside text segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// SGR 0 or an empty SGR.
    ResetAll,
    /// SGR 39.
    ResetColor,
    /// SGR 49.
    ResetBgColor,
    /// SGR 1.
    Bold,
    /// Erase display.
    ClearScreen,
    /// Erase to end of line.
    ClearLine,
    /// Move cursor to the top-left corner.
    CursorHome,
}

/// A maximal run of characters sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub style: Style,
}

impl TextSegment {
    pub fn foreground(&self) -> Option<Color> {
        self.style.foreground
    }

    pub fn background(&self) -> Option<Color> {
        self.style.background
    }

    pub fn bold(&self) -> bool {
        self.style.bold
    }
}

/// One item of interpreter output, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnsiEvent {
    Text(TextSegment),
    Control(ControlSignal),
}

/// Stateless entry points to the interpreter.
pub struct AnsiInterpreter;

impl AnsiInterpreter {
    /// Interpret `text` starting from the default rendition.
    pub fn parse(text: &str) -> Vec<AnsiEvent> {
        Self::parse_with_style(text, Style::default()).0
    }

    /// Interpret `text` starting from `initial`.
    ///
    /// Returns the events and the rendition in effect at the end of the
    /// text, so a caller can carry style across chunk boundaries.
    pub fn parse_with_style(text: &str, initial: Style) -> (Vec<AnsiEvent>, Style) {
        let chars: Vec<char> = text.chars().collect();
        let mut scan = Scan::new(initial);
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != ESC {
                scan.pending.push(chars[i]);
                i += 1;
                continue;
            }

            match Csi::at(&chars, i) {
                Some(csi) => {
                    scan.dispatch(&csi);
                    i = csi.end;
                }
                // Unrecognized escape: skip the introducer only.
                None => i += 1,
            }
        }

        scan.flush();
        (scan.events, scan.style)
    }

    /// Only the text segments of [`parse`](Self::parse).
    pub fn segments(text: &str) -> Vec<TextSegment> {
        Self::parse(text)
            .into_iter()
            .filter_map(|event| match event {
                AnsiEvent::Text(segment) => Some(segment),
                AnsiEvent::Control(_) => None,
            })
            .collect()
    }

    /// Remove every escape sequence and return the literal text.
    pub fn strip_ansi(text: &str) -> String {
        Self::segments(text)
            .into_iter()
            .map(|segment| segment.text)
            .collect()
    }

    /// Strip escape sequences from raw bytes, decoding them lossily.
    pub fn strip_ansi_bytes(input: &[u8]) -> String {
        Self::strip_ansi(&String::from_utf8_lossy(input))
    }

    /// Byte offset of an escape cut off at the end of `text`.
    ///
    /// Matches a trailing lone `ESC` or `ESC [` followed only by parameter
    /// characters. Such a tail may still become a valid sequence once the
    /// next read arrives. Tails longer than [`MAX_ESCAPE_CARRY`] are not
    /// reported.
    pub fn incomplete_tail(text: &str) -> Option<usize> {
        let start = text.rfind(ESC)?;
        let tail = &text[start + ESC.len_utf8()..];
        if text.len() - start > MAX_ESCAPE_CARRY {
            return None;
        }

        let mut chars = tail.chars();
        match chars.next() {
            None => Some(start),
            Some('[') if chars.all(is_param_char) => Some(start),
            Some(_) => None,
        }
    }
}

/// A complete `ESC [ params command` sequence.
struct Csi {
    params: String,
    command: char,
    /// Index just past the command character.
    end: usize,
}

impl Csi {
    fn at(chars: &[char], start: usize) -> Option<Csi> {
        if chars.get(start + 1) != Some(&'[') {
            return None;
        }

        let params_start = start + 2;
        let mut j = params_start;
        while let Some(&c) = chars.get(j) {
            if is_param_char(c) {
                j += 1;
            } else {
                break;
            }
        }

        let command = *chars.get(j)?;
        if !('@'..='~').contains(&command) {
            return None;
        }

        Some(Csi {
            params: chars[params_start..j].iter().collect(),
            command,
            end: j + 1,
        })
    }
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_digit() || c == ';' || c == '?'
}

struct Scan {
    events: Vec<AnsiEvent>,
    pending: String,
    style: Style,
}

impl Scan {
    fn new(style: Style) -> Self {
        Self {
            events: Vec::new(),
            pending: String::new(),
            style,
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.events.push(AnsiEvent::Text(TextSegment {
                text: std::mem::take(&mut self.pending),
                style: self.style,
            }));
        }
    }

    fn signal(&mut self, signal: ControlSignal) {
        self.events.push(AnsiEvent::Control(signal));
    }

    fn dispatch(&mut self, csi: &Csi) {
        match csi.command {
            'm' => {
                self.flush();
                self.apply_sgr(&csi.params);
            }
            'J' => {
                self.flush();
                self.signal(ControlSignal::ClearScreen);
            }
            'K' => {
                self.flush();
                self.signal(ControlSignal::ClearLine);
            }
            'H' | 'f' => {
                self.flush();
                self.signal(ControlSignal::CursorHome);
            }
            _ => {}
        }
    }

    fn apply_sgr(&mut self, params: &str) {
        if params.is_empty() {
            self.style = Style::default();
            self.signal(ControlSignal::ResetAll);
            return;
        }

        // An empty parameter means 0; anything non-numeric is ignored.
        let codes: Vec<Option<u16>> = params
            .split(';')
            .map(|p| if p.is_empty() { Some(0) } else { p.parse().ok() })
            .collect();

        let mut k = 0;
        while k < codes.len() {
            let Some(code) = codes[k] else {
                k += 1;
                continue;
            };

            match code {
                0 => {
                    self.style = Style::default();
                    self.signal(ControlSignal::ResetAll);
                }
                1 => {
                    self.style.bold = true;
                    self.signal(ControlSignal::Bold);
                }
                22 => self.style.bold = false,
                30..=37 => self.style.foreground = Color::standard(code - 30),
                38 | 48 => k += extended_payload_len(&codes[k + 1..]),
                39 => {
                    self.style.foreground = None;
                    self.signal(ControlSignal::ResetColor);
                }
                40..=47 => self.style.background = Color::standard(code - 40),
                49 => {
                    self.style.background = None;
                    self.signal(ControlSignal::ResetBgColor);
                }
                90..=97 => self.style.foreground = Color::bright(code - 90),
                100..=107 => self.style.background = Color::bright(code - 100),
                _ => {}
            }
            k += 1;
        }
    }
}

/// Parameters consumed by a 256-color (`5;n`) or RGB (`2;r;g;b`) payload.
fn extended_payload_len(rest: &[Option<u16>]) -> usize {
    let len = match rest.first() {
        Some(Some(5)) => 2,
        Some(Some(2)) => 4,
        _ => 0,
    };
    len.min(rest.len())
}
