// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Rich-text codec used for the package's text entry.
//!
//! The store only needs text that round-trips through a [`RichTextCodec`].
//! [`RtfCodec`] writes a small, deterministic RTF document and reads RTF
//! produced by common editors by keeping the text runs and dropping
//! formatting, font/color tables, and other destination groups.

use thiserror::Error;

/// Failures while converting between note text and its stored bytes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("data is not an RTF document")]
    NotRtf,
    #[error("unbalanced group or truncated control sequence at byte {0}")]
    Unbalanced(usize),
    #[error("invalid hex escape at byte {0}")]
    InvalidHex(usize),
    /// Text the codec cannot represent.
    #[error("text cannot be encoded: {0}")]
    Unsupported(String),
}

/// Encoder/decoder pair for the package text entry.
pub trait RichTextCodec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError>;
}

/// Plain-text RTF codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct RtfCodec;

const HEADER: &str = "{\\rtf1\\ansi\\ansicpg1252\\deff0\n\
{\\fonttbl\\f0\\fswiss\\fcharset0 Helvetica;}\n\
\\f0\\fs24 ";

/// Control words that open groups whose content is not note text.
const DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "expandedcolortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "headerl",
    "headerr",
    "footer",
    "footerl",
    "footerr",
    "footnote",
    "fldinst",
    "listtable",
    "listoverridetable",
    "revtbl",
    "rsidtbl",
    "filetbl",
    "generator",
    "xmlnstbl",
    "themedata",
    "latentstyles",
    "datastore",
];

/// Windows-1252 code points for bytes 0x80..=0x9F; other bytes map to Latin-1.
const CP1252_HIGH: [u32; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0x008D, 0x017D, 0x008F, 0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

impl RichTextCodec for RtfCodec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let mut out = String::with_capacity(HEADER.len() + text.len() + 1);
        out.push_str(HEADER);
        for ch in text.chars() {
            match ch {
                '\\' | '{' | '}' => {
                    out.push('\\');
                    out.push(ch);
                }
                '\n' => out.push_str("\\par\n"),
                '\t' => out.push_str("\\tab "),
                c if c.is_ascii_control() => out.push_str(&format!("\\'{:02x}", c as u32)),
                c if c.is_ascii() => out.push(c),
                c => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{}?", *unit as i16));
                    }
                }
            }
        }
        out.push('}');
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        if !bytes[start..].starts_with(b"{\\rtf") {
            return Err(CodecError::NotRtf);
        }
        Decoder::new(bytes, start).run()
    }
}

#[derive(Clone, Copy)]
struct GroupState {
    /// Inside a destination whose text is discarded.
    skip: bool,
    /// Fallback characters following each `\uN`.
    uc: usize,
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    out: String,
    stack: Vec<GroupState>,
    state: GroupState,
    pending_skip: usize,
    high_surrogate: Option<u16>,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self {
            bytes,
            pos,
            out: String::with_capacity(bytes.len()),
            stack: Vec::new(),
            state: GroupState { skip: false, uc: 1 },
            pending_skip: 0,
            high_surrogate: None,
        }
    }

    fn run(mut self) -> Result<String, CodecError> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'{' => {
                    self.stack.push(self.state);
                    self.pending_skip = 0;
                    self.pos += 1;
                }
                b'}' => {
                    self.state = self.stack.pop().ok_or(CodecError::Unbalanced(self.pos))?;
                    self.pending_skip = 0;
                    self.pos += 1;
                    if self.stack.is_empty() {
                        self.flush_surrogate();
                        return Ok(self.out);
                    }
                }
                b'\\' => self.control()?,
                b'\r' | b'\n' => self.pos += 1,
                _ => {
                    self.pos += 1;
                    self.emit_byte(byte);
                }
            }
        }
        Err(CodecError::Unbalanced(self.bytes.len()))
    }

    /// Handle the control word or symbol starting at the current backslash.
    fn control(&mut self) -> Result<(), CodecError> {
        let at = self.pos;
        let next = *self.bytes.get(at + 1).ok_or(CodecError::Unbalanced(at))?;

        if next.is_ascii_alphabetic() {
            let word_start = at + 1;
            let mut end = word_start;
            while self.bytes.get(end).is_some_and(u8::is_ascii_alphabetic) {
                end += 1;
            }
            let word = String::from_utf8_lossy(&self.bytes[word_start..end]).into_owned();

            let param_start = end;
            if self.bytes.get(end) == Some(&b'-') {
                end += 1;
            }
            while self.bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            let param = std::str::from_utf8(&self.bytes[param_start..end])
                .ok()
                .and_then(|digits| digits.parse::<i32>().ok());

            if self.bytes.get(end) == Some(&b' ') {
                end += 1;
            }
            self.pos = end;
            self.control_word(&word, param);
            return Ok(());
        }

        self.pos = at + 2;
        match next {
            b'\\' | b'{' | b'}' => self.emit(next as char),
            b'\'' => {
                let hex = self
                    .bytes
                    .get(at + 2..at + 4)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or(CodecError::InvalidHex(at))?;
                self.pos = at + 4;
                self.emit_byte(hex);
            }
            b'*' => self.state.skip = true,
            b'~' => self.emit('\u{00A0}'),
            b'_' => self.emit('\u{2011}'),
            b'\n' | b'\r' => self.emit('\n'),
            _ => {}
        }
        Ok(())
    }

    fn control_word(&mut self, word: &str, param: Option<i32>) {
        match word {
            "par" | "line" => self.emit('\n'),
            "tab" => self.emit('\t'),
            "emdash" => self.emit('\u{2014}'),
            "endash" => self.emit('\u{2013}'),
            "bullet" => self.emit('\u{2022}'),
            "lquote" => self.emit('\u{2018}'),
            "rquote" => self.emit('\u{2019}'),
            "ldblquote" => self.emit('\u{201C}'),
            "rdblquote" => self.emit('\u{201D}'),
            "uc" => self.state.uc = param.unwrap_or(1).max(0) as usize,
            "u" => {
                if let Some(n) = param {
                    let unit = if n < 0 { n + 0x10000 } else { n };
                    self.emit_utf16(unit as u16);
                    self.pending_skip = self.state.uc;
                }
            }
            w if DESTINATIONS.contains(&w) => self.state.skip = true,
            _ => {}
        }
    }

    fn emit_byte(&mut self, byte: u8) {
        let code = match byte {
            0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
            b => u32::from(b),
        };
        self.emit(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    fn emit(&mut self, ch: char) {
        if self.state.skip {
            return;
        }
        if self.pending_skip > 0 {
            self.pending_skip -= 1;
            return;
        }
        self.flush_surrogate();
        self.out.push(ch);
    }

    fn emit_utf16(&mut self, unit: u16) {
        if self.state.skip {
            return;
        }
        match unit {
            0xD800..=0xDBFF => {
                self.flush_surrogate();
                self.high_surrogate = Some(unit);
            }
            0xDC00..=0xDFFF => {
                let ch = self
                    .high_surrogate
                    .take()
                    .and_then(|high| char::decode_utf16([high, unit]).next())
                    .and_then(Result::ok)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.out.push(ch);
            }
            _ => {
                self.flush_surrogate();
                self.out
                    .push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    /// An unpaired high surrogate becomes a replacement character.
    fn flush_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }
}
