//! Per-chunk style injection.
//!
//! Every chunk passing through a [`ChunkInterleaver`] gets a `<style>` tag with
//! the rules added since the previous chunk. The tag goes in front of the
//! chunk, or right after its first `>` when the chunk opens with a closing tag
//! such as `</head>`. Only the first tag-like token of a chunk is inspected.

use core_types::ChunkIndex;
use css::{SheetHandle, StyleAccumulator};
use memchr::memchr;
use tools::Utf8Decoder;

use crate::markup::StyleMarkup;

/// Chunk payloads accepted by the interleaver.
pub trait ChunkText {
    /// Text form of the chunk. Byte chunks go through `decoder` so a character
    /// split across chunk boundaries is completed by the following chunk.
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String;
}

impl ChunkText for str {
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String {
        if decoder.has_pending() {
            decoder.decode(self.as_bytes())
        } else {
            self.to_string()
        }
    }
}

impl ChunkText for String {
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String {
        self.as_str().decode_with(decoder)
    }
}

impl ChunkText for [u8] {
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String {
        decoder.decode(self)
    }
}

impl ChunkText for Vec<u8> {
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String {
        decoder.decode(self)
    }
}

impl<T: ChunkText + ?Sized> ChunkText for &T {
    fn decode_with(&self, decoder: &mut Utf8Decoder) -> String {
        (**self).decode_with(decoder)
    }
}

pub struct ChunkInterleaver<A> {
    sheet: SheetHandle<A>,
    markup: StyleMarkup,
    decoder: Utf8Decoder,
    chunks_seen: ChunkIndex,
}

impl<A: StyleAccumulator> ChunkInterleaver<A> {
    pub fn new(sheet: SheetHandle<A>, markup: StyleMarkup) -> Self {
        Self {
            sheet,
            markup,
            decoder: Utf8Decoder::new(),
            chunks_seen: 0,
        }
    }

    /// Transform one chunk. Always produces exactly one output chunk.
    pub fn transform<C: ChunkText + ?Sized>(&mut self, chunk: &C) -> String {
        let text = chunk.decode_with(&mut self.decoder);
        let css = self.sheet.drain();
        let style = self.markup.format(&css);
        let index = self.chunks_seen;
        self.chunks_seen += 1;
        log::trace!(
            target: "ssr.interleave",
            "chunk #{index}: {} bytes html, {} bytes css",
            text.len(),
            css.len()
        );
        splice_style(&text, &style)
    }

    /// Lossy flush of a UTF-8 sequence left incomplete by the last byte chunk.
    /// Only malformed input leaves anything behind.
    pub fn finish(&mut self) -> Option<String> {
        let tail = self.decoder.finish()?;
        log::warn!(
            target: "ssr.interleave",
            "input ended inside a UTF-8 sequence after chunk #{}",
            self.chunks_seen
        );
        Some(tail)
    }

    pub fn chunks_seen(&self) -> ChunkIndex {
        self.chunks_seen
    }
}

/// `chunk` with `style` inserted after its leading closing tag, or in front of
/// it when it has none.
pub fn splice_style(chunk: &str, style: &str) -> String {
    let mut out = String::with_capacity(chunk.len() + style.len());
    match leading_closing_tag_end(chunk) {
        Some(end) => {
            let (before, after) = chunk.split_at(end);
            out.push_str(before);
            out.push_str(style);
            out.push_str(after);
        }
        None => {
            out.push_str(style);
            out.push_str(chunk);
        }
    }
    out
}

/// Offset just past the first `>` when `chunk` starts (after whitespace) with
/// `</` and an ASCII letter. A closing tag cut off before its `>` counts as no
/// closing tag.
pub fn leading_closing_tag_end(chunk: &str) -> Option<usize> {
    let rest = chunk.trim_start_matches(is_leading_space).as_bytes();
    let opens_closing_tag = rest.len() >= 3
        && rest[0] == b'<'
        && rest[1] == b'/'
        && rest[2].is_ascii_alphabetic();
    if !opens_closing_tag {
        return None;
    }
    memchr(b'>', chunk.as_bytes()).map(|idx| idx + 1)
}

// Whitespace accepted before a leading closing tag. This is the ECMAScript
// `\s` set: it has U+FEFF but not U+0085, unlike `char::is_whitespace`.
fn is_leading_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{B}'
            | '\u{C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}
