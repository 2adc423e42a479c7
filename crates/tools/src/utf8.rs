/// Incremental UTF-8 decoding for byte chunks.
///
/// A multi-byte character split across two chunks is held back and completed
/// by the next chunk. Invalid sequences are replaced with U+FFFD so decoding
/// always makes progress.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    // Incomplete suffix of the previous chunk, at most 3 bytes.
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.carry.is_empty()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut text = String::with_capacity(bytes.len() + self.carry.len());
        self.decode_into(&mut text, bytes);
        text
    }

    pub fn decode_into(&mut self, text: &mut String, bytes: &[u8]) {
        let mut rest = bytes;
        if !self.carry.is_empty() {
            let needed = utf8_seq_len(self.carry[0]).saturating_sub(self.carry.len());
            let take = needed.min(rest.len());
            let mut head = std::mem::take(&mut self.carry);
            head.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            decode_lossy(text, &mut self.carry, &head);
        }
        if !rest.is_empty() {
            decode_lossy(text, &mut self.carry, rest);
        }
    }

    /// Flush a dangling incomplete sequence (lossy) at end of input.
    pub fn finish(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        let tail = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        Some(tail)
    }
}

fn utf8_seq_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_lossy(text: &mut String, carry: &mut Vec<u8>, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                text.push_str(s);
                return;
            }
            Err(e) => {
                let (valid, invalid) = bytes.split_at(e.valid_up_to());
                if let Ok(prefix) = std::str::from_utf8(valid) {
                    text.push_str(prefix);
                }
                match e.error_len() {
                    Some(len) => {
                        text.push('\u{FFFD}');
                        bytes = &invalid[len..];
                    }
                    None => {
                        carry.extend_from_slice(invalid);
                        return;
                    }
                }
            }
        }
    }
}
