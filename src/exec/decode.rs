// src/exec/decode.rs

//! Incremental decoding of pipe reads.

/// Substituted for a chunk that is not valid UTF-8.
pub const DECODE_ERROR_SENTINEL: &str = "decode error: output not valid UTF-8";

/// Per-stream decoder state.
///
/// A read may end in the middle of a multi-byte character or between the
/// `\r` and `\n` of a CRLF pair. Both are held back until the next read so
/// that neither a spurious decode error nor a doubled newline is produced.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
    pending_cr: bool,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw read. Returns the text to deliver, or `None` if
    /// everything was held back.
    ///
    /// Invalid UTF-8 anywhere in the chunk replaces the whole chunk with
    /// [`DECODE_ERROR_SENTINEL`]; the stream continues with the next read.
    pub fn push(&mut self, bytes: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(bytes);

        let text = match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let s = s.to_owned();
                self.pending.clear();
                s
            }
            Err(e) if e.error_len().is_none() => {
                // Incomplete sequence at the end: keep it for the next read.
                let tail = self.pending.split_off(e.valid_up_to());
                let head = std::mem::replace(&mut self.pending, tail);
                match String::from_utf8(head) {
                    Ok(s) => s,
                    Err(_) => return Some(self.sentinel()),
                }
            }
            Err(_) => {
                self.pending.clear();
                return Some(self.sentinel());
            }
        };

        self.emit(text)
    }

    /// Flush whatever is still held back at end-of-stream.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.pending.clear();
            return Some(self.sentinel());
        }
        if std::mem::take(&mut self.pending_cr) {
            return Some("\r".to_string());
        }
        None
    }

    fn emit(&mut self, text: String) -> Option<String> {
        let mut out = String::with_capacity(text.len() + 1);
        if std::mem::take(&mut self.pending_cr) {
            out.push('\r');
        }
        out.push_str(&text);

        if out.ends_with('\r') {
            out.pop();
            self.pending_cr = true;
        }

        if out.is_empty() { None } else { Some(out) }
    }

    fn sentinel(&mut self) -> String {
        let mut out = String::new();
        if std::mem::take(&mut self.pending_cr) {
            out.push('\r');
        }
        out.push_str(DECODE_ERROR_SENTINEL);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_passes_through() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(b"hello\n").as_deref(), Some("hello\n"));
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn multibyte_char_split_across_reads_is_reassembled() {
        let bytes = "ü ok".as_bytes();
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(&bytes[..1]), None);
        assert_eq!(d.push(&bytes[1..]).as_deref(), Some("ü ok"));
    }

    #[test]
    fn invalid_bytes_yield_sentinel_and_stream_continues() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(&[0xff, 0xfe, b'a']).as_deref(), Some(DECODE_ERROR_SENTINEL));
        assert_eq!(d.push(b"next").as_deref(), Some("next"));
    }

    #[test]
    fn truncated_sequence_at_eof_yields_sentinel() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(&[b'x', 0xe2, 0x82]).as_deref(), Some("x"));
        assert_eq!(d.finish().as_deref(), Some(DECODE_ERROR_SENTINEL));
    }

    #[test]
    fn crlf_split_across_reads_stays_one_pair() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(b"line1\r").as_deref(), Some("line1"));
        assert_eq!(d.push(b"\nline2").as_deref(), Some("\r\nline2"));
    }

    #[test]
    fn trailing_cr_is_flushed_at_eof() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.push(b"progress 50%\r").as_deref(), Some("progress 50%"));
        assert_eq!(d.finish().as_deref(), Some("\r"));
        assert_eq!(d.finish(), None);
    }
}
