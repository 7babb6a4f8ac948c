//! Incremental decoder for `text/event-stream` chat-completion responses.
//!
//! Bytes are buffered until a full line is available, so multi-byte UTF-8
//! characters split across network chunks decode correctly. Only `data:`
//! lines matter; comments (`: OPENROUTER PROCESSING`), `event:` and `id:`
//! lines are ignored. Frames whose JSON cannot be parsed are skipped with
//! a warning.

use super::protocol::StreamChunk;
use tracing::warn;

/// End-of-stream sentinel payload
pub const DONE_SENTINEL: &str = "[DONE]";

/// A decoded event-stream frame
#[derive(Debug, Clone)]
pub enum SseFrame {
    Chunk(StreamChunk),
    Done,
}

/// Line-buffered SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    skipped: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every complete frame in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = self.decode_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Decode whatever is left once the connection closed.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        self.decode_line(&rest).into_iter().collect()
    }

    /// Number of malformed frames skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\r', '\n']);

        let data = line.strip_prefix("data:")?.trim();
        if data.is_empty() {
            return None;
        }
        if data == DONE_SENTINEL {
            return Some(SseFrame::Done);
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => Some(SseFrame::Chunk(chunk)),
            Err(e) => {
                self.skipped += 1;
                warn!("Skipping malformed stream frame ({}): {}", e, data);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(frames: &[SseFrame]) -> Vec<String> {
        frames
            .iter()
            .filter_map(|f| match f {
                SseFrame::Chunk(c) => c.content().map(str::to_string),
                SseFrame::Done => None,
            })
            .collect()
    }

    #[test]
    fn test_decodes_frames_and_done() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(
            b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n\
              data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n\
              data: [DONE]\n\n",
        );
        assert_eq!(contents(&frames), ["Hel", "lo"]);
        assert!(matches!(frames.last(), Some(SseFrame::Done)));
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"choices\":[{\"index\":0,").is_empty());
        let frames = decoder.feed(b"\"delta\":{\"content\":\"ok\"}}]}\n");
        assert_eq!(contents(&frames), ["ok"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let line = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"한글\"}}]}\n";
        let bytes = line.as_bytes();
        // split inside the first Hangul syllable
        let split = line.find('한').unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let frames = decoder.feed(&bytes[split..]);
        assert_eq!(contents(&frames), ["한글"]);
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(
            b"data: {not json}\n\
              data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"after\"}}]}\n",
        );
        assert_eq!(contents(&frames), ["after"]);
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn test_ignores_comments_and_crlf() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(
            b": OPENROUTER PROCESSING\r\n\r\nevent: message\r\n\
              data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\r\n",
        );
        assert_eq!(contents(&frames), ["x"]);
        assert_eq!(decoder.skipped(), 0);
    }

    #[test]
    fn test_finish_decodes_trailing_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: [DONE]").is_empty());
        assert!(matches!(decoder.finish().as_slice(), [SseFrame::Done]));
    }
}
