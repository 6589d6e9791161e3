/**
 * Board Event Stream
 *
 * Reads the Server-Sent Events stream of `GET /api/board/events` and yields
 * the `BoardEnvelope` carried in each frame's `data` lines. Keep-alive
 * comments and frames without data are skipped.
 */
use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use crate::client::error::ClientError;
use crate::shared::event::BoardEnvelope;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// Live subscription to a board channel
pub struct BoardEventStream {
    inner: ByteStream,
    buffer: Vec<u8>,
}

impl BoardEventStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));
        Self {
            inner: Box::pin(inner),
            buffer: Vec::new(),
        }
    }

    /// Wait for the next event; `None` once the server closes the stream
    pub async fn next_envelope(&mut self) -> Option<Result<BoardEnvelope, ClientError>> {
        loop {
            while let Some(frame) = take_frame(&mut self.buffer) {
                if let Some(data) = frame_data(&frame) {
                    return Some(serde_json::from_str(&data).map_err(ClientError::from));
                }
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => push_chunk(&mut self.buffer, &chunk),
                Some(Err(err)) => return Some(Err(ClientError::Http(err))),
                None => return None,
            }
        }
    }
}

/// Append a chunk with CRLF line endings folded to LF
fn push_chunk(buffer: &mut Vec<u8>, chunk: &[u8]) {
    buffer.extend(chunk.iter().copied().filter(|&byte| byte != b'\r'));
}

/// Split one complete frame off the front of `buffer`
fn take_frame(buffer: &mut Vec<u8>) -> Option<String> {
    let end = buffer.windows(2).position(|window| window == b"\n\n")?;
    let frame: Vec<u8> = buffer.drain(..end + 2).collect();
    Some(String::from_utf8_lossy(&frame).into_owned())
}

/// Joined `data:` lines of a frame
fn frame_data(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
