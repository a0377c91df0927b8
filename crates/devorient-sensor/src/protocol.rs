use crate::types::{lenient_angle, OrientationEvent, OrientationSample};
use serde::Deserialize;
use std::collections::VecDeque;
use thiserror::Error;

/// Longest line accepted before the parser gives up on it.
pub const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Line longer than {} bytes", MAX_LINE_LEN)]
    LineTooLong,
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
    #[error("Malformed orientation message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One line of the stream, tagged by the W3C event name.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    DeviceOrientation(OrientationSample),
    OrientationChange {
        #[serde(default, deserialize_with = "lenient_angle")]
        orientation: Option<f64>,
    },
}

impl From<WireMessage> for OrientationEvent {
    fn from(message: WireMessage) -> Self {
        match message {
            WireMessage::DeviceOrientation(sample) => OrientationEvent::DeviceOrientation(sample),
            WireMessage::OrientationChange { orientation } => {
                OrientationEvent::OrientationChange(orientation)
            }
        }
    }
}

/// Streaming parser for newline-delimited JSON orientation events.
///
/// Feed raw bytes via `push_data`, then drain parsed events via `next_event`.
pub struct LineParser {
    buffer: VecDeque<u8>,
    /// Dropping the remainder of an oversized line.
    discarding: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
            discarding: false,
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next event from the buffer.
    /// Returns `None` if no complete line is available yet.
    pub fn next_event(&mut self) -> Option<Result<OrientationEvent, ProtocolError>> {
        loop {
            let line = {
                let buf = self.buffer.make_contiguous();
                match buf.iter().position(|&b| b == b'\n') {
                    Some(end) => {
                        let line = buf[..end].to_vec();
                        self.buffer.drain(..=end);
                        line
                    }
                    None => {
                        if buf.len() > MAX_LINE_LEN {
                            self.buffer.clear();
                            if !self.discarding {
                                self.discarding = true;
                                return Some(Err(ProtocolError::LineTooLong));
                            }
                        }
                        return None;
                    }
                }
            };

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > MAX_LINE_LEN {
                return Some(Err(ProtocolError::LineTooLong));
            }

            match parse_line(&line) {
                Some(result) => return Some(result),
                None => continue,
            }
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one line. Blank lines yield `None`.
fn parse_line(line: &[u8]) -> Option<Result<OrientationEvent, ProtocolError>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(_) => return Some(Err(ProtocolError::InvalidUtf8)),
    };
    if text.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<WireMessage>(text)
            .map(OrientationEvent::from)
            .map_err(ProtocolError::from),
    )
}
