//! Server-sent events decoding for streamed chat completions

use serde::Deserialize;

use super::client::LlmError;

/// One decoded completion chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    /// Incremental text, if the chunk carried any
    pub content: Option<String>,
    /// Finish reason reported on the final chunk
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: None,
        }
    }

    pub fn finished(reason: impl Into<String>) -> Self {
        Self {
            content: None,
            finish_reason: Some(reason.into()),
        }
    }

    /// Whether this chunk is the `stop` terminal signal
    pub fn is_stop(&self) -> bool {
        self.finish_reason.as_deref() == Some("stop")
    }
}

/// Event produced by the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    Chunk(StreamChunk),
    Done,
}

#[derive(Debug, Deserialize)]
struct ApiChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental SSE decoder
///
/// Network chunks can end anywhere, including inside a UTF-8 sequence, so
/// bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every event completed by them
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, LlmError> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = Self::decode_line(line.trim_end_matches(['\r', '\n']))? {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    self.buffer.clear();
                    break;
                }
            }
        }
        Ok(events)
    }

    /// Decode whatever is left once the byte stream has ended
    pub fn finish(&mut self) -> Result<Option<SseEvent>, LlmError> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        Self::decode_line(line.trim())
    }

    fn decode_line(line: &str) -> Result<Option<SseEvent>, LlmError> {
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            return Ok(Some(SseEvent::Done));
        }
        if data.is_empty() {
            return Ok(None);
        }

        let chunk: ApiChunk = serde_json::from_str(data)
            .map_err(|e| LlmError::Parse(format!("{}: {}", e, data)))?;

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(SseEvent::Chunk(StreamChunk {
            content: choice.delta.and_then(|d| d.content),
            finish_reason: choice.finish_reason,
        })))
    }
}
