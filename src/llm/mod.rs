//! Chat completion API access
//!
//! One-shot completions for report editing and SSE-streamed completions
//! for query generation.

pub mod client;
pub mod stream;

pub use client::{
    ChatClient, ChatCompletionOptions, ChatCompletionResponse, ChatMessage, ChunkStream, LlmError,
};
pub use stream::{SseDecoder, SseEvent, StreamChunk};
