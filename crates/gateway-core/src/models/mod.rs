//! Wire-level data types shared across the core: chat requests/responses,
//! streaming chunks, and the embedding/image request/response pairs.

pub mod request;
pub mod response;
pub mod stream;

pub use request::{ChatRequest, EmbeddingRequest, ImageRequest, Message};
pub use response::{ChatResponse, Choice, EmbeddingData, EmbeddingResponse, ImageData, ImageResponse, Usage};
pub use stream::{ChunkStream, DeltaChoice, MessageDelta, StreamChunk};
