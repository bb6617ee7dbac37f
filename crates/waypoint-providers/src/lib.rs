//! waypoint-providers: HTTP backends for the Waypoint pipeline.
//!
//! - [`openai::OpenAiClient`] implements `Embedder` and `ModelInvoker`
//! - [`pinecone::PineconeSearch`] implements `SemanticSearch` by embedding the
//!   query and asking a Pinecone index for its nearest neighbours

mod http;
pub mod openai;
pub mod pinecone;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use pinecone::{PineconeConfig, PineconeIndex, PineconeSearch};
