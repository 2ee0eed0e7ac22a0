//! Vector-index access: upsert embedded chunks into a Pinecone namespace.

pub mod error;
pub mod pinecone;
pub mod store;

pub use error::VectorError;
pub use pinecone::{IndexClient, NamespaceClient, PineconeClient, MAX_REQUEST_BYTES};
pub use store::{PineconeStore, VectorStore};
