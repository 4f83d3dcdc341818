mod provider;

pub use provider::{ByteReader, ByteStream, StorageProvider};
