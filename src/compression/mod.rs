//! Compression strategies for band strips and tiles

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::{CompressionFactory, COMPRESSION_NAMES};
pub use zstd::ZstdHandler;
