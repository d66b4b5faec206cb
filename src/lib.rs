#![forbid(unsafe_code)]
//! Shredding and reconstruction of nested data for the Apache Parquet format.
//!
//! This crate implements the columnar core of Parquet: the hybrid RLE/bit-packed
//! level codec, PLAIN and dictionary value encodings, the page codec, column
//! chunk writers and readers, and the Dremel algorithms that translate between
//! nested logical values and flat `(value, definition level, repetition level)`
//! streams.
//!
//! The Thrift metadata protocol and the file container (magic word, footer) are
//! external to this crate; metadata is exchanged through the structs in
//! [`metadata`] and page headers through the framing in [`page`].

pub mod column;
pub mod compression;
pub mod dremel;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod page;
pub mod read;
pub mod record;
pub mod schema;
pub mod statistics;
pub mod types;
pub mod write;

pub use fallible_streaming_iterator;
pub use fallible_streaming_iterator::FallibleStreamingIterator;

/// Default data page size target, in bytes.
pub const DEFAULT_DATA_PAGE_SIZE: usize = 1024 * 1024;
