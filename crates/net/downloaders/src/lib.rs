#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! Implementations of various block download strategies.

mod headers;

pub use headers::{HeaderSequenceDownloader, HeaderSequenceDownloaderBuilder};
