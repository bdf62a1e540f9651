//! Error taxonomy for analysis and normalization.

use std::io;

use thiserror::Error;

/// Errors surfaced by the sampling, classification, and transcoding paths.
///
/// Failures at the filesystem boundary are never retried internally, and a
/// mid-transcode failure always leaves the original file untouched (the
/// in-progress temporary destination is discarded).
#[derive(Debug, Error)]
pub enum Error {
    /// Open/read/write/rename failure at the filesystem boundary.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Sample-size parameters out of valid range; raised before any I/O.
    #[error("invalid sample configuration: {0}")]
    Config(String),

    /// An encoding label that is not in the registry.
    #[error("unknown encoding: {0:?}")]
    UnknownEncoding(String),

    /// A newline-style label that is not LF, CRLF, or CR.
    #[error("unknown newline style: {0:?}")]
    UnknownNewline(String),

    /// Source bytes invalid under the assumed source encoding.
    #[error("byte sequence near offset {offset} is not valid {encoding}")]
    Decode {
        encoding: &'static str,
        offset: u64,
    },

    /// A UTF-32 code unit was left incomplete at end of file. The other
    /// multi-byte codecs report an incomplete final sequence as [`Decode`]
    /// with an offset instead, since they cannot always tell truncation
    /// from plain invalid bytes.
    ///
    /// [`Decode`]: Error::Decode
    #[error("input ends with an incomplete {encoding} sequence")]
    TruncatedInput { encoding: &'static str },

    /// A decoded character has no representation in the target encoding.
    #[error("character {ch:?} cannot be represented in {encoding}")]
    Unmappable { ch: char, encoding: &'static str },
}

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
