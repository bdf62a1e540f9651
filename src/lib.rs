//! Charset and line-terminator detection with bounded-memory file
//! normalization.
//!
//! The crate answers two questions about a file on disk, then acts on the
//! answers:
//!
//! - [`analyze`] samples the file and reports its most plausible character
//!   encoding and dominant line-terminator style, without ever loading the
//!   whole file.
//! - [`normalize`] rewrites the file in place to a requested encoding and
//!   terminator style, streaming through a temporary file that atomically
//!   replaces the original only on success.
//!
//! Detection is staged: BOM signatures and strict UTF-8/ASCII validation
//! settle the common cases outright, and only then does a scored pass over
//! legacy code pages run. The supported encodings form a closed registry
//! ([`Encoding`]); detection never reports anything outside it.
//!
//! ```no_run
//! use charnorm::{analyze, normalize, Encoding, Newline, SampleConfig};
//!
//! # fn main() -> charnorm::Result<()> {
//! let config = SampleConfig::default();
//! let report = analyze("notes.txt", &config)?;
//! println!("{} with {} endings", report.encoding, report.newlines);
//!
//! normalize("notes.txt", Encoding::Utf8, Newline::Lf, &config)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod newline;
pub mod sample;
pub mod transcode;

pub use config::SampleConfig;
pub use encoding::{Encoding, Strategy, REGISTRY};
pub use error::{Error, Result};
pub use newline::Newline;
pub use sample::{Sample, SampleWindow};
pub use transcode::{normalize, normalize_with_source};

use std::path::Path;

use tracing::debug;

/// What analysis concluded about a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisResult {
    /// The most plausible character encoding.
    pub encoding: Encoding,
    /// The dominant line-terminator style.
    pub newlines: Newline,
}

/// Sample the file at `path` and classify its encoding and line
/// terminators.
///
/// Reads at most the configured sample budget regardless of file size. The
/// file itself is never modified. An empty file reports UTF-8 with LF
/// terminators.
pub fn analyze<P: AsRef<Path>>(path: P, config: &SampleConfig) -> Result<AnalysisResult> {
    let sample = sample::sample(path.as_ref(), config)?;
    let encoding = encoding::classify::classify_encoding(&sample);
    let newlines = newline::classify_newlines(&sample);
    debug!(path = %path.as_ref().display(), %encoding, %newlines, "analyzed");
    Ok(AnalysisResult { encoding, newlines })
}
