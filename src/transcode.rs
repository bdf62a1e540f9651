//! Streaming file normalization.
//!
//! A normalization pass reads the source file in fixed-size chunks, decodes
//! each chunk, rewrites line terminators, re-encodes to the target, and
//! writes to a temporary file beside the original. Only after the whole
//! stream succeeds is the temporary file fsynced and renamed over the
//! source, so a failure partway through never damages the original. Memory
//! use stays proportional to the chunk size, not the file size.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::SampleConfig;
use crate::encoding::codec::{StreamDecoder, StreamEncoder};
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::newline::Newline;
use crate::AnalysisResult;

/// Bytes read from the source per iteration.
const CHUNK_SIZE: usize = 32 * 1024;

/// Detect the file's encoding and line terminators, then rewrite it in
/// place to `target_encoding` and `target_newline`.
///
/// Returns what was detected, so callers can report the conversion that
/// actually happened.
pub fn normalize<P: AsRef<Path>>(
    path: P,
    target_encoding: Encoding,
    target_newline: Newline,
    config: &SampleConfig,
) -> Result<AnalysisResult> {
    let path = path.as_ref();
    let analysis = crate::analyze(path, config)?;
    debug!(
        source = %analysis.encoding,
        newlines = %analysis.newlines,
        target = %target_encoding,
        "normalizing"
    );
    normalize_with_source(path, analysis.encoding, target_encoding, target_newline)?;
    Ok(analysis)
}

/// Rewrite the file at `path` from a known `source_encoding` to
/// `target_encoding` and `target_newline`, skipping detection.
///
/// The declared source is trusted; bytes that don't conform to it are a
/// hard [`Error::Decode`], never silently replaced.
pub fn normalize_with_source<P: AsRef<Path>>(
    path: P,
    source_encoding: Encoding,
    target_encoding: Encoding,
    target_newline: Newline,
) -> Result<()> {
    let path = path.as_ref();
    let mut input = File::open(path)?;

    // The temp file must share the original's filesystem for the final
    // rename to stay atomic.
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(parent)?;
    let mut writer = BufWriter::new(tmp);

    writer.write_all(target_encoding.output_bom())?;

    let mut decoder = StreamDecoder::new(source_encoding);
    let mut encoder = StreamEncoder::new(target_encoding);
    let mut rewriter = NewlineRewriter::new(target_newline);

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut text = String::new();
    let mut rewritten = String::new();
    let mut encoded = Vec::new();

    loop {
        let read = input.read(&mut buf)?;
        let last = read == 0;

        text.clear();
        decoder.feed(&buf[..read], &mut text, last)?;

        rewritten.clear();
        rewriter.rewrite(&text, &mut rewritten);
        if last {
            rewriter.finish(&mut rewritten);
        }

        encoded.clear();
        encoder.feed(&rewritten, &mut encoded, last)?;
        writer.write_all(&encoded)?;

        if last {
            break;
        }
    }

    let tmp = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Rewrites line terminators in a decoded text stream.
///
/// A CR at the end of one chunk may be half of a CRLF whose LF arrives in
/// the next chunk, so it is held rather than emitted; `finish` flushes a
/// held CR at end of stream.
struct NewlineRewriter {
    target: &'static str,
    pending_cr: bool,
}

impl NewlineRewriter {
    fn new(target: Newline) -> NewlineRewriter {
        NewlineRewriter {
            target: target.as_str(),
            pending_cr: false,
        }
    }

    fn rewrite(&mut self, text: &str, out: &mut String) {
        out.reserve(text.len());
        for ch in text.chars() {
            match ch {
                '\r' => {
                    if self.pending_cr {
                        // Previous CR was a lone terminator.
                        out.push_str(self.target);
                    }
                    self.pending_cr = true;
                }
                '\n' => {
                    // Either the second half of a CRLF or a lone LF; one
                    // terminator either way.
                    self.pending_cr = false;
                    out.push_str(self.target);
                }
                other => {
                    if self.pending_cr {
                        out.push_str(self.target);
                        self.pending_cr = false;
                    }
                    out.push(other);
                }
            }
        }
    }

    fn finish(&mut self, out: &mut String) {
        if self.pending_cr {
            out.push_str(self.target);
            self.pending_cr = false;
        }
    }
}
