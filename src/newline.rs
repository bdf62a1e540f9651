//! Line-terminator styles and classification.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::sample::Sample;

/// A line-terminator convention.
///
/// Terminator byte values are stable across every registry encoding's
/// ASCII-compatible range, so classification works on raw sample bytes
/// without decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    /// Line Feed, `\n`.
    Lf,
    /// Carriage Return + Line Feed, `\r\n`.
    Crlf,
    /// Carriage Return, `\r`.
    Cr,
}

impl Newline {
    /// The terminator as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::Crlf => "\r\n",
            Newline::Cr => "\r",
        }
    }

    /// The conventional label (`"LF"`, `"CRLF"`, `"CR"`).
    pub fn label(&self) -> &'static str {
        match self {
            Newline::Lf => "LF",
            Newline::Crlf => "CRLF",
            Newline::Cr => "CR",
        }
    }
}

impl fmt::Display for Newline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Newline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LF" => Ok(Newline::Lf),
            "CRLF" => Ok(Newline::Crlf),
            "CR" => Ok(Newline::Cr),
            _ => Err(Error::UnknownNewline(s.to_string())),
        }
    }
}

/// Determine the dominant line-terminator style in a sample.
///
/// Counts `\r\n`, lone `\n`, and lone `\r` occurrences across all windows.
/// The highest count wins; ties break `CRLF > LF > CR`. A sample with no
/// terminators at all classifies as `LF`.
///
/// NUL bytes are transparent to the scan: the wide UTF encodings pad each
/// terminator byte with zeros (`0D 00 0A 00` and friends), and no
/// byte-oriented text encoding produces NUL, so skipping them keeps CRLF
/// pairs intact in every case.
pub fn classify_newlines(sample: &Sample) -> Newline {
    let mut lf = 0u64;
    let mut crlf = 0u64;
    let mut cr = 0u64;

    for window in &sample.windows {
        let ends_at_eof = window.offset + window.bytes.len() as u64 == sample.file_size;
        let mut bytes = window
            .bytes
            .iter()
            .copied()
            .filter(|&b| b != 0)
            .peekable();
        while let Some(b) = bytes.next() {
            match b {
                b'\r' => match bytes.peek() {
                    Some(b'\n') => {
                        bytes.next();
                        crlf += 1;
                    }
                    Some(_) => cr += 1,
                    // A CR at the edge of an interior window may be half of
                    // a CRLF split by the window boundary, so it is not
                    // counted. At end of file there is no next byte; the CR
                    // is definitively lone.
                    None => {
                        if ends_at_eof {
                            cr += 1;
                        }
                    }
                },
                b'\n' => lf += 1,
                _ => {}
            }
        }
    }

    if crlf >= lf && crlf >= cr {
        if crlf == 0 {
            return Newline::Lf;
        }
        Newline::Crlf
    } else if lf >= cr {
        Newline::Lf
    } else {
        Newline::Cr
    }
}
