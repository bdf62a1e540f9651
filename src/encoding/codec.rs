//! Streaming decoders and encoders for the registry.
//!
//! `encoding_rs` backs every entry it covers, driven in
//! `*_without_replacement` mode so malformed input and unmappable scalars
//! are hard errors. UTF-32 (both directions), UTF-16 encode, strict ASCII,
//! and true ISO-8859-1 are hand-rolled, since `encoding_rs` either lacks
//! them or folds them into a different code page.
//!
//! Both directions are incremental: a multi-byte sequence split across two
//! `feed` calls is carried inside the decoder state and completed on the
//! next call, never treated as invalid.

use encoding_rs::{DecoderResult, EncoderResult};

use super::Encoding;
use crate::error::{Error, Result};

enum DecodeFail {
    /// Invalid sequence, with its byte offset relative to this feed call.
    Malformed(usize),
    /// Bytes left over at end of input.
    Truncated,
}

/// Incremental decoder from a registry encoding to UTF-8 text.
pub struct StreamDecoder {
    encoding: Encoding,
    position: u64,
    inner: DecoderImpl,
}

enum DecoderImpl {
    Rs(encoding_rs::Decoder),
    Utf32(Utf32Decoder),
    Ascii,
    Latin1,
}

impl StreamDecoder {
    pub fn new(encoding: Encoding) -> StreamDecoder {
        let inner = match encoding {
            Encoding::Utf32Le => DecoderImpl::Utf32(Utf32Decoder::new(false)),
            Encoding::Utf32Be => DecoderImpl::Utf32(Utf32Decoder::new(true)),
            Encoding::Ascii => DecoderImpl::Ascii,
            Encoding::Latin1 => DecoderImpl::Latin1,
            other => {
                let rs = other
                    .rs_encoding()
                    .expect("all other registry entries are encoding_rs-backed");
                DecoderImpl::Rs(rs.new_decoder_with_bom_removal())
            }
        };
        StreamDecoder {
            encoding,
            position: 0,
            inner,
        }
    }

    /// Decode one chunk, appending to `dst`. Pass `last = true` on the
    /// final (possibly empty) chunk so incomplete carried sequences are
    /// reported instead of held.
    pub fn feed(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<()> {
        let outcome = match &mut self.inner {
            DecoderImpl::Rs(decoder) => decode_rs(decoder, src, dst, last),
            DecoderImpl::Utf32(decoder) => decoder.feed(src, dst, last),
            DecoderImpl::Ascii => decode_ascii(src, dst),
            DecoderImpl::Latin1 => {
                for &b in src {
                    dst.push(b as char);
                }
                Ok(())
            }
        };
        match outcome {
            Ok(()) => {
                self.position += src.len() as u64;
                Ok(())
            }
            Err(DecodeFail::Malformed(at)) => Err(Error::Decode {
                encoding: self.encoding.identifier(),
                offset: self.position + at as u64,
            }),
            Err(DecodeFail::Truncated) => Err(Error::TruncatedInput {
                encoding: self.encoding.identifier(),
            }),
        }
    }
}

fn decode_rs(
    decoder: &mut encoding_rs::Decoder,
    src: &[u8],
    dst: &mut String,
    last: bool,
) -> std::result::Result<(), DecodeFail> {
    let mut read_total = 0usize;
    loop {
        let remaining = &src[read_total..];
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(remaining.len())
            .unwrap_or(remaining.len() * 3 + 16);
        dst.reserve(needed);
        let (result, read) = decoder.decode_to_string_without_replacement(remaining, dst, last);
        read_total += read;
        match result {
            DecoderResult::InputEmpty => return Ok(()),
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(_, _) => return Err(DecodeFail::Malformed(read_total)),
        }
    }
}

fn decode_ascii(src: &[u8], dst: &mut String) -> std::result::Result<(), DecodeFail> {
    for (i, &b) in src.iter().enumerate() {
        if b >= 0x80 {
            return Err(DecodeFail::Malformed(i));
        }
        dst.push(b as char);
    }
    Ok(())
}

/// UTF-32 decoder with an explicit carry buffer for code units split across
/// chunk boundaries.
struct Utf32Decoder {
    big_endian: bool,
    carry: [u8; 4],
    carry_len: usize,
    at_start: bool,
}

impl Utf32Decoder {
    fn new(big_endian: bool) -> Utf32Decoder {
        Utf32Decoder {
            big_endian,
            carry: [0; 4],
            carry_len: 0,
            at_start: true,
        }
    }

    fn feed(
        &mut self,
        src: &[u8],
        dst: &mut String,
        last: bool,
    ) -> std::result::Result<(), DecodeFail> {
        let mut i = 0;

        while self.carry_len > 0 && i < src.len() {
            self.carry[self.carry_len] = src[i];
            self.carry_len += 1;
            i += 1;
            if self.carry_len == 4 {
                let unit = self.unit(self.carry);
                self.carry_len = 0;
                self.push_unit(unit, dst).map_err(|_| DecodeFail::Malformed(i))?;
            }
        }

        while i + 4 <= src.len() {
            let unit = self.unit([src[i], src[i + 1], src[i + 2], src[i + 3]]);
            self.push_unit(unit, dst).map_err(|_| DecodeFail::Malformed(i))?;
            i += 4;
        }

        while i < src.len() {
            self.carry[self.carry_len] = src[i];
            self.carry_len += 1;
            i += 1;
        }

        if last && self.carry_len > 0 {
            return Err(DecodeFail::Truncated);
        }
        Ok(())
    }

    fn unit(&self, bytes: [u8; 4]) -> u32 {
        if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }

    fn push_unit(&mut self, unit: u32, dst: &mut String) -> std::result::Result<(), ()> {
        let first = self.at_start;
        self.at_start = false;
        if first && unit == 0xFEFF {
            // BOM, already consumed by signature detection semantics.
            return Ok(());
        }
        match char::from_u32(unit) {
            Some(ch) => {
                dst.push(ch);
                Ok(())
            }
            None => Err(()),
        }
    }
}

/// Incremental encoder from UTF-8 text to a registry encoding.
pub struct StreamEncoder {
    encoding: Encoding,
    inner: EncoderImpl,
}

enum EncoderImpl {
    Utf8,
    Utf16 { big_endian: bool },
    Utf32 { big_endian: bool },
    Ascii,
    Latin1,
    Rs(encoding_rs::Encoder),
}

impl StreamEncoder {
    pub fn new(encoding: Encoding) -> StreamEncoder {
        let inner = match encoding {
            Encoding::Utf8 => EncoderImpl::Utf8,
            Encoding::Utf16Le => EncoderImpl::Utf16 { big_endian: false },
            Encoding::Utf16Be => EncoderImpl::Utf16 { big_endian: true },
            Encoding::Utf32Le => EncoderImpl::Utf32 { big_endian: false },
            Encoding::Utf32Be => EncoderImpl::Utf32 { big_endian: true },
            Encoding::Ascii => EncoderImpl::Ascii,
            Encoding::Latin1 => EncoderImpl::Latin1,
            other => {
                let rs = other
                    .rs_encoding()
                    .expect("all other registry entries are encoding_rs-backed");
                EncoderImpl::Rs(rs.new_encoder())
            }
        };
        StreamEncoder { encoding, inner }
    }

    /// Encode one chunk of text, appending bytes to `dst`.
    pub fn feed(&mut self, src: &str, dst: &mut Vec<u8>, last: bool) -> Result<()> {
        match &mut self.inner {
            EncoderImpl::Utf8 => {
                dst.extend_from_slice(src.as_bytes());
                Ok(())
            }
            EncoderImpl::Utf16 { big_endian } => {
                let big_endian = *big_endian;
                let mut units = [0u16; 2];
                for ch in src.chars() {
                    for &unit in ch.encode_utf16(&mut units).iter() {
                        if big_endian {
                            dst.extend_from_slice(&unit.to_be_bytes());
                        } else {
                            dst.extend_from_slice(&unit.to_le_bytes());
                        }
                    }
                }
                Ok(())
            }
            EncoderImpl::Utf32 { big_endian } => {
                let big_endian = *big_endian;
                for ch in src.chars() {
                    let unit = ch as u32;
                    if big_endian {
                        dst.extend_from_slice(&unit.to_be_bytes());
                    } else {
                        dst.extend_from_slice(&unit.to_le_bytes());
                    }
                }
                Ok(())
            }
            EncoderImpl::Ascii => {
                for ch in src.chars() {
                    if !ch.is_ascii() {
                        return Err(Error::Unmappable {
                            ch,
                            encoding: self.encoding.identifier(),
                        });
                    }
                    dst.push(ch as u8);
                }
                Ok(())
            }
            EncoderImpl::Latin1 => {
                for ch in src.chars() {
                    let code = ch as u32;
                    if code > 0xFF {
                        return Err(Error::Unmappable {
                            ch,
                            encoding: self.encoding.identifier(),
                        });
                    }
                    dst.push(code as u8);
                }
                Ok(())
            }
            EncoderImpl::Rs(encoder) => {
                let mut input = src;
                loop {
                    let needed = encoder
                        .max_buffer_length_from_utf8_without_replacement(input.len())
                        .unwrap_or(input.len() * 4 + 16);
                    dst.reserve(needed);
                    let (result, read) =
                        encoder.encode_from_utf8_to_vec_without_replacement(input, dst, last);
                    input = &input[read..];
                    match result {
                        EncoderResult::InputEmpty => return Ok(()),
                        EncoderResult::OutputFull => continue,
                        EncoderResult::Unmappable(ch) => {
                            return Err(Error::Unmappable {
                                ch,
                                encoding: self.encoding.identifier(),
                            });
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(encoding: Encoding, bytes: &[u8]) -> Result<String> {
        let mut decoder = StreamDecoder::new(encoding);
        let mut out = String::new();
        decoder.feed(bytes, &mut out, true)?;
        Ok(out)
    }

    fn encode_all(encoding: Encoding, text: &str) -> Result<Vec<u8>> {
        let mut encoder = StreamEncoder::new(encoding);
        let mut out = Vec::new();
        encoder.feed(text, &mut out, true)?;
        Ok(out)
    }

    #[test]
    fn test_shift_jis_decode() {
        // Shift_JIS for 日本語.
        let bytes: &[u8] = &[0x93, 0xFA, 0x96, 0x7B, 0x8C, 0xEA];
        assert_eq!(decode_all(Encoding::ShiftJis, bytes).expect("decode"), "日本語");
    }

    #[test]
    fn test_split_multibyte_sequence_is_carried() {
        // Split the second character of 日本語 across two feeds.
        let bytes: &[u8] = &[0x93, 0xFA, 0x96, 0x7B, 0x8C, 0xEA];
        let mut decoder = StreamDecoder::new(Encoding::ShiftJis);
        let mut out = String::new();
        decoder.feed(&bytes[..3], &mut out, false).expect("first chunk");
        decoder.feed(&bytes[3..], &mut out, true).expect("second chunk");
        assert_eq!(out, "日本語");
    }

    #[test]
    fn test_utf8_malformed_is_decode_error() {
        let err = decode_all(Encoding::Utf8, b"ok \xC3\x28 bad").expect_err("must fail");
        assert!(matches!(err, Error::Decode { encoding: "utf_8", .. }));
    }

    #[test]
    fn test_utf8_truncated_at_eof_is_rejected() {
        let mut decoder = StreamDecoder::new(Encoding::Utf8);
        let mut out = String::new();
        // A dangling lead byte is fine while more input may arrive...
        decoder.feed(b"caf\xC3", &mut out, false).expect("held");
        assert_eq!(out, "caf");
        // ...but at end of input it surfaces as a decode error, like any
        // other invalid sequence.
        assert!(matches!(
            decoder.feed(b"", &mut out, true),
            Err(Error::Decode { encoding: "utf_8", .. })
        ));
    }

    #[test]
    fn test_utf16le_encode_and_decode() {
        let bytes = encode_all(Encoding::Utf16Le, "héllo").expect("encode");
        assert_eq!(bytes, &[0x68, 0x00, 0xE9, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00]);
        assert_eq!(decode_all(Encoding::Utf16Le, &bytes).expect("decode"), "héllo");
    }

    #[test]
    fn test_utf16_surrogate_pair_encode() {
        let bytes = encode_all(Encoding::Utf16Be, "𝄞").expect("encode");
        assert_eq!(bytes, &[0xD8, 0x34, 0xDD, 0x1E]);
    }

    #[test]
    fn test_utf32_round_trip_with_split_unit() {
        let bytes = encode_all(Encoding::Utf32Le, "aé𝄞").expect("encode");
        assert_eq!(bytes.len(), 12);
        let mut decoder = StreamDecoder::new(Encoding::Utf32Le);
        let mut out = String::new();
        // Split mid code unit.
        decoder.feed(&bytes[..6], &mut out, false).expect("first");
        decoder.feed(&bytes[6..], &mut out, true).expect("second");
        assert_eq!(out, "aé𝄞");
    }

    #[test]
    fn test_utf32_trailing_bytes_are_truncation() {
        let err = decode_all(Encoding::Utf32Le, &[0x61, 0x00, 0x00, 0x00, 0x62])
            .expect_err("must fail");
        assert!(matches!(err, Error::TruncatedInput { encoding: "utf_32le" }));
    }

    #[test]
    fn test_utf32_invalid_scalar_is_decode_error() {
        // Surrogate code point.
        let err = decode_all(Encoding::Utf32Le, &[0x00, 0xD8, 0x00, 0x00]).expect_err("must fail");
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_ascii_is_strict_both_ways() {
        assert!(matches!(
            decode_all(Encoding::Ascii, b"caf\xE9"),
            Err(Error::Decode { encoding: "ascii", offset: 3 })
        ));
        assert!(matches!(
            encode_all(Encoding::Ascii, "café"),
            Err(Error::Unmappable { ch: 'é', .. })
        ));
        assert_eq!(encode_all(Encoding::Ascii, "cafe").expect("encode"), b"cafe");
    }

    #[test]
    fn test_latin1_maps_all_byte_values() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let text = decode_all(Encoding::Latin1, &bytes).expect("decode");
        assert_eq!(text.chars().count(), 256);
        assert_eq!(encode_all(Encoding::Latin1, &text).expect("encode"), bytes);
        assert!(matches!(
            encode_all(Encoding::Latin1, "€"),
            Err(Error::Unmappable { .. })
        ));
    }

    #[test]
    fn test_cp1252_encode() {
        assert_eq!(
            encode_all(Encoding::Windows1252, "café €").expect("encode"),
            &[0x63, 0x61, 0x66, 0xE9, 0x20, 0x80]
        );
    }

    #[test]
    fn test_unmappable_in_legacy_target() {
        assert!(matches!(
            encode_all(Encoding::Windows1251, "日"),
            Err(Error::Unmappable { ch: '日', encoding: "cp1251" })
        ));
    }

    #[test]
    fn test_source_bom_is_stripped_by_decoder() {
        let mut decoder = StreamDecoder::new(Encoding::Utf8);
        let mut out = String::new();
        decoder.feed(b"\xEF\xBB\xBFhi", &mut out, true).expect("decode");
        assert_eq!(out, "hi");

        let mut decoder = StreamDecoder::new(Encoding::Utf16Le);
        let mut out = String::new();
        decoder
            .feed(&[0xFF, 0xFE, 0x68, 0x00], &mut out, true)
            .expect("decode");
        assert_eq!(out, "h");

        let mut decoder = StreamDecoder::new(Encoding::Utf32Le);
        let mut out = String::new();
        decoder
            .feed(&[0xFF, 0xFE, 0x00, 0x00, 0x68, 0x00, 0x00, 0x00], &mut out, true)
            .expect("decode");
        assert_eq!(out, "h");
    }

    #[test]
    fn test_gb2312_uses_gbk_table() {
        let bytes = encode_all(Encoding::Gb2312, "你好").expect("encode");
        assert_eq!(decode_all(Encoding::Gbk, &bytes).expect("decode"), "你好");
    }
}
