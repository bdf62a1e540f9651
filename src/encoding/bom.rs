//! Byte-order-mark signatures.

use super::Encoding;

/// Result of BOM detection: the self-identified encoding and the prefix
/// length to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomMatch {
    pub encoding: Encoding,
    pub bom_length: usize,
}

/// Check the start of `bytes` against the fixed BOM signatures.
///
/// A match is authoritative. UTF-32 is checked before UTF-16 because the
/// UTF-32LE mark begins with the UTF-16LE one.
pub fn detect_bom(bytes: &[u8]) -> Option<BomMatch> {
    if bytes.len() >= 4 {
        if bytes[0] == 0xFF && bytes[1] == 0xFE && bytes[2] == 0x00 && bytes[3] == 0x00 {
            return Some(BomMatch {
                encoding: Encoding::Utf32Le,
                bom_length: 4,
            });
        }
        if bytes[0] == 0x00 && bytes[1] == 0x00 && bytes[2] == 0xFE && bytes[3] == 0xFF {
            return Some(BomMatch {
                encoding: Encoding::Utf32Be,
                bom_length: 4,
            });
        }
    }

    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return Some(BomMatch {
            encoding: Encoding::Utf8,
            bom_length: 3,
        });
    }

    if bytes.len() >= 2 {
        if bytes[0] == 0xFF && bytes[1] == 0xFE {
            return Some(BomMatch {
                encoding: Encoding::Utf16Le,
                bom_length: 2,
            });
        }
        if bytes[0] == 0xFE && bytes[1] == 0xFF {
            return Some(BomMatch {
                encoding: Encoding::Utf16Be,
                bom_length: 2,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_bom() {
        let result = detect_bom(b"\xEF\xBB\xBFhello").expect("bom");
        assert_eq!(result.encoding, Encoding::Utf8);
        assert_eq!(result.bom_length, 3);
    }

    #[test]
    fn test_utf16_boms() {
        assert_eq!(
            detect_bom(b"\xFF\xFEh\x00").expect("le").encoding,
            Encoding::Utf16Le
        );
        assert_eq!(
            detect_bom(b"\xFE\xFF\x00h").expect("be").encoding,
            Encoding::Utf16Be
        );
    }

    #[test]
    fn test_utf32_le_wins_over_utf16_le_prefix() {
        let result = detect_bom(b"\xFF\xFE\x00\x00h\x00\x00\x00").expect("bom");
        assert_eq!(result.encoding, Encoding::Utf32Le);
        assert_eq!(result.bom_length, 4);
    }

    #[test]
    fn test_utf32_be() {
        let result = detect_bom(b"\x00\x00\xFE\xFF\x00\x00\x00h").expect("bom");
        assert_eq!(result.encoding, Encoding::Utf32Be);
    }

    #[test]
    fn test_no_bom() {
        assert!(detect_bom(b"plain text").is_none());
        assert!(detect_bom(b"").is_none());
        assert!(detect_bom(b"\xFF").is_none());
    }
}
