//! The fixed encoding registry.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub mod bom;
pub mod classify;
pub mod codec;

/// How a registry entry is recognized during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Identified by a fixed byte prefix (UTF-16/32 and BOM-marked UTF-8).
    BomSignature,
    /// Identified by strict sequence validation (UTF-8, ASCII).
    ValidityChecked,
    /// Scored by byte-value distribution against a single-byte code page.
    SingleByte,
    /// Scored by lead/trail-byte conformance of a multi-byte CJK page.
    MultiByteCjk,
}

/// A supported character encoding.
///
/// This is a closed registry: analysis only ever returns one of these, and
/// normalization only accepts one of these as source or target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Ascii,
    /// ISO-8859-1. Distinct from `Windows1252`, which additionally maps the
    /// 0x80..=0x9F range to printable characters.
    Latin1,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    Windows1254,
    Windows1255,
    Windows1256,
    Koi8R,
    Koi8U,
    MacRoman,
    MacCyrillic,
    /// Unified Hangul Code; superset of EUC-KR.
    Cp949,
    EucKr,
    ShiftJis,
    EucJp,
    Big5,
    Gbk,
    /// Decoded and encoded through the GBK table, which supersets it.
    Gb2312,
}

/// Every registry entry, in fixed priority order (more common entries
/// first). Used for label listings and exhaustiveness tests.
pub const REGISTRY: &[Encoding] = &[
    Encoding::Utf8,
    Encoding::Utf16Le,
    Encoding::Utf16Be,
    Encoding::Utf32Le,
    Encoding::Utf32Be,
    Encoding::Ascii,
    Encoding::Latin1,
    Encoding::Windows1250,
    Encoding::Windows1251,
    Encoding::Windows1252,
    Encoding::Windows1253,
    Encoding::Windows1254,
    Encoding::Windows1255,
    Encoding::Windows1256,
    Encoding::Koi8R,
    Encoding::Koi8U,
    Encoding::MacRoman,
    Encoding::MacCyrillic,
    Encoding::Cp949,
    Encoding::EucKr,
    Encoding::ShiftJis,
    Encoding::EucJp,
    Encoding::Big5,
    Encoding::Gbk,
    Encoding::Gb2312,
];

impl Encoding {
    /// The canonical identifier string for this entry.
    pub fn identifier(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf_8",
            Encoding::Utf16Le => "utf_16le",
            Encoding::Utf16Be => "utf_16be",
            Encoding::Utf32Le => "utf_32le",
            Encoding::Utf32Be => "utf_32be",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin_1",
            Encoding::Windows1250 => "cp1250",
            Encoding::Windows1251 => "cp1251",
            Encoding::Windows1252 => "cp1252",
            Encoding::Windows1253 => "cp1253",
            Encoding::Windows1254 => "cp1254",
            Encoding::Windows1255 => "cp1255",
            Encoding::Windows1256 => "cp1256",
            Encoding::Koi8R => "koi8_r",
            Encoding::Koi8U => "koi8_u",
            Encoding::MacRoman => "mac_roman",
            Encoding::MacCyrillic => "mac_cyrillic",
            Encoding::Cp949 => "cp949",
            Encoding::EucKr => "euc_kr",
            Encoding::ShiftJis => "shift_jis",
            Encoding::EucJp => "euc_jp",
            Encoding::Big5 => "big5",
            Encoding::Gbk => "gbk",
            Encoding::Gb2312 => "gb2312",
        }
    }

    /// The classification strategy tag for this entry.
    pub fn strategy(&self) -> Strategy {
        match self {
            Encoding::Utf16Le | Encoding::Utf16Be | Encoding::Utf32Le | Encoding::Utf32Be => {
                Strategy::BomSignature
            }
            Encoding::Utf8 | Encoding::Ascii => Strategy::ValidityChecked,
            Encoding::Cp949
            | Encoding::EucKr
            | Encoding::ShiftJis
            | Encoding::EucJp
            | Encoding::Big5
            | Encoding::Gbk
            | Encoding::Gb2312 => Strategy::MultiByteCjk,
            _ => Strategy::SingleByte,
        }
    }

    /// The `encoding_rs` codec backing this entry, when one exists.
    /// UTF-32, ASCII, and true ISO-8859-1 are handled by hand-rolled codecs.
    pub(crate) fn rs_encoding(&self) -> Option<&'static encoding_rs::Encoding> {
        match self {
            Encoding::Utf8 => Some(encoding_rs::UTF_8),
            Encoding::Utf16Le => Some(encoding_rs::UTF_16LE),
            Encoding::Utf16Be => Some(encoding_rs::UTF_16BE),
            Encoding::Windows1250 => Some(encoding_rs::WINDOWS_1250),
            Encoding::Windows1251 => Some(encoding_rs::WINDOWS_1251),
            Encoding::Windows1252 => Some(encoding_rs::WINDOWS_1252),
            Encoding::Windows1253 => Some(encoding_rs::WINDOWS_1253),
            Encoding::Windows1254 => Some(encoding_rs::WINDOWS_1254),
            Encoding::Windows1255 => Some(encoding_rs::WINDOWS_1255),
            Encoding::Windows1256 => Some(encoding_rs::WINDOWS_1256),
            Encoding::Koi8R => Some(encoding_rs::KOI8_R),
            Encoding::Koi8U => Some(encoding_rs::KOI8_U),
            Encoding::MacRoman => Some(encoding_rs::MACINTOSH),
            Encoding::MacCyrillic => Some(encoding_rs::X_MAC_CYRILLIC),
            Encoding::Cp949 | Encoding::EucKr => Some(encoding_rs::EUC_KR),
            Encoding::ShiftJis => Some(encoding_rs::SHIFT_JIS),
            Encoding::EucJp => Some(encoding_rs::EUC_JP),
            Encoding::Big5 => Some(encoding_rs::BIG5),
            Encoding::Gbk | Encoding::Gb2312 => Some(encoding_rs::GBK),
            Encoding::Utf32Le | Encoding::Utf32Be | Encoding::Ascii | Encoding::Latin1 => None,
        }
    }

    /// BOM bytes written when normalizing to this encoding. Only the wide
    /// encodings carry one; their byte order is otherwise unrecoverable.
    pub(crate) fn output_bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
            Encoding::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
            _ => &[],
        }
    }

    /// Look up a registry entry by label, accepting common aliases
    /// (`"UTF-8"`, `"windows-1252"`, `"latin1"`, ...).
    pub fn from_label(label: &str) -> Result<Encoding, Error> {
        let mut normalized = label.trim().to_ascii_lowercase().replace('-', "_");
        if let Some(rest) = normalized.strip_prefix("cp_") {
            normalized = format!("cp{}", rest);
        }
        let encoding = match normalized.as_str() {
            "utf_8" | "utf8" => Encoding::Utf8,
            "utf_16" | "utf16" | "utf_16le" | "utf_16_le" | "utf16le" => Encoding::Utf16Le,
            "utf_16be" | "utf_16_be" | "utf16be" => Encoding::Utf16Be,
            "utf_32" | "utf32" | "utf_32le" | "utf_32_le" | "utf32le" => Encoding::Utf32Le,
            "utf_32be" | "utf_32_be" | "utf32be" => Encoding::Utf32Be,
            "ascii" | "us_ascii" => Encoding::Ascii,
            "iso_8859_1" | "iso8859_1" | "latin_1" | "latin1" => Encoding::Latin1,
            "cp1250" | "windows_1250" => Encoding::Windows1250,
            "cp1251" | "windows_1251" => Encoding::Windows1251,
            "cp1252" | "windows_1252" => Encoding::Windows1252,
            "cp1253" | "windows_1253" => Encoding::Windows1253,
            "cp1254" | "windows_1254" => Encoding::Windows1254,
            "cp1255" | "windows_1255" => Encoding::Windows1255,
            "cp1256" | "windows_1256" => Encoding::Windows1256,
            "koi8_r" | "koi8r" => Encoding::Koi8R,
            "koi8_u" | "koi8u" => Encoding::Koi8U,
            "mac_roman" | "macintosh" | "macroman" => Encoding::MacRoman,
            "mac_cyrillic" | "x_mac_cyrillic" => Encoding::MacCyrillic,
            "cp949" | "windows_949" | "ms949" => Encoding::Cp949,
            "euc_kr" | "euckr" => Encoding::EucKr,
            "shift_jis" | "shift_jis_2004" | "sjis" | "cp932" => Encoding::ShiftJis,
            "euc_jp" | "eucjp" => Encoding::EucJp,
            "big5" | "big_5" => Encoding::Big5,
            "gbk" => Encoding::Gbk,
            "gb2312" | "gb_2312" => Encoding::Gb2312,
            _ => return Err(Error::UnknownEncoding(label.to_string())),
        };
        Ok(encoding)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::from_label(s)
    }
}
