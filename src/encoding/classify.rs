//! Staged encoding classification.
//!
//! Cheap, high-confidence checks run first: BOM signatures, a UTF-16
//! null-byte probe for BOM-less wide text, strict ASCII, then strict UTF-8
//! validation of every sampled window. Only when all of those fail does the
//! scored legacy-candidate pass run, and a below-threshold best score falls
//! back to `cp1252` rather than reporting nothing.

use tracing::{debug, trace};

use super::bom::detect_bom;
use super::Encoding;
use crate::sample::Sample;

/// Minimum head length before the null-byte probe is trusted.
const UTF16_PROBE_MIN_LEN: usize = 32;
/// Score floor below which no legacy candidate is considered plausible.
const MIN_ACCEPT_SCORE: f32 = 1.02;

/// Legacy candidates in tie-break priority order. Earlier entries win equal
/// scores, so more widespread encodings come first. `euc_kr` and `gb2312`
/// are absent: their supersets `cp949` and `gbk` score for them.
const CANDIDATES: &[Encoding] = &[
    Encoding::Windows1252,
    Encoding::Windows1251,
    Encoding::Windows1250,
    Encoding::Windows1253,
    Encoding::Windows1254,
    Encoding::Windows1255,
    Encoding::Windows1256,
    Encoding::Koi8R,
    Encoding::Koi8U,
    Encoding::MacRoman,
    Encoding::MacCyrillic,
    Encoding::Cp949,
    Encoding::ShiftJis,
    Encoding::EucJp,
    Encoding::Gbk,
    Encoding::Big5,
];

/// Determine the most plausible encoding for a sample.
///
/// An empty sample classifies as UTF-8, the modern default for an empty
/// file. The result is always a registry entry; unrecognizable content
/// resolves to `cp1252`, which decodes every byte value that matters in
/// practice and so never turns normalization into a hard failure.
pub fn classify_encoding(sample: &Sample) -> Encoding {
    if sample.is_empty() {
        return Encoding::Utf8;
    }

    if let Some(head) = sample.head() {
        if let Some(matched) = detect_bom(&head.bytes) {
            debug!(encoding = %matched.encoding, "BOM signature");
            return matched.encoding;
        }
        if head.bytes.len() >= UTF16_PROBE_MIN_LEN {
            if let Some(wide) = detect_utf16_pattern(&head.bytes) {
                debug!(encoding = %wide, "UTF-16 null-byte pattern");
                return wide;
            }
        }
    }

    let bytes = sample.concat();
    if bytes.iter().all(|&b| b < 0x80) {
        return Encoding::Ascii;
    }

    if sample
        .windows
        .iter()
        .all(|w| window_is_valid_utf8(&w.bytes, !w.is_head()))
    {
        return Encoding::Utf8;
    }

    let (best, score) = score_candidates(&bytes);
    if score < MIN_ACCEPT_SCORE {
        debug!(score, "no plausible legacy candidate, falling back");
        return Encoding::Windows1252;
    }
    debug!(encoding = %best, score, "scored legacy candidate");
    best
}

/// Detect BOM-less UTF-16 by its tell-tale null-byte layout: mostly-ASCII
/// text in UTF-16 puts a zero in every other byte position.
fn detect_utf16_pattern(bytes: &[u8]) -> Option<Encoding> {
    let pairs = bytes.len() / 2;
    if pairs == 0 {
        return None;
    }

    let mut even_null = 0usize;
    let mut odd_null = 0usize;
    for (i, &b) in bytes[..pairs * 2].iter().enumerate() {
        if b == 0 {
            if i % 2 == 0 {
                even_null += 1;
            } else {
                odd_null += 1;
            }
        }
    }

    let even_ratio = even_null as f32 / pairs as f32;
    let odd_ratio = odd_null as f32 / pairs as f32;
    // One side saturated with nulls, the other nearly free of them.
    if odd_ratio > 0.85 && even_ratio < 0.4 {
        Some(Encoding::Utf16Le)
    } else if even_ratio > 0.85 && odd_ratio < 0.4 {
        Some(Encoding::Utf16Be)
    } else {
        None
    }
}

/// Strict UTF-8 validation of one sampled window.
///
/// A window may begin or end mid-sequence without the file being invalid:
/// interior windows tolerate up to three leading continuation bytes, and any
/// window tolerates a sequence truncated exactly at its end.
fn window_is_valid_utf8(bytes: &[u8], interior: bool) -> bool {
    let mut start = 0;
    if interior {
        while start < bytes.len() && start < 3 && bytes[start] & 0xC0 == 0x80 {
            start += 1;
        }
    }
    match std::str::from_utf8(&bytes[start..]) {
        Ok(_) => true,
        // error_len() of None means the sequence ran off the window end.
        Err(e) => e.error_len().is_none(),
    }
}

struct CharProfile {
    total: usize,
    replacement: usize,
    latin_ext: usize,
    latin_ext_lower: usize,
    cyrillic: usize,
    cyrillic_lower: usize,
    cyrillic_upper: usize,
    greek: usize,
    greek_lower: usize,
    hebrew: usize,
    arabic: usize,
    hangul: usize,
    han: usize,
    kana: usize,
    turkish: usize,
}

fn profile_chars(text: &str) -> CharProfile {
    let mut p = CharProfile {
        total: 0,
        replacement: 0,
        latin_ext: 0,
        latin_ext_lower: 0,
        cyrillic: 0,
        cyrillic_lower: 0,
        cyrillic_upper: 0,
        greek: 0,
        greek_lower: 0,
        hebrew: 0,
        arabic: 0,
        hangul: 0,
        han: 0,
        kana: 0,
        turkish: 0,
    };
    for ch in text.chars() {
        p.total += 1;
        let code = ch as u32;
        match code {
            0xFFFD => p.replacement += 1,
            0x00C0..=0x024F => {
                if code != 0x00D7 && code != 0x00F7 {
                    p.latin_ext += 1;
                    if ch.is_lowercase() {
                        p.latin_ext_lower += 1;
                    }
                }
            }
            0x0400..=0x052F => {
                p.cyrillic += 1;
                if ch.is_lowercase() {
                    p.cyrillic_lower += 1;
                } else if ch.is_uppercase() {
                    p.cyrillic_upper += 1;
                }
            }
            0x0370..=0x03FF => {
                p.greek += 1;
                if ch.is_lowercase() {
                    p.greek_lower += 1;
                }
            }
            0x0590..=0x05FF => p.hebrew += 1,
            0x0600..=0x06FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF => p.arabic += 1,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => p.hangul += 1,
            0x3400..=0x4DBF | 0x4E00..=0x9FFF => p.han += 1,
            0x3040..=0x30FF => p.kana += 1,
            _ => {}
        }
        if matches!(ch, 'ğ' | 'Ğ' | 'ı' | 'İ' | 'ş' | 'Ş') {
            p.turkish += 1;
        }
    }
    p
}

/// Decode with every legacy candidate and keep the best score. Comparison is
/// strictly-greater, so earlier `CANDIDATES` entries win ties.
fn score_candidates(bytes: &[u8]) -> (Encoding, f32) {
    let mut best = Encoding::Windows1252;
    let mut best_score = f32::MIN;
    for &candidate in CANDIDATES {
        let score = score_candidate(candidate, bytes);
        trace!(encoding = %candidate, score, "candidate scored");
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    (best, best_score)
}

/// Score one candidate against the sample bytes.
///
/// The base is 1.0 minus twice the replacement-character ratio of a lossy
/// decode, so a structurally wrong multi-byte decode collapses quickly. On
/// top of that a candidate earns up to ~0.55 for the share of decoded
/// characters landing in the script it exists to represent, with a case-
/// plausibility term: text decoding to all-uppercase letters of a cased
/// script is almost always the wrong sibling code page.
fn score_candidate(candidate: Encoding, bytes: &[u8]) -> f32 {
    let rs = match candidate.rs_encoding() {
        Some(rs) => rs,
        None => return f32::MIN,
    };
    let (decoded, _, _) = rs.decode(bytes);
    let p = profile_chars(&decoded);
    if p.total == 0 {
        return f32::MIN;
    }

    let total = p.total as f32;
    let base = (1.0 - 2.0 * p.replacement as f32 / total).max(0.0);

    // (in-script chars, of those the lowercase-or-caseless ones)
    let (hits, plausible) = match candidate {
        Encoding::Windows1252 | Encoding::Windows1250 | Encoding::Windows1254
        | Encoding::MacRoman => (p.latin_ext, p.latin_ext_lower),
        Encoding::Windows1251 | Encoding::Koi8R | Encoding::Koi8U | Encoding::MacCyrillic => {
            (p.cyrillic, p.cyrillic_lower)
        }
        Encoding::Windows1253 => (p.greek, p.greek_lower),
        Encoding::Windows1255 => (p.hebrew, p.hebrew),
        Encoding::Windows1256 => (p.arabic, p.arabic),
        Encoding::Cp949 => (p.hangul, p.hangul),
        Encoding::ShiftJis | Encoding::EucJp => (p.kana + p.han, p.kana + p.han),
        Encoding::Gbk | Encoding::Big5 => (p.han, p.han),
        _ => (0, 0),
    };
    let hit_ratio = hits as f32 / total;
    let plausible_share = if hits == 0 {
        0.0
    } else {
        plausible as f32 / hits as f32
    };
    let mut score = base + 0.4 * hit_ratio + 0.15 * hit_ratio * plausible_share;

    match candidate {
        Encoding::Windows1250 => {
            if has_cp1250_indicator_bytes(bytes) {
                score += 0.3;
            }
        }
        Encoding::Windows1254 => {
            if p.turkish >= 3 {
                score += 0.3;
            }
        }
        Encoding::Windows1251 => {
            // Real Russian text mixes cases; an all-lowercase Cyrillic
            // decode of a long sample usually means a caseless script read
            // through the wrong page.
            if p.cyrillic >= 20 && p.cyrillic_upper == 0 {
                score -= 0.05;
            }
        }
        Encoding::MacCyrillic => {
            score += mac_cyrillic_capital_bonus(bytes);
        }
        Encoding::ShiftJis | Encoding::EucJp => {
            // Kana is the Japanese-specific signal; Han alone could be
            // Chinese.
            score += 0.2 * (p.kana as f32 / total);
        }
        _ => {}
    }
    score
}

/// Bytes that exist in cp1250 but are undefined or vanishingly rare in its
/// Western sibling cp1252.
fn has_cp1250_indicator_bytes(bytes: &[u8]) -> bool {
    // Ť, Ž-variants, ť: undefined in cp1252, so one sighting is decisive.
    if bytes.iter().any(|b| matches!(b, 0x8D | 0x8F | 0x9D)) {
        return true;
    }
    // Ś, ś, ź: defined in cp1252 too, so demand repetition.
    let strong = bytes
        .iter()
        .filter(|b| matches!(b, 0x8C | 0x9C | 0x9F))
        .count();
    strong >= 2
}

/// In mac-cyrillic the capital letters А-П live at 0x80..=0x9F, a range
/// cp1251 reserves for punctuation. Their presence among the high bytes is
/// strong evidence for the Mac page.
fn mac_cyrillic_capital_bonus(bytes: &[u8]) -> f32 {
    let high = bytes.iter().filter(|&&b| b >= 0x80).count();
    if high == 0 {
        return 0.0;
    }
    let capitals = bytes.iter().filter(|&&b| (0x80..=0x9F).contains(&b)).count();
    (capitals as f32 / high as f32 * 2.0).min(0.2)
}
