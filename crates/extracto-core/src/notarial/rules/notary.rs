//! Notary header extraction and Spanish ordinal words.

use tracing::debug;

use super::normalizer::{collapse_whitespace, fold};
use super::patterns::{ALTERNATE_NOTARY, NOTARY_NAME_LABEL, NOTARY_OFFICE, OFFICE_NUMBER};
use crate::models::NotaryInfo;

/// Honorific tokens dropped from notary names.
const HONORIFICS: &[&str] = &[
    "DR", "DRA", "AB", "ABG", "LCDO", "LCDA", "MGS", "MSC", "MGTR", "ING", "SR", "SRA",
];

/// Words that end the notary name on its line.
const NAME_TERMINATORS: &[&str] = &[" NOTAR", " DEL CANT", " CANTON", " CANTÓN", " SUPLENTE", ","];

const UNIT_STEMS: &[(&str, u32)] = &[
    ("PRIMER", 1),
    ("SEGUND", 2),
    ("TERCER", 3),
    ("CUART", 4),
    ("QUINT", 5),
    ("SEXT", 6),
    ("SEPTIM", 7),
    ("SETIM", 7),
    ("OCTAV", 8),
    ("NOVEN", 9),
];

const TEEN_STEMS: &[(&str, u32)] = &[("UNDECIM", 11), ("DUODECIM", 12)];

const TENS_STEMS: &[(&str, u32)] = &[
    ("DECIM", 10),
    ("VIGESIM", 20),
    ("TRIGESIM", 30),
    ("CUADRAGESIM", 40),
    ("QUINCUAGESIM", 50),
];

const UNIT_WORDS: &[&str] = &[
    "PRIMERA", "SEGUNDA", "TERCERA", "CUARTA", "QUINTA", "SEXTA", "SÉPTIMA", "OCTAVA", "NOVENA",
];

const TENS_WORDS: &[&str] = &["DÉCIMA", "VIGÉSIMA", "TRIGÉSIMA", "CUADRAGÉSIMA", "QUINCUAGÉSIMA"];

/// Drop the gender vowel: PRIMERA/PRIMERO -> PRIMER.
fn stem(word: &str) -> &str {
    word.strip_suffix('A')
        .or_else(|| word.strip_suffix('O'))
        .unwrap_or(word)
}

fn lookup(table: &[(&str, u32)], stem: &str) -> Option<u32> {
    table.iter().find(|(s, _)| *s == stem).map(|(_, n)| *n)
}

/// Split fused forms such as DECIMOCTAVA into DECIM + OCTAV.
fn split_fused(word: &str) -> Option<(u32, u32)> {
    let stemmed = stem(word);
    for (prefix, tens) in TENS_STEMS {
        let Some(rest) = stemmed.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let unit = lookup(UNIT_STEMS, rest).or_else(|| {
            rest.strip_prefix('O')
                .or_else(|| rest.strip_prefix('A'))
                .and_then(|r| lookup(UNIT_STEMS, r))
        });
        if let Some(unit) = unit {
            return Some((*tens, unit));
        }
    }
    None
}

/// Convert Spanish ordinal words to a number (1-59).
///
/// Accepts accented or plain spelling, either gender, separated
/// ("DÉCIMA OCTAVA") or fused ("DECIMOCTAVA") compounds.
pub fn parse_ordinal(words: &str) -> Option<u32> {
    let folded = fold(words);
    let mut tens = None;
    let mut units = None;

    for word in folded.split_whitespace() {
        let stemmed = stem(word);
        if let Some(n) = lookup(TEEN_STEMS, stemmed) {
            if tens.is_some() || units.is_some() {
                return None;
            }
            tens = Some(n);
            units = Some(0);
        } else if let Some(n) = lookup(TENS_STEMS, stemmed) {
            if tens.is_some() || units.is_some() {
                return None;
            }
            tens = Some(n);
        } else if let Some(n) = lookup(UNIT_STEMS, stemmed) {
            if units.is_some() {
                return None;
            }
            units = Some(n);
        } else if let Some((t, u)) = split_fused(word) {
            if tens.is_some() || units.is_some() {
                return None;
            }
            tens = Some(t);
            units = Some(u);
        } else {
            return None;
        }
    }

    match (tens, units) {
        (None, None) => None,
        (t, u) => Some(t.unwrap_or(0) + u.unwrap_or(0)),
    }
}

/// Feminine ordinal words for 1-59 (e.g. 18 -> "DÉCIMA OCTAVA").
pub fn ordinal_words(number: u32) -> Option<String> {
    if number == 0 || number >= 60 {
        return None;
    }

    let tens = (number / 10) as usize;
    let units = (number % 10) as usize;
    let words = match (tens, units) {
        (0, u) => UNIT_WORDS[u - 1].to_string(),
        (t, 0) => TENS_WORDS[t - 1].to_string(),
        (t, u) => format!("{} {}", TENS_WORDS[t - 1], UNIT_WORDS[u - 1]),
    };
    Some(words)
}

/// Parse the notary name, district and alternate flag from a document header.
pub fn extract_notary_info(text: &str) -> NotaryInfo {
    let upper = text.to_uppercase();
    let mut info = NotaryInfo {
        is_alternate: ALTERNATE_NOTARY.is_match(&upper),
        ..NotaryInfo::default()
    };

    info.name = NOTARY_NAME_LABEL
        .find_iter(&upper)
        .find_map(|m| notary_name_after(&upper[m.end()..]));

    for m in NOTARY_OFFICE.find_iter(&upper) {
        if let Some((label, number)) = district_after(&upper[m.end()..]) {
            info.district_label = Some(label);
            info.district_number = Some(number);
            break;
        }
    }

    debug!(
        "Notary header: name={:?}, district={:?}, alternate={}",
        info.name, info.district_number, info.is_alternate
    );
    info
}

/// Name printed after a NOTARIO label, on the same line or the next one.
fn notary_name_after(rest: &str) -> Option<String> {
    let mut lines = rest.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;
    let line = if first.chars().all(|c| !c.is_alphabetic()) {
        lines.next()?
    } else {
        first
    };

    let mut cut = line.len();
    let padded = format!(" {}", line);
    for terminator in NAME_TERMINATORS {
        if let Some(pos) = padded.find(terminator) {
            cut = cut.min(pos);
        }
    }
    if let Some(pos) = line.find(|c: char| c.is_ascii_digit()) {
        cut = cut.min(pos);
    }
    let head = line.get(..cut).unwrap_or(line).replace("(A)", " ");

    let tokens: Vec<&str> = head
        .split_whitespace()
        .filter(|t| {
            let bare = fold(t.trim_matches(|c: char| matches!(c, '.' | ':' | '-')));
            !bare.is_empty() && !HONORIFICS.contains(&bare.as_str())
        })
        .map(|t| t.trim_matches(|c: char| matches!(c, ':' | '-' | ',')))
        .collect();

    if tokens.len() < 2 {
        return None;
    }
    // NOTARIA followed by an ordinal is the office, not a person.
    let lead = fold(tokens[0]);
    if parse_ordinal(&lead).is_some() || matches!(lead.as_str(), "PUBLICA" | "DEL" | "DE" | "N" | "NO") {
        return None;
    }

    Some(collapse_whitespace(&tokens.join(" ")))
}

/// District printed after NOTARÍA: digits or ordinal words.
fn district_after(rest: &str) -> Option<(String, u32)> {
    let line = rest.lines().next()?.trim();

    if let Some(caps) = OFFICE_NUMBER.captures(line) {
        let number: u32 = caps[1].parse().ok()?;
        return Some((ordinal_words(number)?, number));
    }

    let words: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .take_while(|w| !matches!(fold(w).as_str(), "DEL" | "DE" | "CANTON" | "EN"))
        .take(3)
        .collect();

    // Longest prefix that reads as an ordinal.
    (1..=words.len()).rev().find_map(|len| {
        let label = words[..len].join(" ");
        parse_ordinal(&label).map(|n| (label, n))
    })
}
