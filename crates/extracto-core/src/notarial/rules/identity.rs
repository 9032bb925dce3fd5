//! Ecuadorian identity numbers: cédula (10 digits) and RUC (13 digits).

use super::patterns::{CEDULA_NUMBER, RUC_NUMBER};

/// Highest province code printed on a cédula.
const MAX_PROVINCE: u32 = 24;

/// Province code of Ecuadorians registered abroad.
const ABROAD_PROVINCE: u32 = 30;

fn digits_of(number: &str) -> Vec<u32> {
    number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect()
}

/// Validate a cédula with the modulo-10 algorithm.
///
/// Coefficients: 2, 1, 2, 1, 2, 1, 2, 1, 2 (products above 9 minus 9).
pub fn validate_cedula(cedula: &str) -> bool {
    let digits = digits_of(cedula);
    if digits.len() != 10 {
        return false;
    }

    let province = digits[0] * 10 + digits[1];
    if !(1..=MAX_PROVINCE).contains(&province) && province != ABROAD_PROVINCE {
        return false;
    }

    if digits[2] >= 6 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, d)| {
            let product = if i % 2 == 0 { d * 2 } else { *d };
            if product > 9 { product - 9 } else { product }
        })
        .sum();

    let check = (10 - sum % 10) % 10;
    check == digits[9]
}

/// Modulo-11 check used by company RUCs.
fn mod11_check(digits: &[u32], weights: &[u32]) -> Option<u32> {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match 11 - sum % 11 {
        11 => Some(0),
        10 => None,
        check => Some(check),
    }
}

/// Validate a RUC.
///
/// Natural persons: a valid cédula followed by `001`. Private companies
/// (third digit 9) and public entities (third digit 6) use modulo 11.
pub fn validate_ruc(ruc: &str) -> bool {
    let digits = digits_of(ruc);
    if digits.len() != 13 {
        return false;
    }

    let province = digits[0] * 10 + digits[1];
    if !(1..=MAX_PROVINCE).contains(&province) && province != ABROAD_PROVINCE {
        return false;
    }

    match digits[2] {
        0..=5 => {
            let cedula: String = ruc.chars().filter(|c| c.is_ascii_digit()).take(10).collect();
            digits[10..] == [0, 0, 1] && validate_cedula(&cedula)
        }
        9 => {
            digits[10..] == [0, 0, 1]
                && mod11_check(&digits[..9], &[4, 3, 2, 7, 6, 5, 4, 3, 2]) == Some(digits[9])
        }
        6 => {
            digits[9..] == [0, 0, 0, 1]
                && mod11_check(&digits[..8], &[3, 2, 7, 6, 5, 4, 3, 2]) == Some(digits[8])
        }
        _ => false,
    }
}

/// Whether a 10- or 13-digit number passes its checksum.
pub fn validate_document_number(number: &str) -> bool {
    match number.len() {
        10 => validate_cedula(number),
        13 => validate_ruc(number),
        _ => false,
    }
}

/// Extract a document number from a row of text, preferring a RUC over a cédula.
pub fn extract_document_number(text: &str) -> Option<String> {
    RUC_NUMBER
        .captures(text)
        .or_else(|| CEDULA_NUMBER.captures(text))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cedula_valid() {
        assert!(validate_cedula("1710034065"));
        assert!(validate_cedula("3010034068")); // Registered abroad
        assert!(validate_ruc("3010034068001"));
    }

    #[test]
    fn test_validate_cedula_province_range() {
        assert!(!validate_cedula("2510034065")); // Checksum fine, no province 25
        assert!(!validate_cedula("0010034065"));
    }

    #[test]
    fn test_validate_cedula_invalid() {
        assert!(!validate_cedula("1710034066")); // Bad check digit
        assert!(!validate_cedula("9910034065")); // Bad province
        assert!(!validate_cedula("171003406")); // Too short
        assert!(!validate_cedula("17100340650")); // Too long
    }

    #[test]
    fn test_validate_ruc() {
        assert!(validate_ruc("1710034065001")); // Natural person
        assert!(validate_ruc("1790012344001")); // Private company
        assert!(!validate_ruc("1710034065002"));
        assert!(!validate_ruc("1790012345001"));
    }

    #[test]
    fn test_extract_document_number_prefers_ruc() {
        let row = "JURIDICA ACME S.A. 1710034065 RUC 1790012344001";
        assert_eq!(extract_document_number(row).as_deref(), Some("1790012344001"));
        assert_eq!(
            extract_document_number("CEDULA 1710034065 ECUATORIANA").as_deref(),
            Some("1710034065")
        );
        assert_eq!(extract_document_number("SIN NUMERO"), None);
    }
}
