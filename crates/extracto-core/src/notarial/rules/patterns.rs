//! Common regex patterns for Ecuadorian notarial extracts.
//!
//! All patterns run against uppercased text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Labelled sections. Group names identify the section kind.
    pub static ref SECTION_LABEL: Regex = Regex::new(
        r"(?x)
        (?:
            (?P<act>\bACTO(?:\s+O\s+CONTRATO|\s*/\s*CONTRATO)?\b)
          | (?P<grantors>\bOTORGAD[OA]S?\s+POR\b|\bOTORGANTES?\b|\bCOMPARECIENTES?\b)
          | (?P<beneficiaries>\bA\s+FAVOR\s+DE\b|\bBENEFICIARI[OA]S?\b)
          | (?P<notary>\bNOTAR[IÍ][OA]\b)
          | (?P<other>\bFECHA\b|\bUBICACI[OÓ]N\b|\bPROVINCIA\b|\bCANT[OÓ]N\b|\bPARROQUIA\b
              |\bDESCRIPCI[OÓ]N\b|\bCUANT[IÍ]A\b|\bOBSERVACIONES\b|\bOBJETO\b
              |\bEXTRACTO\b|\bESCRITURA\s+(?:N\s*[°º]|NO\b|N\.|NRO\b|N[UÚ]MERO\b))
        )
        (?P<colon>\s*:)?"
    ).unwrap();

    // One extract per "EXTRACTO N°" / "ESCRITURA N°" marker.
    pub static ref SEGMENT_MARKER: Regex = Regex::new(
        r"\b(?:EXTRACTO|ESCRITURA)\s+(?:N\s*[°º]|NO\b\.?|N\.|NRO\b\.?|N[UÚ]MERO\b)\s*:?"
    ).unwrap();

    // Table-row anchors
    pub static ref NATURAL_ROW: Regex = Regex::new(
        r"\bNATURAL\s+(.+?)\s+POR\s+SUS\s+PROPIOS"
    ).unwrap();

    pub static ref JURIDICAL_ROW: Regex = Regex::new(
        r"\bJUR[IÍ]DICA\s+(.+?)\s+(?:POR\s+SUS\s+PROPIOS|REPRESENTAD[OA]|RUC\b|\d{13})"
    ).unwrap();

    pub static ref BUSINESS_NAME: Regex = Regex::new(
        r"\bRAZ[OÓ]N\s+SOCIAL\s*:\s*(.+?)(?:\s+(?:RUC|REPRESENTAD[OA]|NOMBRES|APELLIDOS|C[EÉ]DULA|DOCUMENTO|NACIONALIDAD)\b|\s+\d|$)"
    ).unwrap();

    pub static ref SURNAMES_AND_NAMES: Regex = Regex::new(
        r"\bAPELLIDOS\s+Y\s+NOMBRES\s*:\s*(.+?)(?:\s+(?:C[EÉ]DULA|DOCUMENTO|NACIONALIDAD|RAZ[OÓ]N|APELLIDOS|RUC)\b|\s+\d|$)"
    ).unwrap();

    // Spatial table rows (terminators are looser than the text anchors)
    pub static ref TABLE_JURIDICAL_ROW: Regex = Regex::new(
        r"JUR[IÍ]DICA\s+(.+?)(?:\s+REPRESENTADO|\s+RUC|\s+\d{13}|$)"
    ).unwrap();

    pub static ref TABLE_NATURAL_ROW: Regex = Regex::new(
        r"NATURAL\s+(.+?)(?:\s+POR\s+SUS|\s+C[EÉ]DULA|\s+\d{10}|$)"
    ).unwrap();

    pub static ref ROW_NAME_TAIL: Regex = Regex::new(
        r"\s+(?:POR\s+SUS\s+PROPIOS|REPRESENTADO|RUC|C[EÉ]DULA).*$"
    ).unwrap();

    pub static ref PERSON_TYPE_PREFIX: Regex = Regex::new(
        r"^(?:PERSONA\s+)?(?:NATURAL|JUR[IÍ]DICA)\s+"
    ).unwrap();

    // Representation
    pub static ref REPRESENTED_BY: Regex = Regex::new(
        r"\b(?:REPRESENTAD[OA]S?\s+(?:LEGALMENTE\s+)?POR|REPRESENTANTE\s+LEGAL)\s*:?\s*(?:EL\s+|LA\s+)?(?:SE[ÑN]OR(?:A)?\s+|SR\.?\s+|SRA\.?\s+)?(.+?)(?:\s+(?:C[EÉ]DULA|RUC|NACIONALIDAD|EN\s+SU\s+CALIDAD|CON\s+C|POR\s+SUS|ECUATORIAN[OA]|MANDANTE|MANDATARI[OA]|NATURAL|JUR[IÍ]DICA|PERSONA|A\s+FAVOR)\b|\s+\d|[,;]|$)"
    ).unwrap();

    pub static ref NATURAL_ANCHOR: Regex = Regex::new(r"\bNATURAL\b").unwrap();

    pub static ref PERSON_TYPE_WORD: Regex = Regex::new(r"\b(?:NATURAL|JUR[IÍ]DICA)\b").unwrap();

    pub static ref NAME_LIST_SEPARATOR: Regex = Regex::new(r"\s+Y\s+|\s+E\s+|\s*[,;]\s*").unwrap();

    // Act type noise
    pub static ref DATE_NOISE: Regex = Regex::new(
        r"\b\d{1,2}\s*[/\-]\s*\d{1,2}\s*[/\-]\s*\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}\s+DE\s+(?:ENERO|FEBRERO|MARZO|ABRIL|MAYO|JUNIO|JULIO|AGOSTO|SEPTIEMBRE|SETIEMBRE|OCTUBRE|NOVIEMBRE|DICIEMBRE)\b"
    ).unwrap();

    pub static ref EMBEDDED_PERSON_TYPE: Regex = Regex::new(
        r"\bPERSONA\s+(?:NATURAL|JUR[IÍ]DICA)\b"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    pub static ref TOKEN: Regex = Regex::new(r"\S+").unwrap();

    // Compound act titles
    pub static ref NUMBERED_ITEM: Regex = Regex::new(r"(?:^|\s)\d{1,2}\s*[.)\-]\s+").unwrap();

    pub static ref TITLE_SEPARATOR: Regex = Regex::new(r"\s+Y/O\s+|\s+E\s+|\s*[,;]\s*").unwrap();

    pub static ref DANGLING_CONJUNCTION: Regex = Regex::new(r"^(?:Y/O|Y|E|O)\s+|\s+(?:Y/O|Y|E|O)$").unwrap();

    // Identity documents
    pub static ref RUC_NUMBER: Regex = Regex::new(r"\b(\d{13})\b").unwrap();

    pub static ref CEDULA_NUMBER: Regex = Regex::new(r"\b(\d{10})\b").unwrap();

    // Notary header
    pub static ref NOTARY_NAME_LABEL: Regex = Regex::new(
        r"\bNOTARI[OA](?:\s*\(\s*A\s*\))?(?:\s+SUPLENTE)?\s*:?"
    ).unwrap();

    pub static ref NOTARY_OFFICE: Regex = Regex::new(
        r"\bNOTAR[IÍ]A\b(?:\s+P[UÚ]BLICA)?\s*"
    ).unwrap();

    pub static ref OFFICE_NUMBER: Regex = Regex::new(
        r"^(?:N[°ºO]?\.?\s*|NRO\.?\s*|N[UÚ]MERO\s*)?(\d{1,3})\b"
    ).unwrap();

    pub static ref ALTERNATE_NOTARY: Regex = Regex::new(r"\bSUPLENTE\b").unwrap();

    pub static ref HEADER_MARKER: Regex = Regex::new(r"NOTARIO\s*\(\s*A\s*\)").unwrap();

    // Classification keywords
    pub static ref PERSON_NATURAL_KEYWORD: Regex = Regex::new(r"PERSONA\s+NATURAL").unwrap();

    pub static ref PERSON_JURIDICAL_KEYWORD: Regex = Regex::new(r"PERSONA\s+JUR[IÍ]DICA|JURIDICA").unwrap();
}

/// Act-type noise markers; the act label ends before the first one.
pub const ACT_TYPE_CUT_MARKERS: &[&str] = &[
    " FECHA",
    " OTORGANTE",
    " OTORGADO",
    " OTORGADA",
    " A FAVOR",
    " PERSONA ",
    " UBICACI",
    " PROVINCIA",
    " CANTON",
    " CANTÓN",
    " PARROQUIA",
    " DESCRIP",
    " CUANT",
    " DOCUMENTO",
    " EXTRACTO",
    " ESCRITURA N",
    " NOTARIO",
    " NOTARIA ",
    " NOTARÍA",
    " OBJETO",
];

/// Spatial table markers.
pub const TABLE_MARKERS: &[&str] = &[
    "OTORGANTES",
    "OTORGADO POR",
    "A FAVOR DE",
    "BENEFICIARIO",
    "PERSONA",
    "NOMBRES/RAZÓN SOCIAL",
    "NOMBRES / RAZÓN SOCIAL",
];

/// Words that mark a spatial table header row.
pub const TABLE_HEADER_WORDS: &[&str] = &[
    "PERSONA",
    "NOMBRES",
    "RAZÓN SOCIAL",
    "RAZON SOCIAL",
    "TIPO",
    "INTERVINIENTE",
    "DOCUMENTO",
    "IDENTIDAD",
    "NACIONALIDAD",
    "CALIDAD",
    "REPRESENTA",
    "OTORGADO POR",
    "A FAVOR DE",
];

/// Table cell words that never belong to a name.
pub const TABLE_COMMON_WORDS: &[&str] = &[
    "POR",
    "SUS",
    "PROPIOS",
    "DERECHOS",
    "REPRESENTADO",
    "CEDULA",
    "CÉDULA",
    "RUC",
    "ECUATORIANA",
    "ECUATORIANO",
    "MANDANTE",
    "MANDATARIO",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_label_kinds() {
        let caps = SECTION_LABEL.captures("OTORGADO POR: NATURAL").unwrap();
        assert!(caps.name("grantors").is_some());
        assert!(caps.name("colon").is_some());

        let caps = SECTION_LABEL.captures("A FAVOR DE NATURAL").unwrap();
        assert!(caps.name("beneficiaries").is_some());
        assert!(caps.name("colon").is_none());
    }

    #[test]
    fn test_segment_marker() {
        assert!(SEGMENT_MARKER.is_match("EXTRACTO N°: 20241701018P01234"));
        assert!(SEGMENT_MARKER.is_match("ESCRITURA NO. 123"));
        assert!(!SEGMENT_MARKER.is_match("EXTRACTOS VARIOS"));
        assert!(!SEGMENT_MARKER.is_match("EXTRACTO NOTARIAL"));
    }

    #[test]
    fn test_row_anchors() {
        let caps = NATURAL_ROW
            .captures("NATURAL PEREZ GOMEZ JUAN POR SUS PROPIOS DERECHOS")
            .unwrap();
        assert_eq!(&caps[1], "PEREZ GOMEZ JUAN");

        let caps = JURIDICAL_ROW
            .captures("JURIDICA COMERCIAL BOLIVAR S.A. POR SUS PROPIOS DERECHOS")
            .unwrap();
        assert_eq!(&caps[1], "COMERCIAL BOLIVAR S.A.");
    }

    #[test]
    fn test_date_noise() {
        assert!(DATE_NOISE.is_match("PODER 12/01/2024"));
        assert!(DATE_NOISE.is_match("PODER 5 DE MARZO DE 2024"));
        assert!(!DATE_NOISE.is_match("PODER GENERAL"));
    }
}
