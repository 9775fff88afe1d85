//! Non-blocking field checks for producer, property and period fields.
//!
//! None of these reject a value. Each returns an optional `ValidationWarning`
//! which the caller attaches to the record or row while keeping the input.

use shared::ValidationWarning;

use super::numeric::try_parse_locale_decimal;

/// Harvest seasons offered for agricultural and historical rows
pub const SEASON_PERIODS: [&str; 6] = [
    "2024 / 2025",
    "2025 / 2026",
    "2026 / 2027",
    "2027 / 2028",
    "2028 / 2029",
    "2029 / 2030",
];

/// Civil years offered for beef, dairy and diverse-crop rows
pub const CIVIL_YEARS: [&str; 7] = ["2024", "2025", "2026", "2027", "2028", "2029", "2030"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSet {
    Season,
    CivilYear,
}

impl PeriodSet {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            PeriodSet::Season => &SEASON_PERIODS,
            PeriodSet::CivilYear => &CIVIL_YEARS,
        }
    }

    pub fn contains(&self, period: &str) -> bool {
        self.options().contains(&period.trim())
    }
}

/// Flag a period outside the offered set. Empty periods are allowed.
pub fn check_period(field: &str, period: &str, set: PeriodSet) -> Option<ValidationWarning> {
    if period.trim().is_empty() || set.contains(period) {
        return None;
    }
    Some(ValidationWarning::new(
        field,
        format!("Período '{}' fora das opções: {}", period.trim(), set.options().join(", ")),
    ))
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// CPF (11 digits) or CNPJ (14 digits)
pub fn validate_document(field: &str, raw: &str) -> Option<ValidationWarning> {
    let digits = digits_only(raw);
    match digits.len() {
        0 | 11 | 14 => None,
        n if n < 11 => Some(ValidationWarning::new(field, "CPF incompleto. Use 000.000.000-00.")),
        n if n < 14 => Some(ValidationWarning::new(field, "CNPJ incompleto. Use 00.000.000/0000-00.")),
        _ => Some(ValidationWarning::new(
            field,
            "Documento deve conter 11 (CPF) ou 14 (CNPJ) dígitos.",
        )),
    }
}

pub fn validate_cnpj(field: &str, raw: &str) -> Option<ValidationWarning> {
    let digits = digits_only(raw);
    if digits.is_empty() || digits.len() == 14 {
        None
    } else {
        Some(ValidationWarning::new(field, "CNPJ incompleto. Use 00.000.000/0000-00."))
    }
}

/// Mobile phone: area code plus nine digits starting with 9
pub fn validate_phone(field: &str, raw: &str) -> Option<ValidationWarning> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    if digits.len() != 11 {
        return Some(ValidationWarning::new(field, "Telefone incompleto. Use (XX) 9 9999-9999."));
    }
    if digits.as_bytes()[2] != b'9' {
        return Some(ValidationWarning::new(field, "Falta o dígito 9 após o DDD."));
    }
    None
}

/// Land registry number ("matrícula")
pub fn validate_registration(field: &str, raw: &str) -> Option<ValidationWarning> {
    let digits = digits_only(raw);
    if digits.is_empty() || digits.len() == 13 {
        None
    } else {
        Some(ValidationWarning::new(
            field,
            "A matrícula deve conter exatamente 13 dígitos.",
        ))
    }
}

/// Person and place names: letters (accented included), spaces, hyphen and apostrophe
pub fn validate_name(field: &str, label: &str, raw: &str) -> Option<ValidationWarning> {
    let valid = raw
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '-' || c == '\'');
    if raw.trim().is_empty() || valid {
        None
    } else {
        Some(ValidationWarning::new(
            field,
            format!("{} deve conter apenas letras, espaços, hífen ou apóstrofo.", label),
        ))
    }
}

/// Locale formatted decimal that the normalizer cannot read
pub fn validate_decimal(field: &str, raw: &str) -> Option<ValidationWarning> {
    if raw.trim().is_empty() || try_parse_locale_decimal(raw).is_some() {
        None
    } else {
        Some(ValidationWarning::new(
            field,
            "Use apenas números e separador decimal vírgula (,). Ex.: 123,45",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_sets() {
        assert!(PeriodSet::Season.contains("2025 / 2026"));
        assert!(!PeriodSet::Season.contains("2025"));
        assert!(PeriodSet::CivilYear.contains(" 2030 "));
        assert!(!PeriodSet::CivilYear.contains("2031"));
    }

    #[test]
    fn test_check_period_allows_empty_and_flags_unknown() {
        assert!(check_period("period", "", PeriodSet::Season).is_none());
        assert!(check_period("period", "2024 / 2025", PeriodSet::Season).is_none());

        let warning = check_period("period", "2023", PeriodSet::CivilYear).unwrap();
        assert_eq!(warning.field, "period");
        assert!(warning.message.contains("2023"));
    }

    #[test]
    fn test_validate_document() {
        assert!(validate_document("document", "123.456.789-01").is_none());
        assert!(validate_document("document", "12.345.678/0001-90").is_none());
        assert!(validate_document("document", "").is_none());
        assert_eq!(
            validate_document("document", "123.456").unwrap().message,
            "CPF incompleto. Use 000.000.000-00."
        );
        assert!(validate_document("document", "1234567890123").is_some());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("phone", "(35) 9 9999-8888").is_none());
        assert_eq!(
            validate_phone("phone", "(35) 9999-8888").unwrap().message,
            "Telefone incompleto. Use (XX) 9 9999-9999."
        );
        assert_eq!(
            validate_phone("phone", "35899998888").unwrap().message,
            "Falta o dígito 9 após o DDD."
        );
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("registration", "1234567890123").is_none());
        assert!(validate_registration("registration", "12345").is_some());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Nome", "José D'Ávila-Souza").is_none());
        assert!(validate_name("name", "Nome", "Jo5é").is_some());
    }

    #[test]
    fn test_validate_decimal() {
        assert!(validate_decimal("total_area", "12,5").is_none());
        assert!(validate_decimal("total_area", "").is_none());
        assert!(validate_decimal("total_area", "doze").is_some());
    }
}
