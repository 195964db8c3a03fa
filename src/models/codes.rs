use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static BATCH_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^WOOL-\d{8}-\d{3,4}$").expect("batch code pattern is valid"));

static FARM_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FARM-\d{4}-\d{4}$").expect("farm code pattern is valid"));

/// Uppercases and trims a caller-supplied batch code, rejecting malformed ones.
pub fn normalize_batch_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    BATCH_CODE_RE.is_match(&code).then_some(code)
}

/// `WOOL-YYYYMMDD-` prefix shared by all batches registered on `date`.
pub fn batch_code_prefix(date: NaiveDate) -> String {
    format!("WOOL-{}-", date.format("%Y%m%d"))
}

pub fn batch_code(date: NaiveDate, sequence: u32) -> String {
    format!("{}{:03}", batch_code_prefix(date), sequence)
}

pub fn is_farm_code(code: &str) -> bool {
    FARM_CODE_RE.is_match(code)
}

pub fn farm_code(year: i32, sequence: u32) -> String {
    format!("FARM-{}-{:04}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let code = batch_code(date, 12);
        assert_eq!(code, "WOOL-20240307-012");
        assert_eq!(normalize_batch_code(&code), Some(code.clone()));
        assert_eq!(batch_code(date, 1234), "WOOL-20240307-1234");
    }

    #[test]
    fn supplied_codes_are_uppercased() {
        assert_eq!(
            normalize_batch_code(" wool-20240101-001 ").as_deref(),
            Some("WOOL-20240101-001")
        );
        assert_eq!(normalize_batch_code("WOOL-2024-001"), None);
        assert_eq!(normalize_batch_code("WOOL-20240101-12345"), None);
    }

    #[test]
    fn farm_codes() {
        let code = farm_code(2024, 7);
        assert_eq!(code, "FARM-2024-0007");
        assert!(is_farm_code(&code));
        assert!(!is_farm_code("FARM-24-7"));
    }
}
