//! Input masks for Brazilian documents, phones and amounts.
//!
//! Every mask maps a missing or empty input to an empty string. Patterns
//! apply to the first match unless stated otherwise.

use std::sync::LazyLock;

use regex::Regex;

use crate::locale::format_decimal_pt_br;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new($pattern).expect("static regex is valid")
        });
    };
}

static_regex!(NON_DIGIT, r"[^0-9]");
static_regex!(WHITESPACE, r"\s");
static_regex!(NON_LETTER, r"[^a-zA-ZÀ-ü ]+");
static_regex!(NON_ALPHANUMERIC, r"[^a-zA-Z0-9 ]");

static_regex!(PHONE_AREA, r"([0-9]{2})([0-9])");
static_regex!(PHONE_PREFIX, r"([0-9]{5})([0-9])");
static_regex!(PHONE_OVERFLOW, r"(-[0-9]{4})([0-9]+?)");

static_regex!(CNPJ_ROOT, r"^([0-9]{2})([0-9])");
static_regex!(CNPJ_SECOND, r"^([0-9]{2})\.([0-9]{3})([0-9])");
static_regex!(CNPJ_BRANCH, r"\.([0-9]{3})([0-9])");
static_regex!(CNPJ_CHECK, r"([0-9]{4})([0-9])");
static_regex!(CNPJ_OVERFLOW, r"(-[0-9]{2})([0-9]+?)");

static_regex!(CEP, r"^([0-9]{5})([0-9])");
static_regex!(CENTS, r"([0-9]+?)([0-9]{2}$)");

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// `11987654321` → `(11) 98765-4321`.
pub fn mask_phone(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    let value = NON_DIGIT.replace_all(value, "");
    let value = PHONE_AREA.replace(&value, "(${1}) ${2}");
    let value = PHONE_PREFIX.replace(&value, "${1}-${2}");
    PHONE_OVERFLOW.replace(&value, "${1}").into_owned()
}

/// `12345678000195` → `12.345.678/0001-95`.
pub fn normalize_cnpj(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    let value = CNPJ_ROOT.replace(value, "${1}.${2}");
    let value = CNPJ_SECOND.replace(&value, "${1}.${2}.${3}");
    let value = CNPJ_BRANCH.replace(&value, ".${1}/${2}");
    let value = CNPJ_CHECK.replace(&value, "${1}-${2}");
    let value = CNPJ_OVERFLOW.replace(&value, "${1}");
    truncate(&value, 18)
}

/// `01310100` → `01310-100`.
pub fn normalize_cep(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    let value = NON_DIGIT.replace_all(value, "");
    let value = CEP.replace(&value, "${1}-${2}");
    truncate(&value, 9)
}

/// `1234.5` → `1.234,5 Kg`. Zero counts as missing.
pub fn normalize_weight(value: Option<f64>) -> String {
    match value {
        Some(value) if value != 0.0 && !value.is_nan() => {
            format!("{} Kg", format_decimal_pt_br(value, 0, 3))
        }
        _ => String::new(),
    }
}

/// `R$ 1.234,56` → `1234.56`.
pub fn remove_normalize_currency(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    let value = NON_DIGIT.replace_all(value, "");
    CENTS.replace(&value, "${1}.${2}").into_owned()
}

pub fn normalize_only_number(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    NON_DIGIT.replace_all(value, "").into_owned()
}

/// Keeps letters (accented included) and spaces.
pub fn normalize_only_string(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    NON_LETTER.replace_all(value, "").into_owned()
}

/// Invoice number: digits only, at most 9.
pub fn normalize_nf_number(value: Option<&str>) -> String {
    truncate(&normalize_only_number(value), 9)
}

pub fn remove_special_chars(value: Option<&str>) -> String {
    let Some(value) = non_empty(value) else {
        return String::new();
    };
    NON_ALPHANUMERIC.replace_all(value, "").into_owned()
}

pub fn unmask(value: &str) -> String {
    NON_DIGIT.replace_all(value, "").into_owned()
}

pub fn remove_whitespaces(value: &str) -> String {
    WHITESPACE.replace_all(value, "").into_owned()
}

/// Clamps the digits of `value` to a percentage in `0..=100`.
///
/// With `allow_decimal` the result has two decimals (`"50,00"`), otherwise
/// it is a plain integer (`"50"`).
pub fn normalize_percentage(value: &str, allow_decimal: bool) -> String {
    let digits = unmask(value);
    let number = if digits.is_empty() {
        0
    } else {
        digits.parse::<u64>().unwrap_or(u64::MAX)
    };
    let clamped = number.min(100);

    if allow_decimal {
        format!("{clamped},00")
    } else {
        clamped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_masks_progressively() {
        assert_eq!(mask_phone(Some("11987654321")), "(11) 98765-4321");
        assert_eq!(mask_phone(Some("(11) 98765-4321")), "(11) 98765-4321");
        assert_eq!(mask_phone(Some("119876543210")), "(11) 98765-4321");
        assert_eq!(mask_phone(Some("119")), "(11) 9");
        assert_eq!(mask_phone(Some("1")), "1");
        assert_eq!(mask_phone(None), "");
    }

    #[test]
    fn cnpj_masks_full_number() {
        assert_eq!(normalize_cnpj(Some("12345678000195")), "12.345.678/0001-95");
        assert_eq!(normalize_cnpj(Some("123456780001959")), "12.345.678/0001-95");
        assert_eq!(normalize_cnpj(Some("123")), "12.3");
        assert_eq!(normalize_cnpj(Some("")), "");
    }

    #[test]
    fn cep_masks_and_truncates() {
        assert_eq!(normalize_cep(Some("01310100")), "01310-100");
        assert_eq!(normalize_cep(Some("01310-1009")), "01310-100");
        assert_eq!(normalize_cep(Some("0131")), "0131");
    }

    #[test]
    fn weight_uses_pt_br_separators() {
        assert_eq!(normalize_weight(Some(1234.5)), "1.234,5 Kg");
        assert_eq!(normalize_weight(Some(12.0)), "12 Kg");
        assert_eq!(normalize_weight(Some(0.0)), "");
        assert_eq!(normalize_weight(None), "");
    }

    #[test]
    fn currency_back_to_decimal_point() {
        assert_eq!(remove_normalize_currency(Some("R$ 1.234,56")), "1234.56");
        assert_eq!(remove_normalize_currency(Some("0,05")), "0.05");
        assert_eq!(remove_normalize_currency(Some("12")), "12");
    }

    #[test]
    fn character_filters() {
        assert_eq!(normalize_only_number(Some("a1b2c3")), "123");
        assert_eq!(normalize_only_string(Some("São Paulo 123!")), "São Paulo ");
        assert_eq!(normalize_nf_number(Some("NF 0001234567890")), "000123456");
        assert_eq!(remove_special_chars(Some("a-b_c d!")), "abc d");
        assert_eq!(unmask("123.456.789-00"), "12345678900");
        assert_eq!(remove_whitespaces(" a b\tc\n"), "abc");
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(normalize_percentage("50", false), "50");
        assert_eq!(normalize_percentage("150", false), "100");
        assert_eq!(normalize_percentage("", false), "0");
        assert_eq!(normalize_percentage("007%", false), "7");
        assert_eq!(normalize_percentage("50", true), "50,00");
        assert_eq!(normalize_percentage("1000", true), "100,00");
        assert_eq!(normalize_percentage("", true), "0,00");
        assert_eq!(normalize_percentage("99999999999999999999999", false), "100");
    }
}
