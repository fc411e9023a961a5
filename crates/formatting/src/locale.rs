//! pt-BR number formatting: `.` groups thousands, `,` separates decimals.

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn join_parts(negative: bool, int_part: &str, frac_part: &str) -> String {
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Formats `value` rounded to `max_frac` decimals, dropping trailing zeros
/// beyond `min_frac`.
///
/// ```rust
/// use formatting::locale::format_decimal_pt_br;
///
/// assert_eq!(format_decimal_pt_br(1234567.891, 0, 2), "1.234.567,89");
/// assert_eq!(format_decimal_pt_br(10.0, 2, 2), "10,00");
/// ```
pub fn format_decimal_pt_br(value: f64, min_frac: usize, max_frac: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let max_frac = max_frac.max(min_frac);
    let rendered = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut frac_part = frac_part.to_string();
    while frac_part.len() > min_frac && frac_part.ends_with('0') {
        frac_part.pop();
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
    join_parts(value < 0.0 && !is_zero, int_part, &frac_part)
}

/// Formats an amount stored in minor units: `num / 10^digits` with exactly
/// `digits` decimals.
///
/// ```rust
/// use formatting::locale::to_precision_locale;
///
/// assert_eq!(to_precision_locale(123456, 2), "1.234,56");
/// ```
pub fn to_precision_locale(num: i64, digits: u32) -> String {
    let Some(divisor) = 10u128.checked_pow(digits) else {
        return num.to_string();
    };
    let abs = u128::from(num.unsigned_abs());
    let int_part = (abs / divisor).to_string();
    let frac_part = if digits == 0 {
        String::new()
    } else {
        format!("{:0width$}", abs % divisor, width = digits as usize)
    };
    join_parts(num < 0, &int_part, &frac_part)
}
