//! Translation of scanned numeric text into token payloads.

/// Folds `digits` in `radix` into an `i64`, wrapping on overflow.
///
/// Only called on text a scanner already matched, so non-digits cannot occur;
/// they would be skipped.
pub fn to_long(digits: &str, radix: u32) -> i64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0i64, |acc, digit| {
            acc.wrapping_mul(i64::from(radix))
                .wrapping_add(i64::from(digit))
        })
}

pub fn hex_to_long(text: &str) -> i64 {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    to_long(digits, 16)
}

pub fn oct_to_long(text: &str) -> i64 {
    to_long(text, 8)
}

pub fn dec_to_long(text: &str) -> i64 {
    to_long(text, 10)
}

/// Splits `1e+2` style text into significand and exponent. A `+` sign on
/// the exponent is dropped, a `-` kept.
pub fn split_scientific(text: &str) -> (String, String) {
    match text.find(['e', 'E']) {
        Some(index) => {
            let exponent = &text[index + 1..];
            let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
            (text[..index].to_string(), exponent.to_string())
        }
        None => (text.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radix_conversion() {
        assert_eq!(hex_to_long("0x1A"), 26);
        assert_eq!(hex_to_long("0XFf"), 255);
        assert_eq!(oct_to_long("017"), 15);
        assert_eq!(oct_to_long("0"), 0);
        assert_eq!(dec_to_long("109"), 109);
    }

    #[test]
    fn overflow_wraps() {
        assert_eq!(hex_to_long("0xFFFFFFFFFFFFFFFF"), -1);
    }

    #[test]
    fn scientific_parts() {
        assert_eq!(split_scientific("1E2"), ("1".into(), "2".into()));
        assert_eq!(split_scientific("1e+2"), ("1".into(), "2".into()));
        assert_eq!(split_scientific("10E-2"), ("10".into(), "-2".into()));
        assert_eq!(split_scientific("1.5e3"), ("1.5".into(), "3".into()));
    }
}
