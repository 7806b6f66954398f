//! Luhn (mod 10) check digits for order numbers.
//!
//! An order number is the payload digits followed by a single check digit. Anything that is not entirely ASCII
//! digits, or is shorter than two characters, is rejected.

/// Returns true if `number` is a well-formed order number with a correct trailing check digit.
pub fn validate(number: &str) -> bool {
    if number.len() < 2 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (payload, check) = number.split_at(number.len() - 1);
    let expected = check.as_bytes()[0] - b'0';
    checksum(payload) == Some(expected)
}

/// Calculates the check digit for the given payload. Returns `None` if the payload is empty or contains anything
/// other than ASCII digits.
pub fn checksum(payload: &str) -> Option<u8> {
    if payload.is_empty() {
        return None;
    }
    let mut sum = 0u32;
    for (i, b) in payload.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return None;
        }
        let mut digit = u32::from(b - b'0');
        // The digit next to the check digit is always doubled
        if i % 2 == 0 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(((sum * 9) % 10) as u8)
}

/// Appends the check digit to `payload`, producing a valid order number.
pub fn with_check_digit(payload: &str) -> Option<String> {
    checksum(payload).map(|d| format!("{payload}{d}"))
}
