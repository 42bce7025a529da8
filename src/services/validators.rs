//! Input validators for payment requests.

use chrono::{Datelike, Utc};

use crate::error::{ErrorCode, ServiceError};

/// Validate a card number with the Luhn algorithm.
///
/// Non-digit characters are stripped before checking, so formatted input
/// ("4111 1111 1111 1111") passes through. The digit count must be 13-19.
pub fn validate_luhn(card_number: &str) -> Result<(), ServiceError> {
    let digits: Vec<u32> = card_number.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 13 || digits.len() > 19 {
        return Err(ServiceError::new(
            ErrorCode::InvalidCard,
            "invalid card number length: must be 13-19 digits",
        ));
    }

    let mut sum = 0;
    let mut is_second = false;

    for &digit in digits.iter().rev() {
        let mut digit = digit;
        if is_second {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        is_second = !is_second;
    }

    if sum % 10 != 0 {
        return Err(ServiceError::new(
            ErrorCode::InvalidCard,
            "invalid card number: failed Luhn check",
        ));
    }

    Ok(())
}

/// Validate CVV format: 3 or 4 digits, all numeric.
pub fn validate_cvv(cvv: &str) -> Result<(), ServiceError> {
    if cvv.len() < 3 || cvv.len() > 4 {
        return Err(ServiceError::new(
            ErrorCode::InvalidCvv,
            "invalid CVV: must be 3 or 4 digits",
        ));
    }

    if !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::new(
            ErrorCode::InvalidCvv,
            "invalid CVV: must contain only digits",
        ));
    }

    Ok(())
}

/// Check whether a card has expired.
///
/// A card is valid through the end of its expiry month: expiring 08/2026 is
/// accepted for all of August 2026 and rejected from September on.
pub fn validate_expiry(expiry_month: i32, expiry_year: i32) -> Result<(), ServiceError> {
    let now = Utc::now();
    expiry_is_valid(expiry_month, expiry_year, now.year(), now.month() as i32)
}

fn expiry_is_valid(
    expiry_month: i32,
    expiry_year: i32,
    current_year: i32,
    current_month: i32,
) -> Result<(), ServiceError> {
    if !(1..=12).contains(&expiry_month) {
        return Err(ServiceError::new(
            ErrorCode::CardExpired,
            "invalid month: must be between 1 and 12",
        ));
    }

    if expiry_year < current_year
        || (expiry_year == current_year && expiry_month < current_month)
    {
        return Err(ServiceError::new(
            ErrorCode::CardExpired,
            format!("card expired: {expiry_month:02}/{expiry_year}"),
        ));
    }

    Ok(())
}

/// Validate that an amount is strictly positive.
pub fn validate_amount(amount: i64) -> Result<(), ServiceError> {
    if amount <= 0 {
        return Err(ServiceError::new(
            ErrorCode::InvalidAmount,
            "invalid amount: must be greater than 0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luhn_accepts_known_good_numbers() {
        assert!(validate_luhn("4111111111111111").is_ok());
        assert!(validate_luhn("5555555555554444").is_ok());
        assert!(validate_luhn("5105105105105100").is_ok());
        // Formatting characters are ignored.
        assert!(validate_luhn("4111 1111 1111 1111").is_ok());
        assert!(validate_luhn("4111-1111-1111-1111").is_ok());
    }

    #[test]
    fn luhn_rejects_bad_checksum() {
        let err = validate_luhn("4111111111111112").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCard);
    }

    #[test]
    fn luhn_rejects_out_of_range_lengths() {
        // 12 and 20 digits are rejected regardless of checksum.
        assert!(validate_luhn("411111111111").is_err());
        assert!(validate_luhn("41111111111111111116").is_err());
        assert!(validate_luhn("").is_err());
        assert!(validate_luhn("not-a-card").is_err());
    }

    #[test]
    fn cvv_accepts_three_and_four_digits() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
    }

    #[test]
    fn cvv_rejects_bad_input() {
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12345").is_err());
        assert!(validate_cvv("12a").is_err());
        assert!(validate_cvv("").is_err());
    }

    #[test]
    fn expiry_current_month_is_valid() {
        assert!(expiry_is_valid(8, 2026, 2026, 8).is_ok());
    }

    #[test]
    fn expiry_previous_month_is_expired() {
        let err = expiry_is_valid(7, 2026, 2026, 8).unwrap_err();
        assert_eq!(err.code, ErrorCode::CardExpired);
    }

    #[test]
    fn expiry_previous_year_is_expired() {
        assert!(expiry_is_valid(12, 2025, 2026, 1).is_err());
    }

    #[test]
    fn expiry_future_is_valid() {
        assert!(expiry_is_valid(1, 2027, 2026, 12).is_ok());
        assert!(expiry_is_valid(9, 2026, 2026, 8).is_ok());
    }

    #[test]
    fn expiry_rejects_invalid_month() {
        assert!(expiry_is_valid(0, 2030, 2026, 8).is_err());
        assert!(expiry_is_valid(13, 2030, 2026, 8).is_err());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(10_000).is_ok());

        assert_eq!(
            validate_amount(0).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            validate_amount(-500).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
    }
}
