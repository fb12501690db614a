// src/common/cnpj.rs

use crate::common::error::AppError;

const WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

/// Remove a máscara e valida os dígitos verificadores.
/// Devolve o CNPJ só com os 14 dígitos.
pub fn normalize(raw: &str) -> Result<String, AppError> {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 14 {
        return Err(AppError::InvalidCnpj);
    }

    // "00000000000000", "11111111111111"... passam no cálculo mas não existem
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(AppError::InvalidCnpj);
    }

    let first = check_digit(&digits[..12], &WEIGHTS_FIRST);
    let second = check_digit(&digits[..13], &WEIGHTS_SECOND);

    if digits[12] != first || digits[13] != second {
        return Err(AppError::InvalidCnpj);
    }

    Ok(digits.iter().map(|d| char::from_digit(*d, 10).unwrap_or('0')).collect())
}

/// Formata 14 dígitos como 00.000.000/0000-00 (para PDF e CSV).
pub fn format(digits: &str) -> String {
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_masked_and_unmasked_input() {
        assert_eq!(normalize("11.222.333/0001-81").unwrap(), "11222333000181");
        assert_eq!(normalize("11222333000181").unwrap(), "11222333000181");
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(matches!(normalize("11.222.333/0001-82"), Err(AppError::InvalidCnpj)));
    }

    #[test]
    fn rejects_repeated_digits_and_wrong_length() {
        assert!(normalize("00.000.000/0000-00").is_err());
        assert!(normalize("1122233300018").is_err());
    }

    #[test]
    fn formats_with_mask() {
        assert_eq!(format("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format("123"), "123");
    }
}
