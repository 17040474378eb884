//! Brazilian tax-identifier checksum validation.
//!
//! CPF (11 digits, individuals) and CNPJ (14 digits, companies) both carry
//! two check digits computed modulo 11. Formatting characters are ignored;
//! a malformed input is simply invalid, never an error.

/// Strip everything but decimal digits from a raw identifier.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn digits_of(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

/// Validate a CPF. Accepts formatted input (`529.982.247-25`); strings that
/// do not reduce to exactly 11 digits are invalid, as are the well-known
/// placeholder numbers made of a single repeated digit.
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 11 || all_same(&digits) {
        return false;
    }
    digits[9] == cpf_check_digit(&digits[..9], 10) && digits[10] == cpf_check_digit(&digits[..10], 11)
}

// Weighted sum with weights counting down from `first_weight` to 2, then
// (sum * 10) mod 11, clamping 10 to 0.
fn cpf_check_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let remainder = (sum * 10) % 11;
    if remainder > 9 {
        0
    } else {
        remainder
    }
}

/// Validate a CNPJ. Accepts formatted input (`11.222.333/0001-81`); strings
/// that do not reduce to exactly 14 digits are invalid, as are repeated
/// single-digit placeholders.
pub fn is_valid_cnpj(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 14 || all_same(&digits) {
        return false;
    }
    digits[12] == cnpj_check_digit(&digits[..12]) && digits[13] == cnpj_check_digit(&digits[..13])
}

// The CNPJ weighting walks the digits most-significant first with a position
// counter starting at `len - 7`, decrementing each step and wrapping back to
// 9 when it drops below 2. Kept in this counter form rather than a weight
// table so the wrap-around matches the registry algorithm exactly.
fn cnpj_check_digit(digits: &[u32]) -> u32 {
    let mut pos = digits.len() as u32 - 7;
    let mut sum = 0u32;
    for &digit in digits {
        sum += digit * pos;
        if pos <= 2 {
            pos = 9;
        } else {
            pos -= 1;
        }
    }
    let result = sum % 11;
    if result < 2 {
        0
    } else {
        11 - result
    }
}

/// Validate either document kind, dispatching on digit count.
pub fn is_valid_document(raw: &str) -> bool {
    match digits_of(raw).len() {
        11 => is_valid_cpf(raw),
        14 => is_valid_cnpj(raw),
        _ => false,
    }
}
