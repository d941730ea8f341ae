//! Client-side validators for identifiers, documents and durations
//!
//! These run before a record is submitted so obviously broken input never
//! reaches the backend. The backend remains authoritative.

/// Tolerance applied when checking that percentage shares total 100
const SHARE_TOLERANCE: f64 = 0.01;

/// ISRC: exactly 12 ASCII alphanumeric characters (case-insensitive)
pub fn is_valid_isrc(isrc: &str) -> bool {
    let isrc = isrc.trim();
    isrc.len() == 12 && isrc.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Keep only the digits of a formatted document (`529.982.247-25` → `52998224725`)
pub fn document_digits(doc: &str) -> Vec<u32> {
    doc.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Modulo-11 check digit shared by CPF and CNPJ
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        11 - rest
    }
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// CPF: 11 digits with two valid check digits; punctuation is ignored
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits = document_digits(cpf);
    if digits.len() != 11 || all_same(&digits) {
        return false;
    }

    let first = check_digit(&digits[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
    digits[9] == first && digits[10] == second
}

/// CNPJ: 14 digits with two valid check digits; punctuation is ignored
pub fn is_valid_cnpj(cnpj: &str) -> bool {
    let digits = document_digits(cnpj);
    if digits.len() != 14 || all_same(&digits) {
        return false;
    }

    let first = check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    digits[12] == first && digits[13] == second
}

/// CPF or CNPJ, chosen by digit count
pub fn is_valid_document(doc: &str) -> bool {
    match document_digits(doc).len() {
        11 => is_valid_cpf(doc),
        14 => is_valid_cnpj(doc),
        _ => false,
    }
}

/// Parse a duration and format it as `MM:SS`
///
/// Accepted inputs: `M:SS`, `MM:SS`, `M.SS`, `MM.SS` (seconds below 60) and a
/// bare number of seconds. Returns `None` for anything else.
pub fn normalize_duration(input: &str) -> Option<String> {
    let input = input.trim();

    let split = input.split_once(':').or_else(|| input.split_once('.'));
    let (minutes, seconds) = match split {
        Some((m, s)) => {
            let digits_only = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
            if m.len() > 2 || s.len() != 2 || !digits_only(m) || !digits_only(s) {
                return None;
            }
            let minutes: u32 = m.parse().ok()?;
            let seconds: u32 = s.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            (minutes, seconds)
        }
        None => {
            if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let total: u32 = input.parse().ok()?;
            (total / 60, total % 60)
        }
    };

    Some(format!("{:02}:{:02}", minutes, seconds))
}

/// True when the shares add up to 100 within a hundredth
pub fn shares_total_100(shares: &[f64]) -> bool {
    let total: f64 = shares.iter().sum();
    (total - 100.0).abs() < SHARE_TOLERANCE
}
