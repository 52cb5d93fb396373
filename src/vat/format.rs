//! VAT number format validation (no network).

use std::fmt;

/// Error returned when a VAT number fails format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VatFormatError {
    /// The rejected input, as given.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for VatFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid VAT number '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for VatFormatError {}

fn digits(s: &[u8]) -> bool {
    !s.is_empty() && s.iter().all(u8::is_ascii_digit)
}

fn letter(c: u8) -> bool {
    c.is_ascii_uppercase()
}

fn letter_or_digit(c: u8) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

/// `(\d{2} ?){3}\d{2}`
fn danish(n: &[u8]) -> bool {
    let mut rest = n;
    for _ in 0..3 {
        if rest.len() < 2 || !digits(&rest[..2]) {
            return false;
        }
        rest = &rest[2..];
        if rest.first() == Some(&b' ') {
            rest = &rest[1..];
        }
    }
    rest.len() == 2 && digits(rest)
}

fn spanish(n: &[u8]) -> bool {
    if n.len() != 9 {
        return false;
    }
    let (first, middle, last) = (n[0], &n[1..8], n[8]);
    digits(middle)
        && ((letter(first) && letter(last))
            || (first.is_ascii_digit() && letter(last))
            || (letter(first) && last.is_ascii_digit()))
}

fn irish(n: &[u8]) -> bool {
    let seven_then_letters = (n.len() == 8 || n.len() == 9)
        && digits(&n[..7])
        && n[7..].iter().copied().all(letter);
    let mixed = n.len() == 8
        && n[0].is_ascii_digit()
        && letter(n[1])
        && digits(&n[2..7])
        && letter(n[7]);
    seven_then_letters || mixed
}

type VatValidator = fn(&[u8]) -> bool;

const PATTERNS: &[(&str, VatValidator)] = &[
    ("AT", |n| n.len() == 9 && n[0] == b'U' && n[1..].iter().copied().all(letter_or_digit)),
    ("BE", |n| n.len() == 10 && (n[0] == b'0' || n[0] == b'1') && digits(n)),
    ("BG", |n| (9..=10).contains(&n.len()) && digits(n)),
    ("CY", |n| n.len() == 9 && digits(&n[..8]) && letter(n[8])),
    ("CZ", |n| (8..=10).contains(&n.len()) && digits(n)),
    ("DE", |n| n.len() == 9 && digits(n)),
    ("DK", danish),
    ("EE", |n| n.len() == 9 && digits(n)),
    ("EL", |n| n.len() == 9 && digits(n)),
    ("ES", spanish),
    ("EU", |n| n.len() == 9 && digits(n)),
    ("FI", |n| n.len() == 8 && digits(n)),
    ("FR", |n| n.len() == 11 && n[..2].iter().copied().all(letter_or_digit) && digits(&n[2..])),
    ("GB", |n| {
        ((n.len() == 9 || n.len() == 12) && digits(n))
            || (n.len() == 5 && (n.starts_with(b"GD") || n.starts_with(b"HA")) && digits(&n[2..]))
    }),
    ("HR", |n| n.len() == 11 && digits(n)),
    ("HU", |n| n.len() == 8 && digits(n)),
    ("IE", irish),
    ("IT", |n| n.len() == 11 && digits(n)),
    ("LT", |n| (n.len() == 9 || n.len() == 12) && digits(n)),
    ("LU", |n| n.len() == 8 && digits(n)),
    ("LV", |n| n.len() == 11 && digits(n)),
    ("MT", |n| n.len() == 8 && digits(n)),
    ("NL", |n| n.len() == 12 && digits(&n[..9]) && n[9] == b'B' && digits(&n[10..])),
    ("PL", |n| n.len() == 10 && digits(n)),
    ("PT", |n| n.len() == 9 && digits(n)),
    ("RO", |n| (2..=10).contains(&n.len()) && digits(n)),
    ("SE", |n| n.len() == 12 && digits(n)),
    ("SI", |n| n.len() == 8 && digits(n)),
    ("SK", |n| n.len() == 10 && digits(n)),
    ("SM", |n| n.len() == 5 && digits(n)),
];

/// Validate a VAT number by format.
///
/// `country` is the VIES country code (`EL` for Greece, `EU` for the
/// non-Union OSS scheme) and `number` the part after the prefix. Both are
/// compared case-insensitively.
pub fn validate_vat_format(country: &str, number: &str) -> Result<(), VatFormatError> {
    let reject = |reason: String| VatFormatError {
        value: format!("{country}{number}"),
        reason,
    };

    if number.is_empty() {
        return Err(reject("number is empty".into()));
    }
    let country = country.trim().to_ascii_uppercase();
    let number = number.to_ascii_uppercase();

    let Some(&(_, validator)) = PATTERNS.iter().find(|(code, _)| *code == country) else {
        return Err(reject(format!("unsupported country code '{country}'")));
    };
    if validator(number.as_bytes()) {
        Ok(())
    } else {
        Err(reject(format!("invalid format for country {country}")))
    }
}

/// Normalize user input: trim, drop ` `, `.`, `-` and `_`, and upper-case.
/// With `remove_country` every occurrence of the country code is removed as
/// well.
pub fn sanitize_vat_number(country: &str, number: &str, remove_country: bool) -> String {
    let mut value = number.trim().to_ascii_uppercase();
    let country = country.trim().to_ascii_uppercase();
    if remove_country && !country.is_empty() {
        value = value.replace(&country, "");
    }
    value.retain(|c| !matches!(c, ' ' | '.' | '-' | '_'));
    value
}
