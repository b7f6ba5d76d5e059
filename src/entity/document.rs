//! CPF (Brazilian national identity document) validation
//!
//! A CPF is 9 base digits followed by 2 check digits, each computed with a
//! weighted sum modulo 11. Accepted shapes: `ddd.ddd.ddd-dd` or 11 plain
//! digits (separators optional).

use regex::Regex;
use std::sync::LazyLock;

static CPF_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{3}\.?\d{3}\.?\d{3}-?\d{2}$").expect("static CPF pattern compiles")
});

const BASE_LEN: usize = 9;
const FIRST_WEIGHT: u32 = 10;

/// Strip every non-digit character
pub fn clean(document: &str) -> String {
    document.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check whether `document` is a valid CPF
pub fn is_valid_cpf(document: &str) -> bool {
    if !CPF_SHAPE.is_match(document) {
        return false;
    }

    let digits: Vec<u32> = clean(document)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != BASE_LEN + 2 || all_equal(&digits) {
        return false;
    }

    let mut expected = digits[..BASE_LEN].to_vec();
    let first = check_digit(&expected, FIRST_WEIGHT);
    expected.push(first);
    let second = check_digit(&expected, FIRST_WEIGHT + 1);
    expected.push(second);

    expected == digits
}

/// Compute one check digit over `digits`, weights descending from
/// `weight` and wrapping back to 9 once they fall below 2.
pub fn check_digit(digits: &[u32], mut weight: u32) -> u32 {
    let mut sum = 0;
    for d in digits {
        sum += d * weight;
        weight -= 1;
        if weight < 2 {
            weight = 9;
        }
    }

    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn with_check_digits(base: &[u32]) -> String {
        let mut digits = base.to_vec();
        let first = check_digit(&digits, FIRST_WEIGHT);
        digits.push(first);
        let second = check_digit(&digits, FIRST_WEIGHT + 1);
        digits.push(second);
        digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect()
    }

    #[test]
    fn test_formatted_cpf() {
        assert!(is_valid_cpf("111.444.777-35"));
        assert!(!is_valid_cpf("111.444.777-36"));
    }

    #[test]
    fn test_plain_cpf() {
        assert!(is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf("52998224715"));
    }

    #[test]
    fn test_identical_digits_rejected() {
        for d in 0..=9 {
            let doc: String = std::iter::repeat_n(char::from_digit(d, 10).unwrap(), 11).collect();
            assert!(!is_valid_cpf(&doc), "{doc} must be rejected");
        }
    }

    #[test]
    fn test_bad_shapes_rejected() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("1114447773"));
        assert!(!is_valid_cpf("111444777355"));
        assert!(!is_valid_cpf("111a444b777-35"));
        assert!(!is_valid_cpf("111/444/777-35"));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("111.444.777-35"), "11144477735");
        assert_eq!(clean(" 12-3 "), "123");
    }

    proptest! {
        #[test]
        fn generated_cpf_validates(base in prop::collection::vec(0u32..10, 9)) {
            prop_assume!(!all_equal(&base));
            let doc = with_check_digits(&base);
            prop_assert!(is_valid_cpf(&doc));
        }

        #[test]
        fn altered_check_digit_fails(
            base in prop::collection::vec(0u32..10, 9),
            position in 9usize..11,
            delta in 1u32..10,
        ) {
            prop_assume!(!all_equal(&base));
            let mut digits: Vec<u32> = with_check_digits(&base)
                .chars()
                .map(|c| c.to_digit(10).unwrap())
                .collect();
            digits[position] = (digits[position] + delta) % 10;
            let doc: String = digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect();
            prop_assert!(!is_valid_cpf(&doc));
        }
    }
}
