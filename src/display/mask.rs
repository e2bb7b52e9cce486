//! Product name masking
//!
//! Hides most of a product name in purchase listings. This is cosmetic only
//! and must not be relied on to protect anything.

use std::iter;

/// Character shown in place of hidden characters.
pub const MASK_CHAR: char = '*';

/// Characters left visible at the start of longer names.
pub const VISIBLE_PREFIX: usize = 3;

/// Upper bound on the number of mask characters.
pub const MAX_MASK_LEN: usize = 10;

/// Mask a product name for display.
///
/// Lengths are counted in characters, not bytes.
#[must_use]
pub fn mask_product_name(name: &str) -> String {
    let len = name.chars().count();

    if len <= 1 {
        return name.to_string();
    }

    if len <= VISIBLE_PREFIX {
        return name
            .chars()
            .take(len - 1)
            .chain(iter::once(MASK_CHAR))
            .collect();
    }

    let mask_len = (len - VISIBLE_PREFIX).min(MAX_MASK_LEN);

    name.chars()
        .take(VISIBLE_PREFIX)
        .chain(iter::repeat_n(MASK_CHAR, mask_len))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_unmasked() {
        assert_eq!(mask_product_name(""), "");
        assert_eq!(mask_product_name("A"), "A");
    }

    #[test]
    fn names_up_to_three_chars_hide_last_char() {
        assert_eq!(mask_product_name("AB"), "A*");
        assert_eq!(mask_product_name("ABC"), "AB*");
    }

    #[test]
    fn longer_names_keep_three_chars() {
        assert_eq!(mask_product_name("ABCD"), "ABC*");
        assert_eq!(mask_product_name("ABCDEFG"), "ABC****");
    }

    #[test]
    fn mask_is_capped() {
        assert_eq!(mask_product_name("ABCDEFGHIJKLMNO"), "ABC**********");
        assert_eq!(mask_product_name("ABCDEFGHIJKLM"), "ABC**********");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(mask_product_name("무선이어폰"), "무선이**");
        assert_eq!(mask_product_name("과자"), "과*");
    }
}
