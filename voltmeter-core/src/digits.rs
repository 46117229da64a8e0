//! Decimal digit extraction and rounding
//!
//! Cells are ordered most significant first: index 0 is the leftmost
//! display position.

/// Number of digit cells on the display module
pub const DIGITS: usize = 4;

/// One decimal digit (0..=9) per display cell
pub type DigitCells = [u8; DIGITS];

/// Split `value` into `N` decimal cells.
///
/// Digits are filled from the right. Anything that needs more than `N`
/// digits keeps only its `N` least significant ones; cells above the
/// magnitude of `value` stay 0.
pub fn extract_digits<const N: usize>(mut value: u32) -> [u8; N] {
    let mut cells = [0u8; N];
    for cell in cells.iter_mut().rev() {
        if value == 0 {
            break;
        }
        *cell = (value % 10) as u8;
        value /= 10;
    }
    cells
}

/// Drop the rightmost cell and round the rest when fewer than `N` digits
/// are shown.
///
/// Only one digit of precision is removed: the rightmost cell is cleared
/// and carries into its left neighbour when it exceeds 5. A carry out of
/// cell 0 is discarded. With `shown >= N` the cells are left untouched.
pub fn round_to_displayed_width<const N: usize>(cells: &mut [u8; N], shown: usize) {
    if shown >= N || N == 0 {
        return;
    }

    let last = N - 1;
    let mut carry = u8::from(cells[last] > 5);
    cells[last] = 0;

    for cell in cells[..last].iter_mut().rev() {
        let sum = *cell + carry;
        if sum > 9 {
            *cell = 0;
            carry = 1;
        } else {
            *cell = sum;
            carry = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_fills_from_right() {
        assert_eq!(extract_digits::<4>(0), [0, 0, 0, 0]);
        assert_eq!(extract_digits::<4>(7), [0, 0, 0, 7]);
        assert_eq!(extract_digits::<4>(305), [0, 3, 0, 5]);
        assert_eq!(extract_digits::<4>(2500), [2, 5, 0, 0]);
        assert_eq!(extract_digits::<4>(9999), [9, 9, 9, 9]);
    }

    #[test]
    fn test_extract_truncates_high_digits() {
        assert_eq!(extract_digits::<4>(12345), [2, 3, 4, 5]);
        assert_eq!(extract_digits::<4>(10000), [0, 0, 0, 0]);
        assert_eq!(extract_digits::<2>(987), [8, 7]);
    }

    #[test]
    fn test_extract_other_widths() {
        assert_eq!(extract_digits::<6>(4321), [0, 0, 4, 3, 2, 1]);
        assert_eq!(extract_digits::<1>(42), [2]);
    }

    #[test]
    fn test_round_carry_ripples_left() {
        let mut cells = [1, 2, 9, 6];
        round_to_displayed_width(&mut cells, 3);
        assert_eq!(cells, [1, 3, 0, 0]);
    }

    #[test]
    fn test_round_five_does_not_carry() {
        let mut cells = [4, 9, 9, 5];
        round_to_displayed_width(&mut cells, 3);
        assert_eq!(cells, [4, 9, 9, 0]);
    }

    #[test]
    fn test_round_carry_out_of_top_is_dropped() {
        let mut cells = [9, 9, 9, 9];
        round_to_displayed_width(&mut cells, 3);
        assert_eq!(cells, [0, 0, 0, 0]);
    }

    #[test]
    fn test_round_noop_when_all_shown() {
        let mut cells = [1, 2, 9, 6];
        round_to_displayed_width(&mut cells, 4);
        assert_eq!(cells, [1, 2, 9, 6]);
        round_to_displayed_width(&mut cells, 7);
        assert_eq!(cells, [1, 2, 9, 6]);
    }

    #[test]
    fn test_round_removes_one_digit_only() {
        // Two hidden digits still round on the rightmost cell alone
        let mut cells = [3, 4, 7, 7];
        round_to_displayed_width(&mut cells, 2);
        assert_eq!(cells, [3, 4, 8, 0]);
    }

    proptest! {
        #[test]
        fn prop_extract_reconstructs(v in 0u32..=9999) {
            let d = extract_digits::<4>(v);
            prop_assert!(d.iter().all(|&c| c <= 9));
            let back = d[0] as u32 * 1000 + d[1] as u32 * 100 + d[2] as u32 * 10 + d[3] as u32;
            prop_assert_eq!(back, v);
        }

        #[test]
        fn prop_extract_truncation_law(v in 10_000u32..=u32::MAX) {
            prop_assert_eq!(extract_digits::<4>(v), extract_digits::<4>(v % 10_000));
        }

        #[test]
        fn prop_round_without_carry_keeps_prefix(prefix in proptest::array::uniform3(0u8..=9), last in 0u8..=5) {
            let mut cells = [prefix[0], prefix[1], prefix[2], last];
            round_to_displayed_width(&mut cells, 3);
            prop_assert_eq!(cells, [prefix[0], prefix[1], prefix[2], 0]);
        }

        #[test]
        fn prop_rounded_cells_stay_decimal(v in 0u32..=9999, shown in 1usize..=4) {
            let mut cells = extract_digits::<4>(v);
            round_to_displayed_width(&mut cells, shown);
            prop_assert!(cells.iter().all(|&c| c <= 9));
        }
    }
}
