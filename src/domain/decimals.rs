//! Amount precision check for user-entered swap amounts.

/// True when `amount` has no more fractional digits than `decimals`.
///
/// Amounts without a fractional part are always valid.
pub fn has_valid_decimals(amount: &str, decimals: u8) -> bool {
    match amount.trim().split_once('.') {
        Some((_, fraction)) => fraction.len() <= decimals as usize,
        None => true,
    }
}
