//! Human facing order numbers.

use rand::Rng;

/// Attempts at finding an unused order number before giving up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

const LOWEST: u32 = 100_000;
const HIGHEST: u32 = 999_999;

/// Draw a random order number of the form `#123456`.
#[must_use]
pub fn generate_order_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{}", rng.gen_range(LOWEST..=HIGHEST))
}
