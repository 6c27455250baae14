//! Cart Data

use crate::domain::products::records::ProductUuid;

/// Largest quantity a single cart line may hold, after merging.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}
