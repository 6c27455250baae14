//! Driver Handlers
//!
//! Mounted behind the driver guard; every handler acts on the caller's own
//! deliveries.

pub(crate) mod deliveries;
pub(crate) mod stats;
pub(crate) mod update_availability;
pub(crate) mod update_delivery_status;
