//! Order Handlers

pub(crate) mod assign_driver;
pub(crate) mod create;
pub(crate) mod driver_stats;
pub(crate) mod drivers;
pub(crate) mod history;
pub(crate) mod index;
pub(crate) mod payment_status;
pub(crate) mod retry_payment;
pub(crate) mod sales;
pub(crate) mod unassign_driver;
pub(crate) mod unassigned;
pub(crate) mod update_payment_status;
pub(crate) mod update_status;
