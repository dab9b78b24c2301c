//! Database models and their operations.
//!
//! Every read or write that touches tenant-owned data takes the tenant id
//! as an explicit parameter; there are no unscoped queries.

pub mod buyer;
pub mod invoice;
pub mod invoice_item;
pub mod tenant;
pub mod user;
