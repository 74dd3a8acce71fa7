//! Quickbite food-ordering platform.
//!
//! Three services, each its own binary and database:
//! - catalog: restaurants and menus (CRUD + search)
//! - orders: order creation and status lifecycle; reads the catalog over HTTP
//! - delivery: delivery records and agents
//!
//! Order creation is the only cross-service flow: it snapshots catalog data,
//! prices the request in decimal arithmetic, and commits the order with its
//! items in a single transaction. Everything else is single-entity CRUD.

pub mod catalog;
pub mod delivery;
pub mod error;
pub mod orders;

#[cfg(test)]
pub(crate) mod testing;
