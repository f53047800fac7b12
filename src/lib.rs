//! # cardcat
//!
//! Turns a card-scanner inventory export into a storefront product catalog.
//!
//! Inventory rows are parsed, planned into lookup-sized batches, resolved
//! against the card database, merged back with their stock facts, and
//! rendered as a product import file once every batch has resolved.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod inventory;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod telemetry;
