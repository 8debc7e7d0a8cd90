//! Data access. One module per table family, free functions over `&PgPool`
//! (or a `&mut PgConnection` when the caller owns a transaction).

pub mod admin;
pub mod budget;
pub mod common;
pub mod expense;
pub mod inventory;
pub mod milestone;
pub mod phase;
pub mod product;
pub mod project;
pub mod provider;
pub mod report;
pub mod resource;
pub mod system_log;
pub mod task;
pub mod ticket;
pub mod user;
