pub mod admin;
pub mod budget;
pub mod expense;
pub mod inventory;
pub mod milestone;
pub mod phase;
pub mod product;
pub mod project;
pub mod provider;
pub mod report;
pub mod resource;
pub mod role;
pub mod status;
pub mod system_log;
pub mod task;
pub mod ticket;
pub mod user;
