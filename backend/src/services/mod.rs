pub mod budget;
pub mod inventory;
pub mod session_store;
pub mod system_log;
