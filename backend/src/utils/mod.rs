pub mod cookies;
pub mod password;

pub use password::*;
