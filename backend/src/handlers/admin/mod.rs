//! Administrator-only surface: dashboard metrics, system log browsing and
//! session control. Every route here sits behind the admin gate.

pub mod logs;
pub mod metrics;
pub mod sessions;

pub use logs::*;
pub use metrics::*;
pub use sessions::*;
