//! Value sets shared by several tables.

use crate::types::text_enum;

text_enum! {
    /// Soft on/off switch for accounts, providers and products.
    pub enum ActiveStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

impl Default for ActiveStatus {
    fn default() -> Self {
        ActiveStatus::Active
    }
}

text_enum! {
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}
