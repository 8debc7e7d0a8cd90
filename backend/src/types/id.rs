//! Typed ID wrappers for compile-time type safety.
//!
//! Every table uses a `BIGSERIAL` key; these newtypes keep a `ProjectId` from
//! being passed where a `PhaseId` is expected.

use std::fmt;
use std::str::FromStr;

macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            sqlx::Type,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(UserId, "Identifier of a user account.");
typed_id!(RoleId, "Identifier of a role.");
typed_id!(CategoryId, "Identifier of a project category.");
typed_id!(ProjectId, "Identifier of a project.");
typed_id!(PhaseId, "Identifier of a project phase.");
typed_id!(MilestoneId, "Identifier of a phase milestone.");
typed_id!(TaskId, "Identifier of a phase task.");
typed_id!(AssignmentId, "Identifier of a task/resource assignment.");
typed_id!(BudgetId, "Identifier of a project budget.");
typed_id!(ExpenseId, "Identifier of an expense.");
typed_id!(ResourceId, "Identifier of a project resource.");
typed_id!(ProviderId, "Identifier of a provider.");
typed_id!(ProductId, "Identifier of a catalogue product.");
typed_id!(MovementId, "Identifier of an inventory movement.");
typed_id!(TicketId, "Identifier of a support ticket.");
typed_id!(LogId, "Identifier of a system log entry.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_and_display() {
        let id: ProjectId = " 42 ".parse().unwrap();
        assert_eq!(id, ProjectId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<ProjectId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&UserId(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UserId(7));
    }
}
