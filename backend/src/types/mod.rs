pub mod id;
pub mod text_enum;

pub use id::*;
pub(crate) use text_enum::text_enum;
