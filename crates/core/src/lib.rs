#![forbid(unsafe_code)]

pub mod grammar;
pub mod ids;
pub mod sidebar;
pub mod text;
