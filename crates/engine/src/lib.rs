#![forbid(unsafe_code)]

mod backend;
mod migrate;
mod rewrite;
mod service;

pub use backend::{TaskBackend, TaskRecord};
pub use migrate::{MigrationOutcome, migration_flag_key};
pub use rewrite::RewriteOutcome;
pub use service::{SidebarTag, TagIndexService};
