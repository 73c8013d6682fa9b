//! Schema migrations live in the `migrations` workspace member; this module
//! re-exports its migrator so db helpers and bins share one entry point.

pub use migrations::Migrator;
