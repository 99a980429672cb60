//! mg-core - Core library for Migration Guard
//!
//! This crate provides migration discovery, metadata header parsing, policy
//! and banned-pattern loading, and the per-file checks that gate versioned SQL
//! migrations before an external runner applies them.

pub mod error;
pub mod metadata;
pub mod migration;
pub mod patterns;
pub mod policy;
pub mod report;
pub mod validator;

pub use error::{CoreError, CoreResult};
pub use metadata::{MetadataHeader, MetadataValue};
pub use migration::{discover_migrations, MigrationFile};
pub use patterns::{BannedPattern, BannedPatternSet, BreakingFragment};
pub use policy::Policy;
pub use report::{EventLevel, RunOutcome, ValidationEvent, ValidationReport};
pub use validator::MigrationValidator;
