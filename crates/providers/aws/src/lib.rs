//! AWS provider implementation for skyforge.
//!
//! This crate contributes everything AWS-specific to the pipeline: the
//! [`AwsGenerator`] that maps a diagram graph into a domain architecture
//! (including the bounded fallback synthesis of default security groups and
//! launch templates), the enrichment pass that cross-links resources through
//! reserved metadata keys, the [`AwsMapper`] that turns ordered resources
//! into HCL blocks, the embedded inventory classification, and the two
//! default rule sets.

mod enrich;
mod generator;
mod inventory;
mod mappers;
mod rules;
mod synthesis;

pub use generator::AwsGenerator;
pub use inventory::default_inventory;
pub use mappers::AwsMapper;
pub use rules::default_rules;

/// The provider tag this crate registers under.
pub const PROVIDER: &str = "aws";
