//! Constraint rule engine for skyforge architectures.
//!
//! Rules are a closed set of constraint families evaluated per resource
//! against an [`EvaluationContext`] built from the architecture. The
//! [`RuleRegistry`] merges code-defined defaults with data-driven override
//! records; the override key is the `(resource type, rule kind)` pair and a
//! later registration replaces an earlier one.
//!
//! Evaluation is collecting: every rule runs against every resource it
//! scopes, and validity is the conjunction of the results. Visual-only
//! resources are skipped.

mod context;
mod error;
mod eval;
mod records;
mod registry;
mod rule;

pub use context::EvaluationContext;
pub use error::{Error, Result};
pub use eval::{evaluate, RuleError, RuleEvaluation, Severity};
pub use records::{parse_records, ConstraintRecord};
pub use registry::RuleRegistry;
pub use rule::{Rule, RuleKind, RuleProfile};
