//! HCL block model, deterministic writer and IaC emitter for skyforge.
//!
//! The emitter has three layers: a [`MapperRegistry`] of per-provider
//! [`ResourceMapper`]s, a per-resource mapping loop that turns the ordered
//! resource sequence into [`Block`]s, and a writer that renders blocks into
//! byte-deterministic HCL text. Attributes and map keys render in sorted
//! order; traversal expressions ([`Value::Expr`]) stay unquoted.

mod block;
mod emitter;
mod error;
mod mapper;
mod sanitize;
mod writer;

pub use block::{Block, BlockKind, NestedBlock, Value};
pub use emitter::{Emitter, IacFile};
pub use error::{Error, Result};
pub use mapper::{MapperRegistry, ResourceMapper};
pub use sanitize::{parse_port_range, sanitize_bucket_name, tf_name};
pub use writer::render_blocks;
