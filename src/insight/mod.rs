//! Natural-language insight hand-off.
//!
//! Renders the metrics digest and, when enabled, asks an LLM to summarize it.

pub mod client;
pub mod digest;
pub mod epoch;

pub use client::{InsightClient, InsightConfig};
pub use digest::{render_digest, DigestOptions};
pub use epoch::{Epoch, EpochGuard, InsightOutcome};
