//! Test harness for the pricing pipeline.
//!
//! Scripts mesh → STL bytes → parse → quote → store runs and checks each
//! stage with oracles instead of panicking.
//!
//! # Key Components
//!
//! - [`QuoteWorkflow`]: fluent builder driving one upload through the pipeline
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`helpers`]: error type and mesh math

pub mod helpers;
pub mod oracle;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use workflow::{QuoteWorkflow, WorkflowOutcome};
