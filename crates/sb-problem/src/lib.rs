//! # sb-problem
//!
//! Problem resolution for synbench: the synthetic-function collection, the
//! per-study parameter table, the simulated worker pool, reporter sinks, and
//! [`resolve_problem`], which assembles them into a [`ProblemDescriptor`].

pub mod functions;
pub mod reporter;
pub mod resolver;
pub mod study;
pub mod worker;

pub use functions::{get_function, FunctionCaller, Objective, RawFn, SyntheticFunction};
pub use reporter::{get_reporter, BufferReporter, Reporter, SilentReporter, StdoutReporter};
pub use resolver::{resolve_problem, EvaluationOptions, ProblemDescriptor, ProblemSummary};
pub use study::StudyParameters;
pub use worker::{DispatchedJob, SyntheticWorkerManager};
