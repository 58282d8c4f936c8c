pub mod domain;
pub mod errors;
pub mod experiment;
pub mod kinds;

pub use domain::*;
pub use errors::*;
pub use experiment::*;
pub use kinds::*;
