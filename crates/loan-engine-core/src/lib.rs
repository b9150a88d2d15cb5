pub mod arithmetic;
pub mod display;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod rates;
pub mod types;
pub mod words;

#[cfg(feature = "export")]
pub mod export;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::LoanEngineError;
pub use types::*;

/// Standard result type for all loan-engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
