//! Error codes and error types for the numerical core.
//!
//! Every fallible operation in the crate reports a [`CosmoError`]. Each
//! variant maps onto one tag of the closed [`ErrorCode`] enumeration, which
//! is the integer surface host-language wrappers consume through the symbol
//! table. Tags are stable within a major version.

use thiserror::Error;

/// Closed enumeration of error classes, with stable integer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Memory = 1,
    Linspace = 2,
    Inconsistent = 3,
    Spline = 4,
    SplineEval = 5,
    Integration = 6,
    Root = 7,
    Class = 8,
}

impl ErrorCode {
    /// The symbol name this tag is published under.
    pub fn symbol_name(self) -> &'static str {
        match self {
            ErrorCode::Memory => "ERROR_MEMORY",
            ErrorCode::Linspace => "ERROR_LINSPACE",
            ErrorCode::Inconsistent => "ERROR_INCONSISTENT",
            ErrorCode::Spline => "ERROR_SPLINE",
            ErrorCode::SplineEval => "ERROR_SPLINE_EV",
            ErrorCode::Integration => "ERROR_INTEG",
            ErrorCode::Root => "ERROR_ROOT",
            ErrorCode::Class => "ERROR_CLASS",
        }
    }

    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::Memory,
        ErrorCode::Linspace,
        ErrorCode::Inconsistent,
        ErrorCode::Spline,
        ErrorCode::SplineEval,
        ErrorCode::Integration,
        ErrorCode::Root,
        ErrorCode::Class,
    ];
}

/// Errors produced by the numerical core.
#[derive(Debug, Clone, Error)]
pub enum CosmoError {
    #[error("spline construction failed: {reason}")]
    Spline { reason: String },

    #[error("spline evaluation failed at x = {x}")]
    SplineEval { x: f64 },

    #[error("integration failed in {what}")]
    Integration { what: &'static str },

    #[error("root finding failed in {what}")]
    Root { what: &'static str },

    #[error("linear spacing of [{a}, {b}] with {n} points did not hit the endpoints")]
    Linspace { a: f64, b: f64, n: usize },

    #[error("inconsistent inputs: {reason}")]
    Inconsistent { reason: String },
}

impl CosmoError {
    /// Integer error class, matching the tags published through the symbol table.
    pub fn code(&self) -> ErrorCode {
        match self {
            CosmoError::Spline { .. } => ErrorCode::Spline,
            CosmoError::SplineEval { .. } => ErrorCode::SplineEval,
            CosmoError::Integration { .. } => ErrorCode::Integration,
            CosmoError::Root { .. } => ErrorCode::Root,
            CosmoError::Linspace { .. } => ErrorCode::Linspace,
            CosmoError::Inconsistent { .. } => ErrorCode::Inconsistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_tags_are_unique() {
        let mut tags: Vec<i32> = ErrorCode::ALL.iter().map(|&c| c as i32).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn errors_map_to_their_class() {
        let err = CosmoError::Integration { what: "lensing window" };
        assert_eq!(err.code(), ErrorCode::Integration);
        let err = CosmoError::Linspace { a: 0., b: 10., n: 3 };
        assert_eq!(err.code(), ErrorCode::Linspace);
    }
}
