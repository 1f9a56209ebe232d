//! Railguard Core: `Outcome`, `Failure`, `Defect`, and typed registry keys.

pub mod defect;
pub mod failure;
pub mod keys;
pub mod outcome;

pub use defect::{Defect, DefectKind};
pub use failure::{Failure, Raised};
pub use keys::{DependencyKey, ErrorKind};
pub use outcome::{Outcome, OutcomeKind};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
