//! Middleware around the operation body.
//!
//! - [`step`]: the `BeforeMiddleware` / `AfterMiddleware` traits
//! - [`pipeline`]: ordered chains of steps, run strictly one after another

pub mod pipeline;
pub mod step;

pub use pipeline::Pipeline;
pub use step::{AfterMiddleware, BeforeMiddleware};
