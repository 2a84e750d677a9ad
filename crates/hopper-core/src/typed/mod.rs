//! Typed - handler abstractions.
//!
//! A job definition holds an `Arc<dyn JobHandler>`; most jobs implement the
//! typed `Handler<T>` and get wrapped with `TypedHandler`.

pub mod handler;
pub mod job;

pub use self::handler::{Handler, JobHandler, TypedHandler};
pub use self::job::Job;
