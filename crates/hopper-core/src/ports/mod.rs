//! Ports - capability traits for the external collaborators.
//!
//! The core never talks to Redis or MySQL directly; it goes through these
//! traits so adapters can be swapped (see `impls`).

pub mod broker;
pub mod clock;
pub mod failure_store;

pub use self::broker::{BrokerClient, BrokerConnector, SharedBroker};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::failure_store::FailureStore;
