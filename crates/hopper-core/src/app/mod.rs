//! App - the runtime built on top of the domain and the ports.
//!
//! - **ConnectionRegistry**: named connections, brokers per driver, failure store
//! - **JobRegistry**: the static job definitions
//! - **DispatchEngine**: one handler attempt plus requeue / dead-letter
//! - **QueueListener**: consume loop for one queue
//! - **ListenerSupervisor**: one listener per job, joined together

pub mod connections;
pub mod engine;
pub mod listener;
pub mod registry;
pub mod supervisor;

pub use self::connections::ConnectionRegistry;
pub use self::engine::DispatchEngine;
pub use self::listener::{DEFAULT_IDLE_INTERVAL, ListenerConfig, QueueListener};
pub use self::registry::{BuildError, JobRegistry, JobRegistryBuilder};
pub use self::supervisor::{ListenerExit, ListenerSupervisor, SupervisorHandle};
