//! Impls - adapters for the ports.
//!
//! - **RedisBroker / RedisConnector**: production broker, one connection per listener
//! - **MySqlFailureStore**: production failure store
//! - **InMemoryBroker / InMemoryFailureStore**: development and tests

pub mod inmem_broker;
pub mod mysql_store;
pub mod redis_broker;

pub use self::inmem_broker::{InMemoryBroker, InMemoryFailureStore};
pub use self::mysql_store::MySqlFailureStore;
pub use self::redis_broker::{RedisBroker, RedisConnector};
