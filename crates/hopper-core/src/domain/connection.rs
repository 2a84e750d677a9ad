//! Connection kinds and typed connection handles.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use redis::aio::ConnectionManager;
use sqlx::MySqlPool;

use super::errors::{HandlerError, QueueError};

/// The closed set of connection types a job can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionKind {
    Redis,
    MySql,
    Mongo,
}

impl ConnectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Redis => "redis",
            ConnectionKind::MySql => "mysql",
            ConnectionKind::Mongo => "mongo",
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionKind {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis" => Ok(ConnectionKind::Redis),
            "mysql" => Ok(ConnectionKind::MySql),
            "mongo" => Ok(ConnectionKind::Mongo),
            other => Err(QueueError::Configuration(format!(
                "unknown connection kind '{other}'"
            ))),
        }
    }
}

/// An already-connected handle. Cloning is cheap for every variant.
#[derive(Clone)]
pub enum Connection {
    Redis(ConnectionManager),
    MySql(MySqlPool),
    Mongo(mongodb::Client),
}

impl Connection {
    pub fn kind(&self) -> ConnectionKind {
        match self {
            Connection::Redis(_) => ConnectionKind::Redis,
            Connection::MySql(_) => ConnectionKind::MySql,
            Connection::Mongo(_) => ConnectionKind::Mongo,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Redis(_) => f.write_str("Connection::Redis(ConnectionManager)"),
            Connection::MySql(_) => f.write_str("Connection::MySql(MySqlPool)"),
            Connection::Mongo(_) => f.write_str("Connection::Mongo(Client)"),
        }
    }
}

/// The connections resolved for one job: only the kinds it declared,
/// and only those that are configured in this process.
#[derive(Debug, Clone, Default)]
pub struct Connections {
    handles: HashMap<ConnectionKind, Connection>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connection: Connection) {
        self.handles.insert(connection.kind(), connection);
    }

    pub fn get(&self, kind: ConnectionKind) -> Option<&Connection> {
        self.handles.get(&kind)
    }

    pub fn redis(&self) -> Result<ConnectionManager, HandlerError> {
        match self.handles.get(&ConnectionKind::Redis) {
            Some(Connection::Redis(conn)) => Ok(conn.clone()),
            _ => Err(HandlerError::MissingConnection("redis".to_string())),
        }
    }

    pub fn mysql(&self) -> Result<&MySqlPool, HandlerError> {
        match self.handles.get(&ConnectionKind::MySql) {
            Some(Connection::MySql(pool)) => Ok(pool),
            _ => Err(HandlerError::MissingConnection("mysql".to_string())),
        }
    }

    pub fn mongo(&self) -> Result<&mongodb::Client, HandlerError> {
        match self.handles.get(&ConnectionKind::Mongo) {
            Some(Connection::Mongo(client)) => Ok(client),
            _ => Err(HandlerError::MissingConnection("mongo".to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
