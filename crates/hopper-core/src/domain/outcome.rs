//! DispatchOutcome - how a single dispatch cycle ended.
//!
//! A cycle that returns `Ok` never needs attention from the listener: the handler
//! either succeeded, or its failure was fully handled (requeued / dead-lettered).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The handler succeeded.
    Processed,

    /// The handler failed and a new payload with `attempts` was pushed back.
    Requeued { attempts: u64 },

    /// The handler failed past its budget and a failure record was stored.
    DeadLettered { attempts: u64 },
}

impl DispatchOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, DispatchOutcome::Processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_tag() {
        let s = serde_json::to_string(&DispatchOutcome::Requeued { attempts: 2 }).unwrap();
        assert_eq!(s, r#"{"outcome":"requeued","attempts":2}"#);

        let s = serde_json::to_string(&DispatchOutcome::Processed).unwrap();
        assert_eq!(s, r#"{"outcome":"processed"}"#);
    }
}
