//! Explicit per-invocation context threaded through every ledger and report call.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    /// Authenticated/acting user, when the caller declared one.
    pub actor_id: Option<i64>,
}

impl RequestContext {
    pub fn new(actor_id: Option<i64>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor_id,
        }
    }

    /// Context for maintenance paths that have no acting user.
    pub fn system() -> Self {
        Self::new(None)
    }

    /// Short request tag used in audit log lines.
    pub fn tag(&self) -> String {
        let id = self.request_id.simple().to_string();
        format!("req={}", &id[..8])
    }
}
