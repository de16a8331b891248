use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting party on a mutating request. Authentication middleware is a
/// separate concern; callers resolve their identity upstream and pass it
/// through here so handlers can check it against the appointment's own
/// requester and provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Requester,
    Provider,
    Admin,
}

impl Actor {
    pub fn requester(id: Uuid) -> Self {
        Self { id, role: ActorRole::Requester }
    }

    pub fn provider(id: Uuid) -> Self {
        Self { id, role: ActorRole::Provider }
    }

    pub fn admin(id: Uuid) -> Self {
        Self { id, role: ActorRole::Admin }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}
