use parking_lot::RwLock;

use crate::claims::Identity;

/// An established session: decoded identity plus the raw bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

/// Holds the current authenticated session.
///
/// Written once at login (handoff or restored credential), read by every
/// component that needs the identity or the bearer token. Logout clears it.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn establish(&self, identity: Identity, token: String) {
        *self.current.write() = Some(Session { identity, token });
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Bearer credential for authenticated REST calls.
    pub fn bearer(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|s| s.identity.user_id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}
