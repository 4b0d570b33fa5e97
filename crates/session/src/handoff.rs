use tracing::{info, warn};
use url::Url;

use crate::claims::decode_identity;
use crate::store::SessionStore;

/// Result of consuming a landing location.
#[derive(Debug, Clone)]
pub struct HandoffOutcome {
    pub established: bool,
    /// Location the client should show next, with the token stripped.
    pub canonical_location: String,
}

/// Completes the login handoff from a landing URL.
///
/// If the location carries a `token` query parameter, decodes its claims,
/// establishes the session, and returns the canonical root location without
/// the parameter. A malformed token is logged and no session is
/// established, but navigation to the canonical location still happens.
/// A location without the parameter is returned untouched.
pub fn consume_landing_location(session: &SessionStore, location: &str) -> HandoffOutcome {
    let url = match Url::parse(location) {
        Ok(u) => u,
        Err(e) => {
            warn!(%e, location, "Unparseable landing location");
            return HandoffOutcome {
                established: false,
                canonical_location: location.to_string(),
            };
        }
    };

    let token = url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned());

    let Some(token) = token else {
        return HandoffOutcome {
            established: false,
            canonical_location: location.to_string(),
        };
    };

    let mut canonical = url;
    canonical.set_path("/");
    canonical.set_query(None);
    canonical.set_fragment(None);

    match decode_identity(&token) {
        Ok(identity) => {
            info!(user_id = %identity.user_id, "Login handoff completed");
            session.establish(identity, token);
            HandoffOutcome {
                established: true,
                canonical_location: canonical.to_string(),
            }
        }
        Err(e) => {
            warn!(%e, "Invalid login token");
            HandoffOutcome {
                established: false,
                canonical_location: canonical.to_string(),
            }
        }
    }
}
