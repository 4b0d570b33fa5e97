pub mod claims;
pub mod handoff;
pub mod store;

pub use claims::{Identity, SessionError, decode_identity};
pub use handoff::{HandoffOutcome, consume_landing_location};
pub use store::{Session, SessionStore};
