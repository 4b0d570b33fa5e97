pub mod channel;
pub mod model;
pub mod panel;
pub mod rest;
pub mod store;
pub mod sync;

pub use channel::{BackoffPolicy, ChannelHandle, RealtimeChannel};
pub use model::Notification;
pub use panel::{NotificationPanel, PanelState};
pub use rest::{ApiError, NotificationApi};
pub use store::NotificationStore;
pub use sync::SeenSync;
