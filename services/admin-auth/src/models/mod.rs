//! Admin auth service models

pub mod channel;
pub mod profile;
pub mod session;
pub mod user;

// Re-export for convenience
pub use channel::ChannelInfo;
pub use profile::Profile;
pub use session::Session;
pub use user::{AppMetadata, User};
