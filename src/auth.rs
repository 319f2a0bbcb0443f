//! Credential model, redacted token secrets, and the refresh endpoint's token message.

pub mod credential;
pub mod message;
pub mod secret;

pub use credential::*;
pub use message::*;
pub use secret::*;
