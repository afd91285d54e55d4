//! Long-lived services owned by the server state

pub mod email;

pub use email::{EmailService, InvitationEmail};
