//! OAuth 2.0 user authentication for Google Drive
//!
//! - `credential`: persisted user credential (authorized-user JSON)
//! - `oauth`: token endpoint calls and the interactive loopback flow
//! - `provider`: load / refresh / authorize state machine

pub mod credential;
pub mod oauth;
pub mod provider;

pub use credential::Credential;
pub use oauth::{ClientSecrets, GoogleOAuthClient, IdentityProvider};
pub use provider::{CredentialProvider, CredentialState};
