//! Authentication types for the cloudplane SDK.
//!
//! This module provides the credential store shared by every request made
//! through a client, and the protocol used to refresh it.
//!
//! # Overview
//!
//! - [`Token`]: An issued token with optional expiry and scope
//! - [`Session`]: The shared holder of the current token and its reauthentication gate
//! - [`Reauthenticator`]: The collaborator that obtains fresh tokens
//! - [`identity::PasswordIssuer`]: A password-method [`Reauthenticator`]
//! - [`AuthError`]: Errors raised while reauthenticating
//!
//! # Example
//!
//! ```rust
//! use cloudplane::{Session, Token};
//!
//! // A session whose token can be refreshed on demand
//! let session = Session::with_reauthenticator(Token::new("initial"), || async {
//!     Ok(Token::new("refreshed"))
//! });
//!
//! // Clones share the same token and gate
//! let shared = session.clone();
//! assert!(shared.can_reauthenticate());
//! ```

mod error;
pub mod identity;
pub mod session;
mod token;

pub use error::AuthError;
pub use session::{ReauthFuture, ReauthState, Reauthenticator, Session, TokenSnapshot};
pub use token::Token;
