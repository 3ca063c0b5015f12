//! Credential session shared by every request made through a client.
//!
//! This module provides the [`Session`] type: the single owner of the current
//! token for one logical authenticated client, and the gate through which
//! all reauthentication happens.
//!
//! # Reauthentication protocol
//!
//! The session is always in one of two states, [`ReauthState::Normal`] or
//! [`ReauthState::InFlight`]. Callers read the token concurrently together
//! with its *generation*, a counter bumped on every successful
//! reauthentication. When a caller's request is rejected it hands the
//! generation it observed to [`Session::reauthenticate`]:
//!
//! 1. The caller queues on the session's gate (one holder at a time).
//! 2. If the generation already moved past the one it observed, another
//!    caller refreshed the token while it waited; it takes the fresh token
//!    without contacting the issuer.
//! 3. Otherwise it runs the [`Reauthenticator`], stores the new token and
//!    bumps the generation.
//!
//! The critical section runs on its own Tokio task, so a caller that is
//! cancelled mid-reauthentication does not abort the refresh other waiters
//! depend on.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::fmt;

use tokio::sync::{Mutex, RwLock};

use crate::auth::{AuthError, Token};

/// Future returned by a [`Reauthenticator`].
pub type ReauthFuture<'a> = Pin<Box<dyn Future<Output = Result<Token, AuthError>> + Send + 'a>>;

/// The external collaborator that issues fresh tokens.
///
/// Implemented by [`PasswordIssuer`](crate::auth::identity::PasswordIssuer)
/// and by any `Fn() -> impl Future<Output = Result<Token, AuthError>>` closure.
///
/// # Example
///
/// ```rust
/// use cloudplane::{Session, Token};
///
/// let session = Session::with_reauthenticator(Token::new("initial"), || async {
///     Ok(Token::new("refreshed"))
/// });
/// assert!(session.can_reauthenticate());
/// ```
pub trait Reauthenticator: Send + Sync {
    /// Obtains a fresh token from the credential issuer.
    fn reauthenticate(&self) -> ReauthFuture<'_>;
}

impl<F, Fut> Reauthenticator for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Token, AuthError>> + Send + 'static,
{
    fn reauthenticate(&self) -> ReauthFuture<'_> {
        Box::pin(self())
    }
}

/// Whether a reauthentication is currently running for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReauthState {
    /// Requests use the stored token.
    Normal,
    /// A reauthentication holds the gate; rejected callers wait for it.
    InFlight,
}

/// A point-in-time read of the session token.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    /// The token value to send.
    pub id: String,
    /// The generation the token belongs to.
    pub generation: u64,
    /// Whether the token was empty or past its expiry when read.
    pub stale: bool,
}

impl fmt::Debug for TokenSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSnapshot")
            .field("id", &"*****")
            .field("generation", &self.generation)
            .field("stale", &self.stale)
            .finish()
    }
}

struct TokenState {
    token: Token,
    generation: u64,
}

impl TokenState {
    fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            id: self.token.id.clone(),
            generation: self.generation,
            stale: self.token.is_empty() || self.token.expired(),
        }
    }
}

struct SessionInner {
    state: RwLock<TokenState>,
    gate: Mutex<()>,
    in_flight: AtomicBool,
    reauthenticator: Option<Arc<dyn Reauthenticator>>,
}

/// An authenticated session, shared by every request made through it.
///
/// `Session` is a cheap `Clone` handle; clones share the same token and
/// the same reauthentication gate. Independent sessions never interact.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use cloudplane::{Session, Token};
///
/// let session = Session::new(Token::new("static-token"));
/// assert!(!session.can_reauthenticate());
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

impl Session {
    /// Creates a session around a fixed token that cannot be refreshed.
    #[must_use]
    pub fn new(token: Token) -> Self {
        Self::build(token, None)
    }

    /// Creates a session that refreshes its token through `reauthenticator`.
    #[must_use]
    pub fn with_reauthenticator(token: Token, reauthenticator: impl Reauthenticator + 'static) -> Self {
        Self::build(token, Some(Arc::new(reauthenticator)))
    }

    /// Creates a session with no token yet; the first request authenticates.
    #[must_use]
    pub fn unauthenticated(reauthenticator: impl Reauthenticator + 'static) -> Self {
        Self::build(Token::empty(), Some(Arc::new(reauthenticator)))
    }

    fn build(token: Token, reauthenticator: Option<Arc<dyn Reauthenticator>>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(TokenState {
                    token,
                    generation: 0,
                }),
                gate: Mutex::new(()),
                in_flight: AtomicBool::new(false),
                reauthenticator,
            }),
        }
    }

    /// Reads the current token and its generation.
    pub async fn current_token(&self) -> TokenSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Returns a copy of the current token.
    pub async fn token(&self) -> Token {
        self.inner.state.read().await.token.clone()
    }

    /// Returns how many reauthentications have completed on this session.
    pub async fn generation(&self) -> u64 {
        self.inner.state.read().await.generation
    }

    /// Returns `true` if this session has a reauthentication function.
    #[must_use]
    pub fn can_reauthenticate(&self) -> bool {
        self.inner.reauthenticator.is_some()
    }

    /// Returns whether a reauthentication is running right now.
    #[must_use]
    pub fn reauth_state(&self) -> ReauthState {
        if self.inner.in_flight.load(Ordering::Acquire) {
            ReauthState::InFlight
        } else {
            ReauthState::Normal
        }
    }

    /// Refreshes the token unless someone already did after `observed_generation`.
    ///
    /// Returns the token to retry with. Concurrent callers that observed the
    /// same generation trigger at most one call to the issuer between them.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoReauthenticator`] if the session cannot refresh
    /// - any error returned by the [`Reauthenticator`]
    /// - [`AuthError::ReauthAborted`] if the reauthentication task panicked
    pub async fn reauthenticate(&self, observed_generation: u64) -> Result<TokenSnapshot, AuthError> {
        if self.inner.reauthenticator.is_none() {
            return Err(AuthError::NoReauthenticator);
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.refresh_after(observed_generation).await })
            .await
            .map_err(|e| AuthError::ReauthAborted {
                reason: e.to_string(),
            })?
    }
}

impl SessionInner {
    async fn refresh_after(&self, observed_generation: u64) -> Result<TokenSnapshot, AuthError> {
        let reauthenticator = self
            .reauthenticator
            .as_ref()
            .ok_or(AuthError::NoReauthenticator)?;

        let _gate = self.gate.lock().await;

        {
            let state = self.state.read().await;
            if state.generation > observed_generation {
                tracing::debug!(
                    observed = observed_generation,
                    current = state.generation,
                    "Token already refreshed by another caller"
                );
                return Ok(state.snapshot());
            }
        }

        self.in_flight.store(true, Ordering::Release);
        let outcome = reauthenticator.reauthenticate().await;
        self.in_flight.store(false, Ordering::Release);

        let token = outcome.map_err(|e| {
            tracing::warn!("Reauthentication failed: {}", e);
            e
        })?;
        if token.is_empty() {
            return Err(AuthError::InvalidIssuerResponse {
                reason: "issuer returned an empty token".to_string(),
            });
        }

        let mut state = self.state.write().await;
        state.token = token;
        state.generation += 1;
        tracing::info!(generation = state.generation, "Reauthentication completed");
        Ok(state.snapshot())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("can_reauthenticate", &self.can_reauthenticate())
            .field("reauth_state", &self.reauth_state())
            .finish_non_exhaustive()
    }
}
