//! # Session Context Module
//!
//! ## Purpose
//! Explicit session/account context forwarded into every remote lookup. The
//! engine never reads credentials from ambient global state; the context is
//! constructed once at startup and passed down through coordinator, resolver
//! and adapters, which forward it without inspecting it.

use std::fmt;

/// Opaque credential and account identity for the remote lexical services.
///
/// The engine only forwards this value; it never mutates it or derives
/// behavior from its contents.
#[derive(Clone)]
pub struct SessionContext {
    account_id: String,
    access_token: String,
}

impl SessionContext {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Anonymous session for deployments where the services accept
    /// unauthenticated lookups
    pub fn anonymous() -> Self {
        Self::new("anonymous", "")
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Bearer credential forwarded verbatim in the Authorization header
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

// Credentials stay out of logs.
impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("account_id", &self.account_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
