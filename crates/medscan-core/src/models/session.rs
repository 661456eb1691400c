//! Signed-in user context.
//!
//! A [`SessionContext`] is owned by whoever drives the UI and passed by
//! reference to anything that needs to know who is acting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Invalid user: {0}")]
    InvalidUser(String),
}

/// What a signed-in user may see.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    /// Sees own records
    Doctor,
    /// Sees every record
    Admin,
}

/// An authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Stable user ID, stamped on every saved record
    pub doctor_id: String,
    pub display_name: String,
    pub role: Role,
    /// Sign-in timestamp
    pub signed_in_at: String,
}

impl Session {
    pub fn new(doctor_id: String, display_name: String, role: Role) -> Self {
        Self {
            doctor_id,
            display_name,
            role,
            signed_in_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Holds the current session between sign-in and sign-out.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session, replacing any previous one.
    pub fn sign_in(
        &mut self,
        doctor_id: &str,
        display_name: &str,
        role: Role,
    ) -> Result<&Session, SessionError> {
        let doctor_id = doctor_id.trim();
        if doctor_id.is_empty() {
            return Err(SessionError::InvalidUser("empty user id".into()));
        }
        tracing::info!(doctor_id, ?role, "Signed in");
        let session = self.current.insert(Session::new(
            doctor_id.to_string(),
            display_name.trim().to_string(),
            role,
        ));
        Ok(&*session)
    }

    /// Drop the current session. Returns whether one existed.
    pub fn sign_out(&mut self) -> bool {
        match self.current.take() {
            Some(session) => {
                tracing::info!(doctor_id = %session.doctor_id, "Signed out");
                true
            }
            None => false,
        }
    }

    /// The signed-in user.
    pub fn current_user(&self) -> Result<&Session, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotSignedIn)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let mut ctx = SessionContext::new();
        assert_eq!(ctx.current_user(), Err(SessionError::NotSignedIn));

        ctx.sign_in("doc-1", "Dr. Rao", Role::Doctor).unwrap();
        assert_eq!(ctx.current_user().unwrap().doctor_id, "doc-1");
        assert!(!ctx.current_user().unwrap().is_admin());

        assert!(ctx.sign_out());
        assert!(!ctx.is_signed_in());
        assert!(!ctx.sign_out());
    }

    #[test]
    fn test_empty_user_rejected() {
        let mut ctx = SessionContext::new();
        let result = ctx.sign_in("  ", "Nobody", Role::Doctor);
        assert!(matches!(result, Err(SessionError::InvalidUser(_))));
        assert!(!ctx.is_signed_in());
    }

    #[test]
    fn test_sign_in_replaces_session() {
        let mut ctx = SessionContext::new();
        ctx.sign_in("doc-1", "Dr. Rao", Role::Doctor).unwrap();
        ctx.sign_in("admin", "Clinic Admin", Role::Admin).unwrap();

        let user = ctx.current_user().unwrap();
        assert_eq!(user.doctor_id, "admin");
        assert!(user.is_admin());
    }
}
