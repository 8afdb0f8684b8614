//! Session context injected into views
//!
//! Views receive the signed-in user and active profile explicitly instead of
//! looking them up from process-wide state.

use crate::core::record::RecordId;

/// Who is looking at a view
#[derive(Debug, Clone, Default)]
pub enum SessionContext {
    /// Signed-in user browsing with one of their profiles
    User {
        user_id: RecordId,
        profile_id: Option<RecordId>,
        token: String,
    },

    /// Administrator using the dashboards
    Admin { admin_id: RecordId, token: String },

    /// No session
    #[default]
    Anonymous,
}

impl SessionContext {
    /// Token to send as `Authorization: Bearer`
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            SessionContext::User { token, .. } | SessionContext::Admin { token, .. } => {
                Some(token)
            }
            SessionContext::Anonymous => None,
        }
    }

    /// The active profile, if the user picked one
    pub fn profile_id(&self) -> Option<&RecordId> {
        match self {
            SessionContext::User { profile_id, .. } => profile_id.as_ref(),
            _ => None,
        }
    }

    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, SessionContext::Admin { .. })
    }

    /// Check if context is anonymous
    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionContext::Anonymous)
    }

    /// Same user, switched to another profile
    pub fn with_profile(self, profile: RecordId) -> Self {
        match self {
            SessionContext::User { user_id, token, .. } => SessionContext::User {
                user_id,
                profile_id: Some(profile),
                token,
            },
            other => other,
        }
    }
}
