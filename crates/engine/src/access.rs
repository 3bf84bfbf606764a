//! Request-scoped authentication context.
//!
//! Every engine operation takes an explicit [`Principal`] instead of reading
//! an ambient session, so the caller decides who is acting.

use crate::{EngineError, ResultEngine};

/// Platform role of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Mentor,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Mentor => "mentor",
            Self::Student => "student",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "mentor" => Ok(Self::Mentor),
            "student" => Ok(Self::Student),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin-only gate used by back-office operations.
    pub fn require_admin(&self) -> ResultEngine<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Unauthorized("admin role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips() {
        for role in [Role::Admin, Role::Mentor, Role::Student] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(Role::try_from("owner").is_err());
    }

    #[test]
    fn require_admin_rejects_other_roles() {
        assert!(Principal::new("root", Role::Admin).require_admin().is_ok());
        assert_eq!(
            Principal::new("bob", Role::Student).require_admin(),
            Err(EngineError::Unauthorized("admin role required".to_string()))
        );
    }
}
