//! The authenticated identity every service operation runs as.

use chequealo_core::{UserId, UserRole};

use super::ServiceError;

/// User id plus the roles granted at the time of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub roles: Vec<UserRole>,
}

impl Caller {
    #[must_use]
    pub const fn new(user_id: UserId, roles: Vec<UserRole>) -> Self {
        Self { user_id, roles }
    }

    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    /// Fail closed unless the caller is an administrator.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_check() {
        let admin = Caller::new(UserId::new(1), vec![UserRole::Admin, UserRole::User]);
        assert!(admin.is_admin());
        assert!(admin.require_admin().is_ok());

        let user = Caller::new(UserId::new(2), vec![UserRole::Owner]);
        assert!(!user.is_admin());
        assert!(matches!(user.require_admin(), Err(ServiceError::Forbidden)));
    }
}
