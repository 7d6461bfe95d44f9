use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SocietyError;
use crate::SocietyResult;

/// Membership role resolved by the external token-issuing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Staff => write!(f, "staff"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(SocietyError::invalid(
                "role",
                &format!("unknown role '{other}', expected staff or admin"),
            )),
        }
    }
}

/// An authenticated caller. Credential verification happens upstream; by the
/// time the core sees a `Principal` the token has already been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Principal { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn require_admin(principal: &Principal) -> SocietyResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(SocietyError::Forbidden("admin access required".into()))
    }
}

pub fn require_staff(principal: &Principal) -> SocietyResult<()> {
    if principal.role == Role::Staff {
        Ok(())
    } else {
        Err(SocietyError::Forbidden("staff access required".into()))
    }
}

/// Owner-or-admin gate used by the read paths (loan details, listings).
pub fn require_owner_or_admin(principal: &Principal, owner: Uuid) -> SocietyResult<()> {
    if principal.is_admin() || principal.user_id == owner {
        Ok(())
    } else {
        Err(SocietyError::Forbidden("access denied".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Staff".parse::<Role>().unwrap(), Role::Staff);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let staff = Principal::new(owner, Role::Staff);
        let other = Principal::new(Uuid::new_v4(), Role::Staff);
        let admin = Principal::new(Uuid::new_v4(), Role::Admin);

        assert!(require_owner_or_admin(&staff, owner).is_ok());
        assert!(require_owner_or_admin(&admin, owner).is_ok());
        assert!(require_owner_or_admin(&other, owner).is_err());
    }
}
