//! Domain types for the review catalog.
//!
//! Newtype identifiers keep title, review, comment and user ids from being
//! mixed up, and [`Role`] / [`Actor`] describe who is making a request.

pub mod permissions;
pub mod rating;
pub mod validators;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::roles;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Primary key of a user row.
    UserId
);
entity_id!(
    /// Primary key of a title (creative work).
    TitleId
);
entity_id!(
    /// Primary key of a review.
    ReviewId
);
entity_id!(
    /// Primary key of a comment.
    CommentId
);

/// Stored role of a user.
///
/// Superuser and staff are flags on the user row, not roles; they imply
/// admin rights (see [`Actor::is_admin`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => roles::USER,
            Self::Moderator => roles::MODERATOR,
            Self::Admin => roles::ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            roles::USER => Ok(Self::User),
            roles::MODERATOR => Ok(Self::Moderator),
            roles::ADMIN => Ok(Self::Admin),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Actor {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin) || self.is_superuser || self.is_staff
    }

    #[must_use]
    pub const fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, is_staff: bool, is_superuser: bool) -> Actor {
        Actor {
            id: UserId::new(1),
            username: "tester".to_string(),
            role,
            is_staff,
            is_superuser,
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_admin_flags() {
        assert!(actor(Role::Admin, false, false).is_admin());
        assert!(actor(Role::User, true, false).is_admin());
        assert!(actor(Role::User, false, true).is_admin());
        assert!(!actor(Role::Moderator, false, false).is_admin());
        assert!(actor(Role::Moderator, false, false).is_moderator());
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&TitleId::new(7)).unwrap();
        assert_eq!(json, "7");
        assert_eq!(ReviewId::from(3).value(), 3);
    }
}
