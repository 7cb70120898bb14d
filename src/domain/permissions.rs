//! Role-based access rules.
//!
//! Every check in the API goes through [`authorize`], a pure function of
//! who is calling, what is being touched, how, and who owns it.

use thiserror::Error;

use super::{Actor, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Categories, genres and titles.
    Catalog,
    /// Reviews and comments.
    Discussion,
    /// The user directory under `/users/` and `/users/{username}/`.
    UserDirectory,
    /// The caller's own record under `/users/me/`.
    OwnProfile,
    /// Operational endpoints such as `/metrics`.
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turns a refusal into an error for `?` propagation.
    pub const fn check(self) -> Result<(), Denied> {
        match self {
            Self::Allow => Ok(()),
            Self::Unauthenticated => Err(Denied::Unauthenticated),
            Self::Forbidden => Err(Denied::Forbidden),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denied {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("You do not have permission to perform this action.")]
    Forbidden,
}

/// Decides whether `actor` may perform `action` on `resource`.
///
/// `owner` is the author of the object being modified, when there is one.
#[must_use]
pub fn authorize(
    actor: Option<&Actor>,
    resource: Resource,
    action: Action,
    owner: Option<UserId>,
) -> Decision {
    match (resource, action) {
        (Resource::Catalog | Resource::Discussion, Action::Read) => Decision::Allow,
        _ => {
            let Some(actor) = actor else {
                return Decision::Unauthenticated;
            };
            allow_if(granted(actor, resource, action, owner))
        }
    }
}

/// The caller, or [`Denied::Unauthenticated`] for anonymous requests.
///
/// Unsafe operations on owned objects call this before looking the object
/// up, so anonymous callers get 401 rather than 404.
pub const fn require_authenticated(actor: Option<&Actor>) -> Result<&Actor, Denied> {
    match actor {
        Some(actor) => Ok(actor),
        None => Err(Denied::Unauthenticated),
    }
}

fn granted(actor: &Actor, resource: Resource, action: Action, owner: Option<UserId>) -> bool {
    match (resource, action) {
        (Resource::Catalog | Resource::UserDirectory | Resource::System, _) => actor.is_admin(),
        (Resource::Discussion, Action::Read | Action::Create) => true,
        (Resource::Discussion, Action::Update | Action::Delete) => {
            owner == Some(actor.id) || actor.is_moderator() || actor.is_admin()
        }
        (Resource::OwnProfile, Action::Read | Action::Update) => true,
        (Resource::OwnProfile, Action::Create | Action::Delete) => false,
    }
}

const fn allow_if(granted: bool) -> Decision {
    if granted {
        Decision::Allow
    } else {
        Decision::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn actor(id: i32, role: Role) -> Actor {
        Actor {
            id: UserId::new(id),
            username: format!("user{id}"),
            role,
            is_staff: false,
            is_superuser: false,
        }
    }

    const ALL_ACTIONS: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    #[test]
    fn test_reads_are_public_for_catalog_and_discussion() {
        for resource in [Resource::Catalog, Resource::Discussion] {
            assert_eq!(
                authorize(None, resource, Action::Read, None),
                Decision::Allow
            );
        }
    }

    #[test]
    fn test_anonymous_writes_are_unauthenticated() {
        for resource in [
            Resource::Catalog,
            Resource::Discussion,
            Resource::UserDirectory,
            Resource::OwnProfile,
        ] {
            for action in ALL_ACTIONS.into_iter().filter(|a| !a.is_safe()) {
                assert_eq!(
                    authorize(None, resource, action, None),
                    Decision::Unauthenticated,
                    "{resource:?} {action:?}"
                );
            }
        }
        assert_eq!(
            authorize(None, Resource::UserDirectory, Action::Read, None),
            Decision::Unauthenticated
        );
    }

    #[test]
    fn test_catalog_writes_require_admin() {
        let user = actor(1, Role::User);
        let moderator = actor(2, Role::Moderator);
        let admin = actor(3, Role::Admin);
        let mut superuser = actor(4, Role::User);
        superuser.is_superuser = true;

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert_eq!(
                authorize(Some(&user), Resource::Catalog, action, None),
                Decision::Forbidden
            );
            assert_eq!(
                authorize(Some(&moderator), Resource::Catalog, action, None),
                Decision::Forbidden
            );
            assert!(authorize(Some(&admin), Resource::Catalog, action, None).is_allowed());
            assert!(authorize(Some(&superuser), Resource::Catalog, action, None).is_allowed());
        }
    }

    #[test]
    fn test_discussion_edit_rules() {
        let author = actor(1, Role::User);
        let stranger = actor(2, Role::User);
        let moderator = actor(3, Role::Moderator);
        let admin = actor(4, Role::Admin);
        let owner = Some(author.id);

        assert!(authorize(Some(&stranger), Resource::Discussion, Action::Create, None).is_allowed());

        for action in [Action::Update, Action::Delete] {
            assert!(authorize(Some(&author), Resource::Discussion, action, owner).is_allowed());
            assert!(authorize(Some(&moderator), Resource::Discussion, action, owner).is_allowed());
            assert!(authorize(Some(&admin), Resource::Discussion, action, owner).is_allowed());
            assert_eq!(
                authorize(Some(&stranger), Resource::Discussion, action, owner),
                Decision::Forbidden
            );
        }
    }

    #[test]
    fn test_user_directory_is_admin_only() {
        let moderator = actor(1, Role::Moderator);
        let admin = actor(2, Role::Admin);
        for action in ALL_ACTIONS {
            assert_eq!(
                authorize(Some(&moderator), Resource::UserDirectory, action, None),
                Decision::Forbidden
            );
            assert!(authorize(Some(&admin), Resource::UserDirectory, action, None).is_allowed());
        }
    }

    #[test]
    fn test_check_maps_refusals() {
        assert_eq!(Decision::Allow.check(), Ok(()));
        assert_eq!(Decision::Unauthenticated.check(), Err(Denied::Unauthenticated));
        assert_eq!(Decision::Forbidden.check(), Err(Denied::Forbidden));
    }

    #[test]
    fn test_require_authenticated() {
        let user = actor(1, Role::User);
        assert_eq!(require_authenticated(Some(&user)), Ok(&user));
        assert_eq!(require_authenticated(None), Err(Denied::Unauthenticated));
    }

    #[test]
    fn test_own_profile() {
        let user = actor(1, Role::User);
        assert!(authorize(Some(&user), Resource::OwnProfile, Action::Read, None).is_allowed());
        assert!(authorize(Some(&user), Resource::OwnProfile, Action::Update, None).is_allowed());
        assert_eq!(
            authorize(Some(&user), Resource::OwnProfile, Action::Delete, None),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_system_endpoints_are_admin_only() {
        let moderator = actor(1, Role::Moderator);
        let admin = actor(2, Role::Admin);
        assert_eq!(
            authorize(None, Resource::System, Action::Read, None),
            Decision::Unauthenticated
        );
        assert_eq!(
            authorize(Some(&moderator), Resource::System, Action::Read, None),
            Decision::Forbidden
        );
        assert!(authorize(Some(&admin), Resource::System, Action::Read, None).is_allowed());
    }
}
