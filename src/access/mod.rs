//! Ownership-scoped access control.
//!
//! Every request is checked in two steps. [`Access::evaluate`] looks the action up in the
//! capability table (see [`policy`]) and resolves the caller into a [`Principal`] when the
//! action needs one. Handlers then use the resulting [`Access`] to scope their queries
//! ([`Access::scope`]), stamp ownership on new records ([`Access::assign_owner`]), and
//! guard mutations on existing records ([`Access::authorize`]).
//!
//! Reads are scoped, so a resource outside the caller's scope is simply not found. Mutations
//! load the resource unscoped and fail with 403 when the caller neither owns it nor is a
//! superuser.

pub mod policy;
pub mod scope;

pub use policy::{Action, Capability, ResourceKind};
pub use scope::Scope;

use crate::auth::extractors::Identity;
use crate::error::AppError;
use crate::models::{Task, User};
use crate::store::Store;

/// The authenticated identity making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(user_id: i32, is_superuser: bool) -> Self {
        Self {
            user_id,
            is_superuser,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal::new(user.id, user.is_superuser)
    }
}

/// A record with an owning user. `None` only for legacy rows created before ownership existed.
pub trait Owned {
    fn owner_id(&self) -> Option<i32>;
}

/// A validated creation payload that becomes a record once it has an owner.
pub trait OwnedDraft {
    type Record;

    fn into_record(self, owner_id: i32) -> Self::Record;
}

/// The visible set of resources for `principal`.
pub fn scope(principal: &Principal) -> Scope {
    Scope::for_principal(principal)
}

/// Superusers may change anything; everyone else only what they own.
pub fn authorize_mutation<R: Owned + ?Sized>(principal: &Principal, resource: &R) -> bool {
    principal.is_superuser || resource.owner_id() == Some(principal.user_id)
}

/// Like [`authorize_mutation`], but produces the 403 the caller gets on denial.
pub fn ensure_mutation<R: Owned + ?Sized>(
    principal: &Principal,
    resource: &R,
    action: Action,
) -> Result<(), AppError> {
    if authorize_mutation(principal, resource) {
        return Ok(());
    }
    log::warn!(
        "denied {} for user {} on {} owned by {:?}",
        action,
        principal.user_id,
        action.resource(),
        resource.owner_id()
    );
    Err(AppError::Forbidden(format!(
        "You do not have permission to {} this {}.",
        action.verb(),
        action.resource()
    )))
}

pub fn assign_owner_on_create<D: OwnedDraft>(principal: &Principal, draft: D) -> D::Record {
    draft.into_record(principal.user_id)
}

/// Keeps the tasks whose completion flag equals `completed`, preserving order.
pub fn filter_by_completion<I>(tasks: I, completed: bool) -> Vec<Task>
where
    I: IntoIterator<Item = Task>,
{
    tasks
        .into_iter()
        .filter(|task| task.completed == completed)
        .collect()
}

/// The outcome of checking one request against the capability table.
#[derive(Debug, Clone)]
pub struct Access {
    action: Action,
    principal: Option<Principal>,
}

impl Access {
    /// Resolves the caller for `action`. Fails with 401 when the action needs an
    /// authenticated user and there is none, or when the token names a user that no longer
    /// exists.
    pub async fn evaluate(
        store: &dyn Store,
        identity: &Identity,
        action: Action,
    ) -> Result<Self, AppError> {
        let principal = match (action.required_capability(), identity.user_id()) {
            (Capability::Anyone, None) => None,
            (_, Some(user_id)) => {
                let user = store.find_user(user_id).await?.ok_or_else(|| {
                    AppError::Unauthorized("User for this token no longer exists".into())
                })?;
                Some(Principal::from(&user))
            }
            (Capability::Authenticated | Capability::OwnerOrSuperuser, None) => {
                log::debug!("rejected anonymous {}", action);
                return Err(AppError::Unauthorized(
                    "Authentication credentials were not provided".into(),
                ));
            }
        };
        Ok(Self { action, principal })
    }

    pub fn principal(&self) -> Result<&Principal, AppError> {
        self.principal.as_ref().ok_or_else(|| {
            AppError::Unauthorized("Authentication credentials were not provided".into())
        })
    }

    pub fn scope(&self) -> Result<Scope, AppError> {
        self.principal().map(scope)
    }

    /// Checks `resource` against the action's capability. Only `OwnerOrSuperuser` actions
    /// look at ownership; the other capabilities were settled by [`Access::evaluate`].
    pub fn authorize<R: Owned + ?Sized>(&self, resource: &R) -> Result<(), AppError> {
        match self.action.required_capability() {
            Capability::OwnerOrSuperuser => ensure_mutation(self.principal()?, resource, self.action),
            Capability::Authenticated => self.principal().map(|_| ()),
            Capability::Anyone => Ok(()),
        }
    }

    pub fn assign_owner<D: OwnedDraft>(&self, draft: D) -> Result<D::Record, AppError> {
        Ok(assign_owner_on_create(self.principal()?, draft))
    }
}
