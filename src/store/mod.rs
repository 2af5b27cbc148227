//! Persistence seam. Handlers talk to a `dyn Store`; production uses [`PgStore`], the test
//! suite uses [`MemoryStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::Scope;
use crate::error::AppError;
use crate::models::{Group, NewUser, Task, TaskFilter, User, UserCredentials};

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError>;

    /// Fails with `BadRequest` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Users in `scope`; for `Scope::OwnedBy(id)` that is the account `id` itself.
    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, AppError>;

    async fn list_groups(&self, scope: Scope) -> Result<Vec<Group>, AppError>;

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, AppError>;

    async fn insert_group(&self, group: &Group) -> Result<Group, AppError>;

    async fn update_group(&self, group: &Group) -> Result<Group, AppError>;

    /// Deletes the group and clears the group reference of its tasks. Returns `false` if
    /// there was no such group.
    async fn delete_group(&self, id: Uuid) -> Result<bool, AppError>;

    /// Tasks matching `filter`, newest first.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn insert_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn update_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}
