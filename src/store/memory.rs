use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::access::Scope;
use crate::error::AppError;
use crate::models::{Group, NewUser, Task, TaskFilter, User, UserCredentials};

#[derive(Default)]
struct Tables {
    next_user_id: i32,
    users: HashMap<i32, (User, String)>,
    groups: HashMap<Uuid, Group>,
    tasks: HashMap<Uuid, Task>,
}

impl Tables {
    /// Fills in the joined `group_name`, as the SQL store does.
    fn hydrate(&self, mut task: Task) -> Task {
        task.group_name = task
            .group_id
            .and_then(|id| self.groups.get(&id))
            .map(|group| group.name.clone());
        task
    }

    fn check_group_reference(&self, task: &Task) -> Result<(), AppError> {
        match task.group_id {
            Some(id) if !self.groups.contains_key(&id) => Err(AppError::ValidationError(
                "Referenced record does not exist".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// In-process store with the same observable behaviour as [`super::PgStore`] for everything
/// the API reaches: unique usernames and emails, joined group names, and `ON DELETE SET NULL`
/// for a task's group.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, hash)| UserCredentials {
                id: user.id,
                password_hash: hash.clone(),
            }))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|(existing, _)| existing.email == user.email || existing.username == user.username);
        if taken {
            return Err(AppError::BadRequest("Record already exists".into()));
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            is_superuser: user.is_superuser,
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(created.id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .map(|(user, _)| user)
            .filter(|user| scope.owner_filter().map_or(true, |id| id == user.id))
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn list_groups(&self, scope: Scope) -> Result<Vec<Group>, AppError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables
            .groups
            .values()
            .filter(|group| scope.admits(*group))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(&id).cloned())
    }

    async fn insert_group(&self, group: &Group) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        tables.groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn update_group(&self, group: &Group) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group.id) {
            Some(existing) => {
                existing.name = group.name.clone();
                existing.description = group.description.clone();
                Ok(existing.clone())
            }
            None => Err(AppError::NotFound("Record not found".into())),
        }
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for task in tables.tasks.values_mut() {
            if task.group_id == Some(id) {
                task.group_id = None;
                task.group_name = None;
            }
        }
        Ok(true)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .map(|task| tables.hydrate(task.clone()))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).map(|task| tables.hydrate(task.clone())))
    }

    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_group_reference(task)?;
        tables.tasks.insert(task.id, task.clone());
        Ok(tables.hydrate(task.clone()))
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_group_reference(task)?;
        match tables.tasks.get_mut(&task.id) {
            Some(existing) => *existing = task.clone(),
            None => return Err(AppError::NotFound("Record not found".into())),
        }
        Ok(tables.hydrate(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.remove(&id).is_some())
    }
}
