use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::access::Scope;
use crate::error::AppError;
use crate::models::{Group, NewUser, Task, TaskFilter, User, UserCredentials};

const USER_COLUMNS: &str = "id, username, email, is_superuser, created_at";

const GROUP_COLUMNS: &str = "id, name, description, created_at, owner_id";

// `t` is the tasks row, `g` the optional group joined in for `group_name`.
const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.due_date, t.completed, \
     t.created_at, t.updated_at, t.group_id, g.name AS group_name, t.owner_id";

const TASK_JOIN: &str = "LEFT JOIN task_groups g ON g.id = t.group_id";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Escapes `LIKE` wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, is_superuser) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.is_superuser)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, AppError> {
        let users = match scope.owner_filter() {
            Some(user_id) => {
                let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
                sqlx::query_as::<_, User>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
                sqlx::query_as::<_, User>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(users)
    }

    async fn list_groups(&self, scope: Scope) -> Result<Vec<Group>, AppError> {
        let sql = format!(
            "SELECT {} FROM task_groups \
             WHERE ($1::INTEGER IS NULL OR owner_id = $1) \
             ORDER BY name",
            GROUP_COLUMNS
        );
        let groups = sqlx::query_as::<_, Group>(&sql)
            .bind(scope.owner_filter())
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, AppError> {
        let sql = format!("SELECT {} FROM task_groups WHERE id = $1", GROUP_COLUMNS);
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn insert_group(&self, group: &Group) -> Result<Group, AppError> {
        let sql = format!(
            "INSERT INTO task_groups (id, name, description, created_at, owner_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            GROUP_COLUMNS
        );
        let created = sqlx::query_as::<_, Group>(&sql)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.created_at)
            .bind(group.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_group(&self, group: &Group) -> Result<Group, AppError> {
        let sql = format!(
            "UPDATE task_groups SET name = $1, description = $2 WHERE id = $3 RETURNING {}",
            GROUP_COLUMNS
        );
        let updated = sqlx::query_as::<_, Group>(&sql)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool, AppError> {
        // tasks.group_id is ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM task_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut sql = format!("SELECT {} FROM tasks t {} WHERE TRUE", TASK_COLUMNS, TASK_JOIN);
        let mut param_count = 1;

        let owner_id = filter.scope.owner_filter();
        if owner_id.is_some() {
            sql.push_str(&format!(" AND t.owner_id = ${}", param_count));
            param_count += 1;
        }
        if filter.completed.is_some() {
            sql.push_str(&format!(" AND t.completed = ${}", param_count));
            param_count += 1;
        }
        if filter.group_id.is_some() {
            sql.push_str(&format!(" AND t.group_id = ${}", param_count));
            param_count += 1;
        }
        if filter.search.is_some() {
            sql.push_str(&format!(
                " AND (t.title ILIKE ${0} OR t.description ILIKE ${0})",
                param_count
            ));
        }
        sql.push_str(" ORDER BY t.created_at DESC");

        let mut query = sqlx::query_as::<_, Task>(&sql);
        if let Some(owner_id) = owner_id {
            query = query.bind(owner_id);
        }
        if let Some(completed) = filter.completed {
            query = query.bind(completed);
        }
        if let Some(group_id) = filter.group_id {
            query = query.bind(group_id);
        }
        if let Some(search) = &filter.search {
            query = query.bind(like_pattern(search));
        }

        let tasks = query.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks t {} WHERE t.id = $1",
            TASK_COLUMNS, TASK_JOIN
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "WITH t AS ( \
                 INSERT INTO tasks (id, title, description, due_date, completed, \
                                    created_at, updated_at, group_id, owner_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING * \
             ) SELECT {} FROM t {}",
            TASK_COLUMNS, TASK_JOIN
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.completed)
            .bind(task.created_at)
            .bind(task.updated_at)
            .bind(task.group_id)
            .bind(task.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "WITH t AS ( \
                 UPDATE tasks SET title = $1, description = $2, due_date = $3, completed = $4, \
                                  updated_at = $5, group_id = $6 \
                 WHERE id = $7 RETURNING * \
             ) SELECT {} FROM t {}",
            TASK_COLUMNS, TASK_JOIN
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.completed)
            .bind(task.updated_at)
            .bind(task.group_id)
            .bind(task.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
