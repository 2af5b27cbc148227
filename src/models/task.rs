use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::double_option;
use crate::access::{Owned, OwnedDraft, Scope};

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    pub description: String,
    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,
    /// `false` while pending, `true` once completed.
    pub completed: bool,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last write to the task.
    pub updated_at: DateTime<Utc>,
    /// The group this task is filed under, if any.
    #[serde(rename = "group")]
    pub group_id: Option<Uuid>,
    /// Read-only name of the referenced group, filled in when the task is loaded.
    pub group_name: Option<String>,
    /// Identifier of the user who owns the task.
    #[serde(rename = "owner")]
    pub owner_id: i32,
}

/// Input structure for creating a task or replacing all of its writable fields (PUT).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Required and may not be blank.
    #[validate(length(min = 1))]
    pub description: String,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed: bool,

    #[serde(rename = "group", default)]
    pub group_id: Option<Uuid>,
}

/// Partial update (PATCH). Absent fields are left alone; an explicit `null` clears
/// `due_date` or `group`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    pub completed: Option<bool>,

    #[serde(rename = "group", default, deserialize_with = "double_option")]
    pub group_id: Option<Option<Uuid>>,
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub group: Option<Uuid>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}

/// A fully resolved task listing request: the caller's scope plus any narrowing.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub scope: Scope,
    pub completed: Option<bool>,
    pub group_id: Option<Uuid>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            completed: None,
            group_id: None,
            search: None,
        }
    }

    pub fn from_query(scope: Scope, query: TaskQuery) -> Self {
        Self {
            scope,
            completed: query.completed,
            group_id: query.group,
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// The predicate a SQL store expresses in its `WHERE` clause.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.scope.admits(task) {
            return false;
        }
        if self.completed.is_some_and(|completed| task.completed != completed) {
            return false;
        }
        if self.group_id.is_some() && task.group_id != self.group_id {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                task.title.to_lowercase().contains(&term)
                    || task.description.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

impl Task {
    /// Flips the completion flag. Two toggles restore the original state.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }

    /// Replaces every writable field (PUT semantics).
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.completed = input.completed;
        self.set_group(input.group_id);
        self.touch();
    }

    pub fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(group_id) = patch.group_id {
            self.set_group(group_id);
        }
        self.touch();
    }

    fn set_group(&mut self, group_id: Option<Uuid>) {
        if self.group_id != group_id {
            self.group_id = group_id;
            // Refreshed by the store on the next read.
            self.group_name = None;
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Owned for Task {
    fn owner_id(&self) -> Option<i32> {
        Some(self.owner_id)
    }
}

impl OwnedDraft for TaskInput {
    type Record = Task;

    fn into_record(self, owner_id: i32) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            completed: self.completed,
            created_at: now,
            updated_at: now,
            group_id: self.group_id,
            group_name: None,
            owner_id,
        }
    }
}

impl TaskPatch {
    /// The group the patch points the task at, if it sets one.
    pub fn referenced_group(&self) -> Option<Uuid> {
        self.group_id.flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: "Test Description".to_string(),
            due_date: Some(Utc::now()),
            completed: false,
            group_id: None,
        }
    }

    #[test]
    fn test_task_creation() {
        let task = input("Test Task").into_record(1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.owner_id, 1);
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut blank_description = input("Valid Task");
        blank_description.description = String::new();
        assert!(blank_description.validate().is_err());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut task = input("Toggle").into_record(1);
        let original = task.completed;
        task.toggle_completed();
        assert_ne!(task.completed, original);
        task.toggle_completed();
        assert_eq!(task.completed, original);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let group = Uuid::new_v4();
        let mut task = input("Patch me").into_record(1);
        task.group_id = Some(group);

        let absent: TaskPatch = serde_json::from_value(json!({ "title": "Renamed" })).unwrap();
        task.apply_patch(absent);
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.group_id, Some(group));
        assert!(task.due_date.is_some());

        let cleared: TaskPatch =
            serde_json::from_value(json!({ "group": null, "due_date": null })).unwrap();
        task.apply_patch(cleared);
        assert_eq!(task.group_id, None);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_json_field_names() {
        let task = input("Wire").into_record(5);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["owner"], 5);
        assert!(value.get("group").is_some());
        assert!(value.get("group_name").is_some());
        assert!(value.get("owner_id").is_none());
    }

    #[test]
    fn test_filter_matches_scope_completion_and_search() {
        let mut task = input("Buy milk").into_record(1);
        task.completed = true;

        let filter = TaskFilter::new(Scope::OwnedBy(1));
        assert!(filter.matches(&task));
        assert!(!TaskFilter::new(Scope::OwnedBy(2)).matches(&task));
        let done = TaskFilter {
            completed: Some(true),
            ..filter.clone()
        };
        assert!(done.matches(&task));
        let pending = TaskFilter {
            completed: Some(false),
            ..filter.clone()
        };
        assert!(!pending.matches(&task));

        let query = TaskQuery {
            search: Some("  MILK ".into()),
            ..TaskQuery::default()
        };
        assert!(TaskFilter::from_query(Scope::All, query).matches(&task));

        let query = TaskQuery {
            search: Some("bread".into()),
            ..TaskQuery::default()
        };
        assert!(!TaskFilter::from_query(Scope::All, query).matches(&task));
        assert!(!TaskFilter::new(Scope::All)
            .in_group(Uuid::new_v4())
            .matches(&task));
    }
}
