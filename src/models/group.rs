use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::double_option;
use crate::access::{Owned, OwnedDraft};

/// A named collection of tasks. Listed by name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Groups that predate ownership have no owner; only superusers may change those.
    #[serde(rename = "owner")]
    pub owner_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct GroupInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GroupPatch {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl Group {
    pub fn apply(&mut self, input: GroupInput) {
        self.name = input.name;
        self.description = input.description;
    }

    pub fn apply_patch(&mut self, patch: GroupPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

impl Owned for Group {
    fn owner_id(&self) -> Option<i32> {
        self.owner_id
    }
}

impl OwnedDraft for GroupInput {
    type Record = Group;

    fn into_record(self, owner_id: i32) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            created_at: Utc::now(),
            owner_id: Some(owner_id),
        }
    }
}
