pub mod group;
pub mod task;
pub mod user;

pub use group::{Group, GroupInput, GroupPatch};
pub use task::{Task, TaskFilter, TaskInput, TaskPatch, TaskQuery};
pub use user::{NewUser, User, UserCredentials};

use serde::{Deserialize, Deserializer};

/// Lets a PATCH field tell "absent" (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
