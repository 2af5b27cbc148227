//! The action table: every endpoint is one [`Action`], and every action requires exactly
//! one [`Capability`].

use std::fmt;

/// What a caller must be in order to perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// No authentication needed.
    Anyone,
    /// Any authenticated user.
    Authenticated,
    /// An authenticated user who owns the target resource, or a superuser.
    OwnerOrSuperuser,
}

/// The resource types the access layer reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Task,
    Group,
    User,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceKind::Task => write!(f, "task"),
            ResourceKind::Group => write!(f, "group"),
            ResourceKind::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,

    ListTasks,
    RetrieveTask,
    CreateTask,
    UpdateTask,
    PartialUpdateTask,
    DestroyTask,
    ToggleCompleted,
    ListCompleted,
    ListPending,

    ListGroups,
    RetrieveGroup,
    CreateGroup,
    UpdateGroup,
    PartialUpdateGroup,
    DestroyGroup,
    GroupTasks,

    ListUsers,
    CreateUser,
    CurrentUser,
}

impl Action {
    pub const fn required_capability(self) -> Capability {
        match self {
            Action::Register | Action::Login | Action::CreateUser => Capability::Anyone,

            Action::ListTasks
            | Action::RetrieveTask
            | Action::CreateTask
            | Action::ListCompleted
            | Action::ListPending
            | Action::ListGroups
            | Action::RetrieveGroup
            | Action::CreateGroup
            | Action::GroupTasks
            | Action::ListUsers
            | Action::CurrentUser => Capability::Authenticated,

            Action::UpdateTask
            | Action::PartialUpdateTask
            | Action::DestroyTask
            | Action::ToggleCompleted
            | Action::UpdateGroup
            | Action::PartialUpdateGroup
            | Action::DestroyGroup => Capability::OwnerOrSuperuser,
        }
    }

    pub const fn resource(self) -> ResourceKind {
        match self {
            Action::ListTasks
            | Action::RetrieveTask
            | Action::CreateTask
            | Action::UpdateTask
            | Action::PartialUpdateTask
            | Action::DestroyTask
            | Action::ToggleCompleted
            | Action::ListCompleted
            | Action::ListPending => ResourceKind::Task,

            Action::ListGroups
            | Action::RetrieveGroup
            | Action::CreateGroup
            | Action::UpdateGroup
            | Action::PartialUpdateGroup
            | Action::DestroyGroup
            | Action::GroupTasks => ResourceKind::Group,

            Action::Register
            | Action::Login
            | Action::ListUsers
            | Action::CreateUser
            | Action::CurrentUser => ResourceKind::User,
        }
    }

    /// The verb used in denial messages, e.g. "delete" in "You do not have permission to
    /// delete this task."
    pub const fn verb(self) -> &'static str {
        match self {
            Action::UpdateTask
            | Action::PartialUpdateTask
            | Action::UpdateGroup
            | Action::PartialUpdateGroup => "update",
            Action::DestroyTask | Action::DestroyGroup => "delete",
            Action::ToggleCompleted => "toggle",
            Action::CreateTask | Action::CreateGroup | Action::CreateUser | Action::Register => {
                "create"
            }
            Action::Login => "log in as",
            Action::ListTasks
            | Action::RetrieveTask
            | Action::ListCompleted
            | Action::ListPending
            | Action::ListGroups
            | Action::RetrieveGroup
            | Action::GroupTasks
            | Action::ListUsers
            | Action::CurrentUser => "view",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
