use crate::{
    access::{filter_by_completion, Access, Action, Scope},
    auth::Identity,
    error::AppError,
    models::{Task, TaskFilter, TaskInput, TaskPatch, TaskQuery},
    store::Store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

pub(crate) async fn fetch_task(store: &dyn Store, id: Uuid) -> Result<Task, AppError> {
    store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Loads a task the caller may see. Tasks outside the caller's scope are reported as missing.
async fn visible_task(store: &dyn Store, scope: Scope, id: Uuid) -> Result<Task, AppError> {
    let task = fetch_task(store, id).await?;
    if scope.admits(&task) {
        Ok(task)
    } else {
        Err(AppError::NotFound("Task not found".into()))
    }
}

/// Rejects a reference to a group that does not exist.
async fn ensure_group_exists(store: &dyn Store, group_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(id) = group_id {
        if store.find_group(id).await?.is_none() {
            return Err(AppError::ValidationError(format!(
                "group: Invalid pk \"{}\" - object does not exist.",
                id
            )));
        }
    }
    Ok(())
}

/// Drops the joined name of a group the caller cannot see. The group id is kept.
async fn conceal_foreign_group(
    store: &dyn Store,
    scope: Scope,
    mut task: Task,
) -> Result<Task, AppError> {
    if let (Some(group_id), Scope::OwnedBy(_)) = (task.group_id, scope) {
        let visible = store
            .find_group(group_id)
            .await?
            .is_some_and(|group| scope.admits(&group));
        if !visible {
            task.group_name = None;
        }
    }
    Ok(task)
}

async fn conceal_foreign_groups(
    store: &dyn Store,
    scope: Scope,
    mut tasks: Vec<Task>,
) -> Result<Vec<Task>, AppError> {
    if scope == Scope::All || tasks.iter().all(|task| task.group_id.is_none()) {
        return Ok(tasks);
    }
    let visible: HashSet<Uuid> = store
        .list_groups(scope)
        .await?
        .into_iter()
        .map(|group| group.id)
        .collect();
    for task in &mut tasks {
        if task.group_id.is_some_and(|id| !visible.contains(&id)) {
            task.group_name = None;
        }
    }
    Ok(tasks)
}

/// Lists the tasks visible to the caller, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `group` (optional): only tasks filed under this group.
/// - `search` (optional): case-insensitive match against title and description.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: no valid token.
#[get("/")]
pub async fn list_tasks(
    store: web::Data<dyn Store>,
    identity: Identity,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::ListTasks).await?;
    let scope = access.scope()?;
    let tasks = store
        .list_tasks(&TaskFilter::from_query(scope, query.into_inner()))
        .await?;
    let tasks = conceal_foreign_groups(store.get_ref(), scope, tasks).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: no valid token.
/// - `422 Unprocessable Entity`: invalid fields or unknown `group`.
#[post("/")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::CreateTask).await?;
    task_data.validate()?;
    ensure_group_exists(store.get_ref(), task_data.group_id).await?;

    let task = access.assign_owner(task_data.into_inner())?;
    let created = store.insert_task(&task).await?;
    log::info!("user {} created task {}", created.owner_id, created.id);
    let created = conceal_foreign_group(store.get_ref(), access.scope()?, created).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn list_by_completion(
    store: &dyn Store,
    identity: &Identity,
    action: Action,
    completed: bool,
) -> Result<HttpResponse, AppError> {
    let access = Access::evaluate(store, identity, action).await?;
    let scope = access.scope()?;
    let visible = store.list_tasks(&TaskFilter::new(scope)).await?;
    let tasks = filter_by_completion(visible, completed);
    Ok(HttpResponse::Ok().json(conceal_foreign_groups(store, scope, tasks).await?))
}

/// Completed tasks visible to the caller.
#[get("/completed/")]
pub async fn list_completed(
    store: web::Data<dyn Store>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    list_by_completion(store.get_ref(), &identity, Action::ListCompleted, true).await
}

/// Pending tasks visible to the caller.
#[get("/pending/")]
pub async fn list_pending(
    store: web::Data<dyn Store>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    list_by_completion(store.get_ref(), &identity, Action::ListPending, false).await
}

/// Retrieves a task by id.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[get("/{id}/")]
pub async fn get_task(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::RetrieveTask).await?;
    let scope = access.scope()?;
    let task = visible_task(store.get_ref(), scope, task_id.into_inner()).await?;
    let task = conceal_foreign_group(store.get_ref(), scope, task).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces all writable fields of a task.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden`: the caller neither owns the task nor is a superuser.
/// - `404 Not Found`: no such task.
/// - `422 Unprocessable Entity`: invalid fields or unknown `group`.
#[put("/{id}/")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::UpdateTask).await?;
    let mut task = fetch_task(store.get_ref(), task_id.into_inner()).await?;
    access.authorize(&task)?;

    task_data.validate()?;
    ensure_group_exists(store.get_ref(), task_data.group_id).await?;

    task.apply(task_data.into_inner());
    let updated = store.update_task(&task).await?;
    let updated = conceal_foreign_group(store.get_ref(), access.scope()?, updated).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Updates only the fields present in the body. An explicit `null` clears `due_date` or
/// `group`.
#[patch("/{id}/")]
pub async fn partial_update_task(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_id: web::Path<Uuid>,
    patch_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::PartialUpdateTask).await?;
    let mut task = fetch_task(store.get_ref(), task_id.into_inner()).await?;
    access.authorize(&task)?;

    patch_data.validate()?;
    ensure_group_exists(store.get_ref(), patch_data.referenced_group()).await?;

    task.apply_patch(patch_data.into_inner());
    let updated = store.update_task(&task).await?;
    let updated = conceal_foreign_group(store.get_ref(), access.scope()?, updated).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `403 Forbidden`: the caller neither owns the task nor is a superuser.
/// - `404 Not Found`: no such task.
#[delete("/{id}/")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::DestroyTask).await?;
    let task = fetch_task(store.get_ref(), task_id.into_inner()).await?;
    access.authorize(&task)?;

    if !store.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    log::info!("deleted task {}", task.id);

    Ok(HttpResponse::NoContent().finish())
}

/// Flips a task between pending and completed and returns it.
#[post("/{id}/toggle_completed/")]
pub async fn toggle_completed(
    store: web::Data<dyn Store>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::ToggleCompleted).await?;
    let mut task = fetch_task(store.get_ref(), task_id.into_inner()).await?;
    access.authorize(&task)?;

    task.toggle_completed();
    let updated = store.update_task(&task).await?;
    let updated = conceal_foreign_group(store.get_ref(), access.scope()?, updated).await?;
    Ok(HttpResponse::Ok().json(updated))
}
