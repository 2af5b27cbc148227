use crate::{
    access::{Access, Action, Scope},
    auth::Identity,
    error::AppError,
    models::{Group, GroupInput, GroupPatch, TaskFilter},
    store::Store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

async fn fetch_group(store: &dyn Store, id: Uuid) -> Result<Group, AppError> {
    store
        .find_group(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Group not found".into()))
}

async fn visible_group(store: &dyn Store, scope: Scope, id: Uuid) -> Result<Group, AppError> {
    let group = fetch_group(store, id).await?;
    if scope.admits(&group) {
        Ok(group)
    } else {
        Err(AppError::NotFound("Group not found".into()))
    }
}

/// Groups visible to the caller, ordered by name.
#[get("/")]
pub async fn list_groups(
    store: web::Data<dyn Store>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::ListGroups).await?;
    let groups = store.list_groups(access.scope()?).await?;
    Ok(HttpResponse::Ok().json(groups))
}

#[post("/")]
pub async fn create_group(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_data: web::Json<GroupInput>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::CreateGroup).await?;
    group_data.validate()?;

    let group = access.assign_owner(group_data.into_inner())?;
    let created = store.insert_group(&group).await?;
    log::info!("user {:?} created group {}", created.owner_id, created.id);

    Ok(HttpResponse::Created().json(created))
}

#[get("/{id}/")]
pub async fn get_group(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::RetrieveGroup).await?;
    let group = visible_group(store.get_ref(), access.scope()?, group_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(group))
}

#[put("/{id}/")]
pub async fn update_group(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_id: web::Path<Uuid>,
    group_data: web::Json<GroupInput>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::UpdateGroup).await?;
    let mut group = fetch_group(store.get_ref(), group_id.into_inner()).await?;
    access.authorize(&group)?;
    group_data.validate()?;

    group.apply(group_data.into_inner());
    let updated = store.update_group(&group).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[patch("/{id}/")]
pub async fn partial_update_group(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_id: web::Path<Uuid>,
    patch_data: web::Json<GroupPatch>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::PartialUpdateGroup).await?;
    let mut group = fetch_group(store.get_ref(), group_id.into_inner()).await?;
    access.authorize(&group)?;
    patch_data.validate()?;

    group.apply_patch(patch_data.into_inner());
    let updated = store.update_group(&group).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a group. Its tasks survive with their group reference cleared.
#[delete("/{id}/")]
pub async fn delete_group(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::DestroyGroup).await?;
    let group = fetch_group(store.get_ref(), group_id.into_inner()).await?;
    access.authorize(&group)?;

    if !store.delete_group(group.id).await? {
        return Err(AppError::NotFound("Group not found".into()));
    }
    log::info!("deleted group {}", group.id);

    Ok(HttpResponse::NoContent().finish())
}

/// Tasks filed under a group, limited to the tasks the caller may see.
#[get("/{id}/tasks/")]
pub async fn group_tasks(
    store: web::Data<dyn Store>,
    identity: Identity,
    group_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::GroupTasks).await?;
    let scope = access.scope()?;
    let group = visible_group(store.get_ref(), scope, group_id.into_inner()).await?;

    let tasks = store
        .list_tasks(&TaskFilter::new(scope).in_group(group.id))
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}
