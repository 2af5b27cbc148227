mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskhub::models::Group;
use taskhub::store::Store;

use common::{build_app, new_store, seed_user, send, TestUser};

async fn create_group(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    owner: &TestUser,
    name: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/groups/")
        .insert_header(owner.bearer())
        .set_json(&json!({"name": name, "description": format!("{} things", name)}))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Group creation failed: {}", body);
    assert_eq!(body["owner"], owner.id());
    body["id"].as_str().expect("id is a string").to_string()
}

fn names(groups: &Value) -> Vec<&str> {
    groups
        .as_array()
        .expect("Expected a JSON array")
        .iter()
        .filter_map(|group| group["name"].as_str())
        .collect()
}

#[actix_rt::test]
async fn test_group_crud_flow() {
    let store = new_store();
    let alice = seed_user(&store, "alice", false).await;
    let app = test::init_service(build_app(store.clone())).await;

    let work = create_group(&app, &alice, "Work").await;
    create_group(&app, &alice, "Home").await;

    let req = test::TestRequest::get()
        .uri("/api/groups/")
        .insert_header(alice.bearer())
        .to_request();
    let (status, groups) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&groups), vec!["Home", "Work"]);

    let uri = format!("/api/groups/{}/", work);
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(alice.bearer())
        .set_json(&json!({"name": "Office"}))
        .to_request();
    let (status, replaced) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["name"], "Office");
    assert_eq!(replaced["description"], Value::Null, "PUT replaces every field");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(alice.bearer())
        .set_json(&json!({"description": "Nine to five"}))
        .to_request();
    let (status, patched) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Office");
    assert_eq!(patched["description"], "Nine to five");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(alice.bearer())
        .to_request();
    let (status, fetched) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Group = serde_json::from_value(fetched).unwrap();
    assert_eq!(fetched.name, "Office");
    assert_eq!(fetched.owner_id, Some(alice.id()));

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(alice.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(alice.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Group not found");
}

#[actix_rt::test]
async fn test_deleting_group_keeps_its_tasks() {
    let store = new_store();
    let alice = seed_user(&store, "alice", false).await;
    let app = test::init_service(build_app(store.clone())).await;

    let group = create_group(&app, &alice, "Garden").await;
    let req = test::TestRequest::post()
        .uri("/api/tasks/")
        .insert_header(alice.bearer())
        .set_json(&json!({"title": "Mow", "description": "Front lawn", "group": group}))
        .to_request();
    let (status, task) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/groups/{}/", group))
        .insert_header(alice.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}/", task["id"].as_str().unwrap()))
        .insert_header(alice.bearer())
        .to_request();
    let (status, task) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Mow");
    assert_eq!(task["group"], Value::Null);
    assert_eq!(task["group_name"], Value::Null);
}

#[actix_rt::test]
async fn test_group_tasks_only_lists_visible_tasks() {
    let store = new_store();
    let alice = seed_user(&store, "alice", false).await;
    let bob = seed_user(&store, "bob", false).await;
    let admin = seed_user(&store, "admin", true).await;
    let app = test::init_service(build_app(store.clone())).await;

    let group = create_group(&app, &alice, "Shared").await;
    for (user, title) in [(&alice, "Alice's"), (&bob, "Bob's")] {
        let req = test::TestRequest::post()
            .uri("/api/tasks/")
            .insert_header(user.bearer())
            .set_json(&json!({"title": title, "description": "x", "group": group}))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/groups/{}/tasks/", group);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(alice.bearer())
        .to_request();
    let (status, tasks) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Alice's");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(admin.bearer())
        .to_request();
    let (_, tasks) = send(&app, req).await;
    assert_eq!(tasks.as_array().unwrap().len(), 2);

    // Bob filed a task under the group but cannot see the group itself.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bob.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_only_owner_or_superuser_changes_group() {
    let store = new_store();
    let alice = seed_user(&store, "alice", false).await;
    let bob = seed_user(&store, "bob", false).await;
    let admin = seed_user(&store, "admin", true).await;
    let app = test::init_service(build_app(store.clone())).await;

    let group = create_group(&app, &alice, "Private").await;
    let uri = format!("/api/groups/{}/", group);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bob.bearer())
        .set_json(&json!({"name": "Mine now"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "You do not have permission to update this group."
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bob.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/groups/")
        .insert_header(bob.bearer())
        .to_request();
    let (_, groups) = send(&app, req).await;
    assert_eq!(groups, json!([]));

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(admin.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_ownerless_group_is_superuser_only() {
    let store = new_store();
    let alice = seed_user(&store, "alice", false).await;
    let admin = seed_user(&store, "admin", true).await;
    let legacy = store
        .insert_group(&Group {
            id: uuid::Uuid::new_v4(),
            name: "Legacy".to_string(),
            description: None,
            created_at: chrono::Utc::now(),
            owner_id: None,
        })
        .await
        .unwrap();
    let app = test::init_service(build_app(store.clone())).await;
    let uri = format!("/api/groups/{}/", legacy.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(alice.bearer())
        .set_json(&json!({"name": "Claimed"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(admin.bearer())
        .set_json(&json!({"name": "Archive"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Archive");
    assert_eq!(body["owner"], Value::Null);
}

#[actix_rt::test]
async fn test_groups_require_authentication() {
    let store = new_store();
    let app = test::init_service(build_app(store.clone())).await;

    let req = test::TestRequest::get().uri("/api/groups/").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/groups/")
        .set_json(&json!({"name": "Nope"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
