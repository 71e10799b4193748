mod common;

use anyhow::Result;
use campus_api::database::models::PrerequisiteEdge;
use campus_api::types::{AuditAction, AuditEntity};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

struct Catalog {
    server: common::TestServer,
    a: Uuid,
    b: Uuid,
    c: Uuid,
}

/// Courses A, B, C with A requiring B and B requiring C.
async fn catalog() -> Result<Catalog> {
    let server = common::spawn_server().await?;
    let campus_id = Uuid::new_v4();
    let a = server.store.add_course("A101", campus_id).await.id;
    let b = server.store.add_course("B101", campus_id).await.id;
    let c = server.store.add_course("C101", campus_id).await.id;
    server.store.add_edge(a, b).await;
    server.store.add_edge(b, c).await;
    Ok(Catalog { server, a, b, c })
}

fn path(course: Uuid) -> String {
    format!("/api/admin/course/{}/prerequisites", course)
}

#[tokio::test]
async fn cycle_is_rejected() -> Result<()> {
    let cat = catalog().await?;

    let res = cat.server.admin_post(&path(cat.c), &json!({ "prerequisiteId": cat.a })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "Adding this prerequisite would create a circular reference."
    );
    assert_eq!(cat.server.store.prerequisite_edges().await.len(), 2);
    assert!(cat.server.store.audit_entries().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn acyclic_prerequisite_is_created() -> Result<()> {
    let cat = catalog().await?;

    let res = cat.server.admin_post(&path(cat.a), &json!({ "prerequisiteId": cat.c })).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    let prerequisite = &body["data"]["prerequisite"];
    assert_eq!(prerequisite["courseId"], cat.a.to_string());
    assert_eq!(prerequisite["prerequisiteId"], cat.c.to_string());
    assert_eq!(prerequisite["prerequisite"]["code"], "C101");

    assert!(cat
        .server
        .store
        .prerequisite_edges()
        .await
        .contains(&PrerequisiteEdge::new(cat.a, cat.c)));

    let audit = cat.server.store.audit_entries().await;
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::Create);
    assert_eq!(audit[0].entity_type, AuditEntity::CoursePrerequisite);
    assert_eq!(audit[0].entity_id, format!("{}_{}", cat.a, cat.c));
    Ok(())
}

#[tokio::test]
async fn self_duplicate_and_missing() -> Result<()> {
    let cat = catalog().await?;

    let res = cat.server.admin_post(&path(cat.a), &json!({ "prerequisiteId": cat.a })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "A course cannot be its own prerequisite.");

    let res = cat.server.admin_post(&path(cat.a), &json!({ "prerequisiteId": cat.b })).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "This prerequisite is already added to the course."
    );

    let res = cat.server.admin_post(&path(cat.a), &json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Prerequisite ID is required.");

    let res = cat
        .server
        .admin_post(&path(cat.a), &json!({ "prerequisiteId": Uuid::new_v4() }))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Prerequisite course not found.");

    let res = cat
        .server
        .admin_post(&path(Uuid::new_v4()), &json!({ "prerequisiteId": cat.a }))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Course not found.");
    Ok(())
}

#[tokio::test]
async fn removing_then_reversing_an_edge() -> Result<()> {
    let cat = catalog().await?;

    let res = cat
        .server
        .admin_delete(&format!("{}/{}", path(cat.b), cat.c))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let audit = cat.server.store.audit_entries().await;
    assert_eq!(audit[0].action, AuditAction::Delete);
    assert_eq!(audit[0].entity_id, format!("{}_{}", cat.b, cat.c));

    let res = cat
        .server
        .admin_delete(&format!("{}/{}", path(cat.b), cat.c))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Prerequisite relationship not found.");

    // With B -> C gone, C may now require A.
    let res = cat.server.admin_post(&path(cat.c), &json!({ "prerequisiteId": cat.a })).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn concurrent_reverse_edges_cannot_both_land() -> Result<()> {
    let server = common::spawn_server().await?;
    let campus_id = Uuid::new_v4();
    let x = server.store.add_course("X101", campus_id).await.id;
    let y = server.store.add_course("Y101", campus_id).await.id;

    let forward_body = json!({ "prerequisiteId": y });
    let backward_body = json!({ "prerequisiteId": x });
    let forward_path = path(x);
    let backward_path = path(y);
    let (forward, backward) = tokio::join!(
        server.admin_post(&forward_path, &forward_body),
        server.admin_post(&backward_path, &backward_body),
    );

    let statuses = [forward?.status(), backward?.status()];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 1);
    assert_eq!(server.store.prerequisite_edges().await.len(), 1);
    Ok(())
}
