//! HTTP Gateway Integration Tests
//!
//! Runs `HttpGateway` against an in-process axum server.

#[cfg(test)]
mod tests {
    use crate::domain::{NewMember, NewProject, NewTeam, ProjectStatus};
    use crate::gateway::{Gateway, GatewayError, HttpGateway};
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_server() -> (HttpGateway, Recorded) {
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route(
                "/projects",
                get(|| async { Json(json!([{"_id": "p1", "name": "Alpha", "status": "In Progress"}])) })
                    .post(|State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                        rec.lock().await.push(("POST /projects".to_string(), body.clone()));
                        let mut created = body;
                        created["_id"] = json!("p-new");
                        (StatusCode::CREATED, Json(created))
                    }),
            )
            .route(
                "/projects/:id",
                patch(|State(rec): State<Recorded>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    rec.lock().await.push((format!("PATCH /projects/{}", id), body));
                    Json(json!({"ok": true}))
                }),
            )
            .route(
                "/tasks",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable") }),
            )
            .route(
                "/teams",
                get(|| async { "<html>not json</html>" }).post(
                    |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                        rec.lock().await.push(("POST /teams".to_string(), body.clone()));
                        let mut created = body;
                        created["_id"] = json!("m-new");
                        Json(created)
                    },
                ),
            )
            .route(
                "/teams/:id/members",
                post(|State(rec): State<Recorded>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    rec.lock().await.push((format!("POST /teams/{}/members", id), body));
                    StatusCode::NO_CONTENT
                }),
            )
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let gateway = HttpGateway::new(format!("http://{}", addr)).unwrap();
        (gateway, recorded)
    }

    #[tokio::test]
    async fn test_list_projects() {
        let (gateway, _) = spawn_server().await;
        let projects = gateway.list_projects().await.expect("list failed");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p1");
        assert_eq!(projects[0].status, Some(ProjectStatus::InProgress));
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_rejected() {
        let (gateway, _) = spawn_server().await;
        match gateway.list_tasks().await {
            Err(GatewayError::ServerRejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "database unavailable");
            }
            other => panic!("expected ServerRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (gateway, _) = spawn_server().await;
        assert!(matches!(gateway.list_teams().await, Err(GatewayError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(format!("http://{}", addr)).unwrap();
        assert!(matches!(gateway.list_projects().await, Err(GatewayError::Network(_))));
    }

    #[tokio::test]
    async fn test_create_project_returns_server_id() {
        let (gateway, recorded) = spawn_server().await;
        let draft = NewProject::new("Beta", Some("Second".to_string()));
        let created = gateway.create_project(&draft).await.expect("create failed");
        assert_eq!(created.id, "p-new");
        assert_eq!(created.name, "Beta");

        let calls = recorded.lock().await;
        assert_eq!(calls[0].0, "POST /projects");
        assert_eq!(calls[0].1, json!({"name": "Beta", "description": "Second"}));
    }

    #[tokio::test]
    async fn test_create_team_sends_member_objects() {
        let (gateway, recorded) = spawn_server().await;
        let draft = NewTeam::new("Eng", ["Ann", "", "Bob"]);
        let team = gateway.create_team(&draft).await.expect("create failed");
        assert_eq!(team.id, "m-new");
        assert_eq!(team.members.len(), 2);

        let calls = recorded.lock().await;
        assert_eq!(calls[0].1, json!({"name": "Eng", "members": [{"name": "Ann"}, {"name": "Bob"}]}));
    }

    #[tokio::test]
    async fn test_update_status_and_add_member() {
        let (gateway, recorded) = spawn_server().await;
        gateway
            .update_project_status("p1", ProjectStatus::Completed)
            .await
            .expect("patch failed");
        gateway
            .add_team_member("m1", &NewMember::new("Cy").unwrap())
            .await
            .expect("add member failed");

        let calls = recorded.lock().await;
        assert_eq!(calls[0], ("PATCH /projects/p1".to_string(), json!({"status": "Completed"})));
        assert_eq!(calls[1], ("POST /teams/m1/members".to_string(), json!({"name": "Cy"})));
    }
}
