use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::payload::{IssueUpdate, NewIssue};
use super::{ApiError, ConnectOptions, TrackerApi, YouTrackClient};

fn client_for(server: &MockServer) -> YouTrackClient {
    YouTrackClient::new(&server.uri(), "perm:token", ConnectOptions::default()).unwrap()
}

#[tokio::test]
async fn connect_fetches_self_and_enum_bundles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("Authorization", "Bearer perm:token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1-1", "login": "jane", "fullName": "Jane Roe", "online": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/customFieldSettings/bundles/enum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "b1", "name": "Priorities", "values": [{"id": "v1", "name": "Critical", "ordinal": 0}]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = YouTrackClient::connect(&server.uri(), "perm:token", ConnectOptions::default())
        .await
        .unwrap();

    assert_eq!(client.self_user().unwrap().login, "jane");
    assert_eq!(client.enum_bundles().len(), 1);
    assert_eq!(client.enum_bundles()[0].values[0].name.as_deref(), Some("Critical"));
}

#[tokio::test]
async fn connect_swallows_enrichment_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/customFieldSettings/bundles/enum"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = YouTrackClient::connect(&server.uri(), "perm:token", ConnectOptions::default())
        .await
        .unwrap();

    assert!(client.self_user().is_none());
    assert!(client.enum_bundles().is_empty());
}

#[tokio::test]
async fn base_url_is_normalized() {
    let client = YouTrackClient::new("https://yt.example.com//", "t", ConnectOptions::default()).unwrap();
    assert_eq!(client.base_url(), "https://yt.example.com");
}

#[tokio::test]
async fn get_issues_passes_query_and_parses_issues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/issues"))
        .and(query_param("query", "project:{DEMO} for:Me "))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "2-1", "numberInProject": 1, "summary": "First",
             "project": {"id": "0-1", "shortName": "DEMO"}, "customFields": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let issues = client_for(&server)
        .get_issues("project:{DEMO} for:Me ")
        .await
        .unwrap();

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code(), "DEMO-1");
}

#[tokio::test]
async fn read_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agiles"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_agiles().await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn single_enum_update_posts_once_to_issue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/issues/2-17"))
        .and(body_json(json!({
            "customFields": [{
                "name": "Priority",
                "$type": "SingleEnumIssueCustomField",
                "value": {"name": "Critical", "$type": "EnumBundleElement"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2-17"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .update_issue_single_enum("2-17", "Priority", "Critical")
        .await
        .unwrap();
}

#[tokio::test]
async fn state_and_assignee_updates_share_issue_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/issues/2-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2-5"})))
        .expect(4)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.update_issue_state("2-5", "Fixed").await.unwrap();
    client.update_issue_assignee("2-5", "jane").await.unwrap();
    client.update_issue_summary("2-5", "Renamed").await.unwrap();
    client
        .update_issue(
            "2-5",
            &IssueUpdate {
                description: Some("New text".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn write_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/issues/2-5"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad state"))
        .mount(&server)
        .await;

    let result = client_for(&server).update_issue_state("2-5", "Nope").await;
    assert!(result.unwrap_err().to_string().contains("bad state"));
}

#[tokio::test]
async fn add_issue_returns_created_issue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/issues"))
        .and(body_json(json!({
            "summary": "Crash", "project": {"id": "0-1"}, "customFields": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "2-40", "numberInProject": 40, "summary": "Crash",
            "project": {"id": "0-1", "shortName": "DEMO"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issue = client_for(&server)
        .add_issue(&NewIssue::new("0-1", "Crash"))
        .await
        .unwrap();
    assert_eq!(issue.id, "2-40");
    assert_eq!(issue.code(), "DEMO-40");
}

#[tokio::test]
async fn add_issue_to_sprint_posts_issue_ref() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agiles/a-1/sprints/s-2/issues"))
        .and(body_json(json!({"id": "2-40", "$type": "Issue"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2-40"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .add_issue_to_sprint("a-1", "s-2", "2-40")
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_issue_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/issues/2-9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_issue("2-9").await.unwrap();
}

#[tokio::test]
async fn agile_listing_parses_nested_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "a-1",
            "name": "Board",
            "projects": [{"id": "0-1", "name": "Demo", "shortName": "DEMO"}],
            "sprints": [{"id": "s-1", "name": "Sprint 1", "start": 1700000000000_i64}],
            "columnSettings": {"columns": [{"isResolved": false, "fieldValues": [{"id": "f1", "name": "Open"}]}]},
            "sprintsSettings": {"disableSprints": false}
        }])))
        .mount(&server)
        .await;

    let agiles = client_for(&server).get_agiles().await.unwrap();
    assert_eq!(agiles[0].projects[0].query_name(), "DEMO");
    assert_eq!(agiles[0].sprints[0].start, Some(1_700_000_000_000));
    assert_eq!(
        agiles[0].column_settings.as_ref().unwrap().state_names(),
        vec!["Open"]
    );
}

#[tokio::test]
async fn agile_with_null_projects_does_not_fail_the_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "name": "Board", "projects": [{"id": "0-1"}]},
            {"id": "a-2", "name": "Empty", "projects": null, "sprints": null}
        ])))
        .mount(&server)
        .await;

    let agiles = client_for(&server).get_agiles().await.unwrap();
    assert_eq!(agiles.len(), 2);
    assert!(agiles[1].projects.is_empty());
}

#[tokio::test]
async fn users_states_and_projects_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1-1", "login": "jane", "fullName": "Jane Roe"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/customFieldSettings/bundles/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "sb", "values": [{"id": "v1", "name": "Open", "isResolved": false}]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "0-1", "name": "Demo", "archived": true}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.get_users().await.unwrap()[0].full_name, "Jane Roe");
    assert_eq!(client.get_states().await.unwrap()[0].values[0].name.as_deref(), Some("Open"));
    assert!(client.get_projects().await.unwrap()[0].archived);
}
