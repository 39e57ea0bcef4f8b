//! Upload against a mock artifact service: container creation, file PUTs and
//! size finalization.

mod support;

use artifact_transfer::{ArtifactError, RemoteError, UploadOptions};
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use support::{artifacts_path, container_url, http_client};
use tempfile::TempDir;
use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn write_file(root: &std::path::Path, relative: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_upload_build_output_creates_sends_and_finalizes() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 7);

    Mock::given(method("POST"))
        .and(path(artifacts_path()))
        .and(query_param("api-version", "6.0-preview"))
        .and(body_json(json!({ "Type": "actions_storage", "Name": "build-output" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/_apis/resources/Containers/7"))
        .and(query_param("itemPath", "build-output/a.txt"))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(b"hello".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/_apis/resources/Containers/7"))
        .and(query_param("itemPath", "build-output/sub/b.txt"))
        .and(body_bytes(b"world!!".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(artifacts_path()))
        .and(query_param("artifactName", "build-output"))
        .and(body_json(json!({ "size": 12 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let a = write_file(root.path(), "a.txt", b"hello");
    let b = write_file(root.path(), "sub/b.txt", b"world!!");

    let report = http_client(&server, None)
        .upload("build-output", &[&a, &b], root.path(), &UploadOptions::default())
        .await
        .unwrap();

    assert_eq!(report.artifact_name, "build-output");
    assert_eq!(report.artifact_items, vec![a, b]);
    assert_eq!(report.size, 12);
    assert_eq!(report.attempted, 2);
    assert!(report.failed_items.is_empty());
}

#[tokio::test]
async fn test_upload_sends_bearer_token_when_configured() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 3);

    Mock::given(method("POST"))
        .and(path(artifacts_path()))
        .and(header("authorization", "Bearer run-token"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(header("authorization", "Bearer run-token"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(header("authorization", "Bearer run-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "only.txt", b"x");

    let report = http_client(&server, Some("run-token"))
        .upload("dist", &[&file], root.path(), &UploadOptions::default())
        .await
        .unwrap();

    assert!(report.is_complete_success());
}

#[tokio::test]
async fn test_upload_retries_transient_failure_once() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 5);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(body_json(json!({ "size": 4 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "flaky.bin", b"data");

    let report = http_client(&server, None)
        .upload("dist", &[&file], root.path(), &UploadOptions::default())
        .await
        .unwrap();

    assert_eq!(report.retried, 1);
    assert_eq!(report.size, 4);
    assert!(report.failed_items.is_empty());
}

#[tokio::test]
async fn test_upload_rejected_file_is_reported_and_size_still_finalized() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 8);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(query_param("itemPath", "dist/bad.txt"))
        .respond_with(ResponseTemplate::new(400).set_body_string("rejected"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(body_json(json!({ "size": 3 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let good = write_file(root.path(), "good.txt", b"abc");
    let bad = write_file(root.path(), "bad.txt", b"defgh");

    let report = http_client(&server, None)
        .upload("dist", &[&good, &bad], root.path(), &UploadOptions::default())
        .await
        .unwrap();

    assert_eq!(report.failed_items.len(), 1);
    assert_eq!(report.failed_items[0].item.local_path, bad);
    assert_eq!(report.failed_items[0].attempts, 1);
    assert_eq!(report.size, 3);
}

#[tokio::test]
async fn test_upload_without_container_url_is_fatal() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "a.txt", b"a");

    let result = http_client(&server, None)
        .upload("dist", &[&file], root.path(), &UploadOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(ArtifactError::Remote(RemoteError::ContainerCreation { .. }))
    ));
}

#[tokio::test]
async fn test_upload_non_json_container_response_keeps_body() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "a.txt", b"a");

    let result = http_client(&server, None)
        .upload("dist", &[&file], root.path(), &UploadOptions::default())
        .await;

    match result {
        Err(ArtifactError::Remote(e @ RemoteError::ContainerCreation { .. })) => {
            assert_eq!(e.raw_body(), Some("<html>gateway</html>"));
        }
        other => panic!("expected ContainerCreation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_multi_mebibyte_file_reports_full_size() {
    const SIZE: usize = 4 * 1024 * 1024;

    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 11);
    let contents: Vec<u8> = (0..SIZE).map(|i| (i % 251) as u8).collect();

    Mock::given(method("POST"))
        .and(path(artifacts_path()))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/_apis/resources/Containers/11"))
        .and(query_param("itemPath", "large/blob.bin"))
        .and(header("content-length", SIZE.to_string().as_str()))
        .and(body_bytes(contents.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(artifacts_path()))
        .and(query_param("artifactName", "large"))
        .and(body_json(json!({ "size": SIZE })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "blob.bin", &contents);

    let report = http_client(&server, None)
        .upload("large", &[&file], root.path(), &UploadOptions::default())
        .await
        .unwrap();

    assert_eq!(report.size, SIZE as u64);
    assert!(report.failed_items.is_empty());
}

#[tokio::test]
async fn test_upload_finalization_failure_is_fatal() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 2);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad size"))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let file = write_file(root.path(), "a.txt", b"a");

    let result = http_client(&server, None)
        .upload("dist", &[&file], root.path(), &UploadOptions::default())
        .await;

    match result {
        Err(ArtifactError::Remote(RemoteError::SizeFinalization { status, body, .. })) => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad size");
        }
        other => panic!("expected size finalization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_fail_fast_aborts_remaining_files() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let resource_url = container_url(&server, 4);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fileContainerResourceUrl": resource_url })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(body_json(json!({ "size": 0 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let files: Vec<_> = (0..4)
        .map(|i| write_file(root.path(), &format!("{i}.txt"), b"x"))
        .collect();

    let client = {
        let mut settings = support::fast_settings();
        settings.upload_file_concurrency = 1;
        let env = support::environment(&server, None);
        let store = artifact_transfer::HttpArtifactStore::new(
            env.artifacts_url().unwrap(),
            None,
            artifact_transfer::HttpTimeouts::default(),
        )
        .unwrap();
        artifact_transfer::ArtifactClient::new(std::sync::Arc::new(store), settings)
    };
    let options = UploadOptions {
        continue_on_error: false,
    };

    let report = client
        .upload("dist", &files, root.path(), &options)
        .await
        .unwrap();

    assert_eq!(report.attempted, 4);
    assert_eq!(report.failed_items.len(), 4);
    let aborted = report
        .failed_items
        .iter()
        .filter(|failed| failed.attempts == 0)
        .count();
    assert_eq!(aborted, 3);
}
