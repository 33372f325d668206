//! Integration tests for the export coordinator
//!
//! The Figma API is faked; rendered assets are served by a mock HTTP server
//! and written into a temporary directory.

use async_trait::async_trait;
use figport::adapters::download::AssetDownloader;
use figport::adapters::figma::{
    ApiResponse, FigmaApi, GetFileResponse, GetImagesResponse, GetLocalVariablesResponse,
};
use figport::config::{parse_config, FigportConfig};
use figport::core::export::{
    build_instructions, compile_platforms, CoordinatorOptions, ExportCoordinator, ExportErrorType,
};
use figport::core::pipeline::PathLockRegistry;
use figport::core::state::{JsonFileProcessingRecord, NoOpProcessingRecord, ProcessingRecord};
use figport::domain::{ExportFormat, FigmaApiError, FileKey, Instruction, NodeId};
use mockito::Matcher;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

const FILE: &str = "FpKcPBk2q3wDhYzTfwBDq1";

#[derive(Default)]
struct FakeApi {
    versions: Mutex<HashMap<String, String>>,
    urls: HashMap<String, Option<String>>,
    image_requests: Mutex<Vec<usize>>,
}

impl FakeApi {
    fn with_version(self, key: &str, version: &str) -> Self {
        self.set_version(key, version);
        self
    }

    fn set_version(&self, key: &str, version: &str) {
        self.versions
            .lock()
            .unwrap()
            .insert(key.to_string(), version.to_string());
    }

    fn with_url(mut self, node_id: &str, url: Option<String>) -> Self {
        self.urls.insert(node_id.to_string(), url);
        self
    }

    fn image_requests(&self) -> Vec<usize> {
        self.image_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FigmaApi for FakeApi {
    async fn get_file(&self, key: &FileKey) -> ApiResponse<GetFileResponse> {
        let version = self.versions.lock().unwrap().get(key.as_str()).cloned();
        match version {
            Some(version) => Ok(GetFileResponse {
                name: "Brand".to_string(),
                version,
                last_modified: None,
                thumbnail_url: None,
                document: serde_json::Value::Null,
            }),
            None => Err(FigmaApiError::ClientError {
                status: 404,
                message: "Not found".to_string(),
            }),
        }
    }

    async fn get_images(
        &self,
        _key: &FileKey,
        ids: &[NodeId],
        _format: ExportFormat,
        _scale: f32,
        _contents_only: Option<bool>,
    ) -> ApiResponse<GetImagesResponse> {
        self.image_requests.lock().unwrap().push(ids.len());
        let images = ids
            .iter()
            .map(|id| {
                (
                    id.as_str().to_string(),
                    self.urls.get(id.as_str()).cloned().flatten(),
                )
            })
            .collect();
        Ok(GetImagesResponse {
            err: None,
            images,
            status: Some(200),
        })
    }

    async fn get_local_variables(&self, _key: &FileKey) -> ApiResponse<GetLocalVariablesResponse> {
        Err(FigmaApiError::Unavailable("not scripted".to_string()))
    }
}

fn config(output: &Path, assets: &[(&str, &str, &str)]) -> FigportConfig {
    let mut toml = format!(
        r#"
[figma]
access_token = "figd_test"

[export]
output_directory = "{}"

[[platforms]]
name = "web"
format = "svg"
"#,
        output.display().to_string().replace('\\', "/")
    );
    for (file_key, node_id, name) in assets {
        toml.push_str(&format!(
            "\n[[assets]]\nfile_key = \"{file_key}\"\nnode_id = \"{node_id}\"\nname = \"{name}\"\n"
        ));
    }
    parse_config(&toml).unwrap()
}

fn instructions(config: &FigportConfig) -> Vec<Instruction> {
    let locks = Arc::new(PathLockRegistry::new());
    let platforms = compile_platforms(config, &[], &locks).unwrap();
    build_instructions(config, &platforms).unwrap()
}

fn coordinator(
    api: Arc<FakeApi>,
    record: Arc<dyn ProcessingRecord>,
    batch_size: usize,
    dry_run: bool,
) -> ExportCoordinator {
    ExportCoordinator::new(
        api,
        AssetDownloader::new(Duration::from_secs(5)).unwrap(),
        record,
        CoordinatorOptions {
            parallel_instructions: 4,
            batch_size,
            dry_run,
        },
    )
}

#[tokio::test]
async fn test_failed_instruction_does_not_stop_siblings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/render/logo.svg")
        .with_status(200)
        .with_body("<svg/>")
        .create_async()
        .await;
    server
        .mock("GET", "/render/icon.svg")
        .with_status(403)
        .with_body("expired")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &[(FILE, "1:1", "logo"), (FILE, "1:2", "icon")]);
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "100")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url())))
            .with_url("1:2", Some(format!("{}/render/icon.svg", server.url()))),
    );

    let summary = coordinator(api, Arc::new(NoOpProcessingRecord), 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();

    assert_eq!(summary.total_instructions, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].error_type, ExportErrorType::Download);
    assert!(summary.errors[0]
        .context
        .as_deref()
        .unwrap()
        .ends_with("/icon"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("web").join("logo.svg")).unwrap(),
        "<svg/>"
    );
    assert!(!dir.path().join("web").join("icon.svg").exists());
}

#[tokio::test]
async fn test_unchanged_files_are_skipped_on_the_next_run() {
    let mut server = mockito::Server::new_async().await;
    let download = server
        .mock("GET", "/render/logo.svg")
        .with_status(200)
        .with_body("<svg/>")
        .expect(2)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("out"), &[(FILE, "1:1", "logo")]);
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "1")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url()))),
    );
    let record_path = dir.path().join(".figport").join("processed.json");
    let record = Arc::new(JsonFileProcessingRecord::open(&record_path).unwrap());

    let first = coordinator(api.clone(), record.clone(), 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();
    assert_eq!(first.successful, 1);
    assert!(record_path.exists());

    let second = coordinator(api.clone(), record.clone(), 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();
    assert_eq!(second.successful, 0);
    assert_eq!(second.skipped, 1);

    // A new file version invalidates the record
    api.set_version(FILE, "2");
    let third = coordinator(api, record, 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();
    assert_eq!(third.successful, 1);
    assert_eq!(third.skipped, 0);

    download.assert_async().await;
}

#[tokio::test]
async fn test_platforms_sharing_a_setting_are_tracked_separately() {
    let mut server = mockito::Server::new_async().await;
    let download = server
        .mock("GET", "/render/logo.svg")
        .with_status(200)
        .with_body("<svg/>")
        .expect(3)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let config = parse_config(&format!(
        r#"
[figma]
access_token = "figd_test"

[export]
output_directory = "{}"

[[platforms]]
name = "web"
format = "svg"

[[platforms]]
name = "docs"
directory = "blocked"
format = "svg"

[[assets]]
file_key = "{FILE}"
node_id = "1:1"
name = "logo"
"#,
        output.display().to_string().replace('\\', "/")
    ))
    .unwrap();
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "1")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url()))),
    );
    let record_path = dir.path().join(".figport").join("processed.json");
    let record = Arc::new(JsonFileProcessingRecord::open(&record_path).unwrap());

    // A regular file where the docs directory should be makes that pipeline fail
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("blocked"), "not a directory").unwrap();

    let first = coordinator(api.clone(), record.clone(), 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();
    assert_eq!(first.total_instructions, 2);
    assert_eq!(first.successful, 1);
    assert_eq!(first.failed, 1);
    assert_eq!(first.errors[0].error_type, ExportErrorType::Pipeline);
    assert!(first.errors[0].context.as_deref().unwrap().contains(":docs/"));

    std::fs::remove_file(output.join("blocked")).unwrap();

    let second = coordinator(api, record, 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();
    assert_eq!(second.skipped, 1);
    assert_eq!(second.successful, 1);
    assert_eq!(second.failed, 0);
    assert_eq!(
        std::fs::read_to_string(output.join("blocked").join("logo.svg")).unwrap(),
        "<svg/>"
    );

    download.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_downloads_and_writes_nothing() {
    let mut server = mockito::Server::new_async().await;
    let download = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &[(FILE, "1:1", "logo"), (FILE, "1:2", "icon")]);
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "1")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url()))),
    );

    let summary = coordinator(api.clone(), Arc::new(NoOpProcessingRecord), 50, true)
        .execute(instructions(&config))
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.planned, 2);
    assert_eq!(summary.successful, 0);
    assert!(api.image_requests().is_empty());
    assert!(!dir.path().join("web").exists());
    download.assert_async().await;
}

#[tokio::test]
async fn test_image_requests_are_batched() {
    let dir = TempDir::new().unwrap();
    let assets: Vec<(String, String)> = (1..=5)
        .map(|i| (format!("1:{i}"), format!("asset{i}")))
        .collect();
    let asset_refs: Vec<(&str, &str, &str)> = assets
        .iter()
        .map(|(node, name)| (FILE, node.as_str(), name.as_str()))
        .collect();
    let config = config(dir.path(), &asset_refs);
    let api = Arc::new(FakeApi::default().with_version(FILE, "1"));

    let summary = coordinator(api.clone(), Arc::new(NoOpProcessingRecord), 2, false)
        .execute(instructions(&config))
        .await
        .unwrap();

    assert_eq!(api.image_requests(), vec![2, 2, 1]);
    // No URLs were scripted, so every instruction fails
    assert_eq!(summary.failed, 5);
    assert!(summary
        .errors
        .iter()
        .all(|error| error.error_type == ExportErrorType::Download));
}

#[tokio::test]
async fn test_unknown_file_fails_only_its_instructions() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/render/logo.svg")
        .with_status(200)
        .with_body("<svg/>")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(
        dir.path(),
        &[(FILE, "1:1", "logo"), ("MissingFile", "9:9", "ghost")],
    );
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "1")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url()))),
    );

    let summary = coordinator(api, Arc::new(NoOpProcessingRecord), 50, false)
        .execute(instructions(&config))
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].error_type, ExportErrorType::Connection);
}

#[tokio::test]
async fn test_shutdown_signal_stops_new_instructions() {
    let mut server = mockito::Server::new_async().await;
    let download = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &[(FILE, "1:1", "logo")]);
    let api = Arc::new(
        FakeApi::default()
            .with_version(FILE, "1")
            .with_url("1:1", Some(format!("{}/render/logo.svg", server.url()))),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let summary = coordinator(api, Arc::new(NoOpProcessingRecord), 50, false)
        .with_shutdown_signal(shutdown_rx)
        .execute(instructions(&config))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.successful, 0);
    download.assert_async().await;
}
