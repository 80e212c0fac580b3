#![allow(dead_code)]

use async_trait::async_trait;
use convert_service::config::ConvertConfig;
use convert_service::services::Converter;
use convert_service::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Writes `DOCX:` followed by the PDF bytes, so tests can tell which
/// upload a given output came from.
#[derive(Default)]
pub struct EchoConverter {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Converter for EchoConverter {
    fn name(&self) -> &str {
        "echo"
    }

    async fn convert(&self, pdf_path: &Path, docx_path: &Path) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut body = b"DOCX:".to_vec();
        body.extend(tokio::fs::read(pdf_path).await?);
        tokio::fs::write(docx_path, body).await?;
        Ok(())
    }
}

/// Fails the way a converter does on a damaged document.
pub struct BrokenConverter;

pub const BROKEN_CONVERTER_MESSAGE: &str = "Invalid PDF structure: xref table not found";

#[async_trait]
impl Converter for BrokenConverter {
    fn name(&self) -> &str {
        "broken"
    }

    async fn convert(&self, _pdf_path: &Path, _docx_path: &Path) -> Result<(), AppError> {
        Err(AppError::ConversionFailed(anyhow::anyhow!(
            BROKEN_CONVERTER_MESSAGE
        )))
    }
}

pub fn test_config(media_root: &Path, vars: &[(&str, &str)]) -> ConvertConfig {
    let mut vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.entry("MEDIA_ROOT".to_string())
        .or_insert_with(|| media_root.display().to_string());

    let common = CoreConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0, // Random port for testing
    };
    ConvertConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test configuration")
}

pub fn test_state(media_root: &Path, converter: Arc<dyn Converter>) -> AppState {
    let config = test_config(media_root, &[]);
    AppState {
        storage: convert_service::services::MediaStorage::new(&config.media.root),
        config,
        converter,
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub media_root: PathBuf,
    _media_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(EchoConverter::default()), &[]).await
    }

    pub async fn spawn_with(converter: Arc<dyn Converter>, vars: &[(&str, &str)]) -> Self {
        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        // Point at a subdirectory that does not exist yet; the service creates it.
        let media_root = media_dir.path().join("media");
        let config = test_config(&media_root, vars);

        let app = Application::build_with_converter(config, converter)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health/", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            media_root,
            _media_dir: media_dir,
        }
    }

    pub async fn upload(&self, file_name: &str, body: &[u8]) -> reqwest::Response {
        // Send the file name verbatim rather than as an RFC 5987 `filename*`.
        let form = reqwest::multipart::Form::new().percent_encode_noop().part(
            "pdf_file",
            reqwest::multipart::Part::bytes(body.to_vec())
                .file_name(file_name.to_string())
                .mime_str("application/pdf")
                .unwrap(),
        );
        self.post_form("/convert/", form).await
    }

    pub async fn post_form(&self, path: &str, form: reqwest::multipart::Form) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}{}", self.address, path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub fn pdf_path(&self, name: &str) -> PathBuf {
        self.media_root.join("pdfs").join(name)
    }

    pub fn docx_path(&self, name: &str) -> PathBuf {
        self.media_root.join("docx").join(name)
    }
}
