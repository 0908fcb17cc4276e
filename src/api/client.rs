// HTTP implementation of the backend gateway
// Endpoints are relative to the configured base URL:
//   GET  /api/files          -> { files: [{ filename }] }
//   POST /api/upload         multipart field "file"
//   POST /api/select-file    { filename }
//   POST /api/chat/csv/groq  { question } -> { result: [...] | null }

use super::Gateway;
use crate::models::{ChatRequest, ChatResponse, FileList, SelectFileRequest};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use tracing::{debug, warn};

const FILES_PATH: &str = "/api/files";
const UPLOAD_PATH: &str = "/api/upload";
const SELECT_PATH: &str = "/api/select-file";
const CHAT_PATH: &str = "/api/chat/csv/groq";
const UPLOAD_FIELD: &str = "file";

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &crate::config::ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn list_files(&self) -> AppResult<FileList> {
        let response = self.client.get(self.url(FILES_PATH)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Listing files failed with status {}", status);
            return Err(AppError::ListFailed);
        }

        let files: FileList = response.json().await?;
        debug!("Backend lists {} file(s)", files.files.len());
        Ok(files)
    }

    async fn upload_file(&self, path: &Path) -> AppResult<serde_json::Value> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidRequest(format!("Not a file path: {}", path.display())))?
            .to_string();
        let content = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        debug!("Uploading {} ({} bytes, {})", filename, content.len(), mime);

        let part = Part::bytes(content)
            .file_name(filename)
            .mime_str(mime.as_ref())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upload failed with status {}", status);
            return Err(AppError::UploadFailed);
        }

        Ok(response.json().await?)
    }

    async fn select_file(&self, filename: &str) -> AppResult<serde_json::Value> {
        let response = self
            .client
            .post(self.url(SELECT_PATH))
            .json(&SelectFileRequest { filename })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Selecting {} failed with status {}", filename, status);
            return Err(AppError::SelectFailed);
        }

        Ok(response.json().await?)
    }

    async fn send_chat_message(&self, question: &str) -> AppResult<ChatResponse> {
        let response = self
            .client
            .post(self.url(CHAT_PATH))
            .json(&ChatRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_list_files() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/files")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files":[{"filename":"incidents.xlsx"},{"filename":"costs.csv"}]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let files = client.list_files().await.unwrap();

        mock.assert_async().await;
        let names: Vec<_> = files.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["incidents.xlsx", "costs.csv"]);
    }

    #[tokio::test]
    async fn test_list_files_non_2xx() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/files")
            .with_status(500)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.list_files().await.unwrap_err();
        assert!(matches!(err, AppError::ListFailed));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="plant.csv""#.to_string()),
                Matcher::Regex("region,cost".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"ok"}"#)
            .create_async()
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plant.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "region,cost").unwrap();
        writeln!(file, "north,10").unwrap();

        let client = ApiClient::new(format!("{}/", server.url()));
        let body = client.upload_file(&path).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, json!({"message": "ok"}));
    }

    #[tokio::test]
    async fn test_upload_non_2xx() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(400)
            .create_async()
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "x").unwrap();

        let client = ApiClient::new(server.url());
        let err = client.upload_file(&path).await.unwrap_err();
        assert_eq!(err.to_string(), "Upload failed");
    }

    #[tokio::test]
    async fn test_upload_missing_local_file() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client
            .upload_file(Path::new("/definitely/not/here.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_select_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/select-file")
            .match_body(Matcher::Json(json!({"filename": "incidents.xlsx"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"table":"incidents"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        client.select_file("incidents.xlsx").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_select_file_non_2xx() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/select-file")
            .with_status(404)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.select_file("gone.csv").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to select file");
    }

    #[tokio::test]
    async fn test_send_chat_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat/csv/groq")
            .match_body(Matcher::Json(json!({"question": "total cost by region"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":[{"region":"North","total":1200.5}]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let response = client.send_chat_message("total cost by region").await.unwrap();

        mock.assert_async().await;
        let rows = response.result.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["region"], json!("North"));
    }

    #[tokio::test]
    async fn test_send_chat_message_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat/csv/groq")
            .with_status(503)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.send_chat_message("anything").await.unwrap_err();
        assert!(matches!(err, AppError::Http { status: 503 }));
    }
}
