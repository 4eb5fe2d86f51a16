use super::docs_api::Document;
use super::service_account::ServiceAccountAuth;
use crate::core::docs::{DocSummary, DocsError, DocsSource, DocumentText, IndexFileStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

const DOCS_API: &str = "https://docs.googleapis.com/v1";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";

const DOC_MIME_TYPE: &str = "application/vnd.google-apps.document";

/// Drive caps `pageSize` at 1000; 100 keeps responses small.
const LIST_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    modified_time: Option<DateTime<Utc>>,
    created_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for DocSummary {
    fn from(file: DriveFile) -> Self {
        DocSummary {
            id: file.id,
            name: file.name,
            modified_time: file.modified_time,
            created_time: file.created_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Google Drive + Docs REST client.
///
/// Serves documents for the core and stores lesson index files in Drive.
pub struct GoogleDriveClient {
    client: Client,
    auth: ServiceAccountAuth,
    folder_id: Option<String>,
}

impl GoogleDriveClient {
    pub fn new(auth: ServiceAccountAuth, folder_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            folder_id,
        }
    }

    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, DocsError> {
        let token = self
            .auth
            .get_access_token()
            .await
            .map_err(|e| DocsError::Upstream(format!("Google authentication failed: {}", e)))?;
        Ok(request.bearer_auth(token))
    }

    /// Sends an authorized request. `file_id` names the file a 404 is about.
    async fn send(
        &self,
        request: RequestBuilder,
        what: &str,
        file_id: Option<&str>,
    ) -> Result<Response, DocsError> {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| DocsError::Upstream(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::warn!(%status, what, "Google API call failed");
        Err(status_error(status, what, file_id, &text))
    }

    /// Lists every Google Doc matching the extra query clause, following
    /// `nextPageToken` to the end.
    async fn list_files(&self, extra: Option<String>) -> Result<Vec<DocSummary>, DocsError> {
        let mut query = format!("mimeType='{}' and trashed=false", DOC_MIME_TYPE);
        if let Some(folder) = &self.folder_id {
            query.push_str(&format!(" and '{}' in parents", escape_query(folder)));
        }
        if let Some(extra) = extra {
            query.push_str(" and ");
            query.push_str(&extra);
        }

        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.clone()),
                ("pageSize", LIST_PAGE_SIZE.to_string()),
                (
                    "fields",
                    "nextPageToken, files(id, name, modifiedTime, createdTime)".to_string(),
                ),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let request = self
                .client
                .get(format!("{}/files", DRIVE_API))
                .query(&params);
            let page: FileList = self
                .send(request, "Drive file listing", None)
                .await?
                .json()
                .await
                .map_err(|e| DocsError::Upstream(format!("Invalid Drive listing: {}", e)))?;

            docs.extend(page.files.into_iter().map(DocSummary::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = docs.len(), "Listed Drive documents");
        Ok(docs)
    }

    async fn upload_json(&self, file_id: &str, body: &serde_json::Value) -> Result<(), DocsError> {
        let request = self
            .client
            .patch(format!("{}/files/{}", DRIVE_UPLOAD_API, file_id))
            .query(&[("uploadType", "media")])
            .json(body);
        self.send(request, "index file upload", Some(file_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl DocsSource for GoogleDriveClient {
    async fn list_documents(&self) -> Result<Vec<DocSummary>, DocsError> {
        self.list_files(None).await
    }

    async fn fetch_document(&self, file_id: &str) -> Result<DocumentText, DocsError> {
        let request = self
            .client
            .get(format!("{}/documents/{}", DOCS_API, file_id))
            .query(&[("includeTabsContent", "true")]);

        let document: Document = self
            .send(request, "document", Some(file_id))
            .await?
            .json()
            .await
            .map_err(|e| DocsError::Upstream(format!("Invalid document {}: {}", file_id, e)))?;

        let id = if document.document_id.is_empty() {
            file_id.to_string()
        } else {
            document.document_id.clone()
        };

        Ok(DocumentText {
            id,
            paragraphs: document.paragraphs(),
            name: document.title,
        })
    }

    async fn find_by_content(&self, query: &str) -> Result<Vec<DocSummary>, DocsError> {
        self.list_files(Some(format!("fullText contains '{}'", escape_query(query))))
            .await
    }
}

#[async_trait]
impl IndexFileStore for GoogleDriveClient {
    async fn read_index(&self, file_id: &str) -> Result<serde_json::Value, DocsError> {
        let request = self
            .client
            .get(format!("{}/files/{}", DRIVE_API, file_id))
            .query(&[("alt", "media")]);

        let text = self
            .send(request, "index file", Some(file_id))
            .await?
            .text()
            .await
            .map_err(|e| DocsError::Upstream(e.to_string()))?;

        parse_index(file_id, &text)
    }

    async fn write_index(
        &self,
        file_id: Option<&str>,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<String, DocsError> {
        let file_id = match file_id {
            Some(id) => id.to_string(),
            None => {
                let mut metadata = json!({
                    "name": name,
                    "mimeType": "application/json",
                });
                if let Some(folder) = &self.folder_id {
                    metadata["parents"] = json!([folder]);
                }

                let request = self
                    .client
                    .post(format!("{}/files", DRIVE_API))
                    .query(&[("fields", "id")])
                    .json(&metadata);
                let created: CreatedFile = self
                    .send(request, "index file creation", None)
                    .await?
                    .json()
                    .await
                    .map_err(|e| DocsError::Upstream(e.to_string()))?;

                tracing::info!(file_id = %created.id, name, "Created lesson index file");
                created.id
            }
        };

        self.upload_json(&file_id, body).await?;
        Ok(file_id)
    }
}

fn parse_index(file_id: &str, text: &str) -> Result<serde_json::Value, DocsError> {
    serde_json::from_str(text)
        .map_err(|e| DocsError::Store(format!("Index file {} is not valid JSON: {}", file_id, e)))
}

fn status_error(status: StatusCode, what: &str, file_id: Option<&str>, body: &str) -> DocsError {
    match (status, file_id) {
        (StatusCode::NOT_FOUND, Some(id)) => DocsError::NotFound(id.to_string()),
        (StatusCode::NOT_FOUND, None) => DocsError::NotFound(what.to_string()),
        _ => DocsError::Upstream(format!(
            "Google API error for {} ({}): {}",
            what, status, body
        )),
    }
}

/// Escapes a value for use inside a single-quoted Drive query string.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
