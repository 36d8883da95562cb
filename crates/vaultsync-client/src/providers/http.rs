//! HTTP implementation of the encrypted-folder API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use vaultsync_core::config::RemoteConfig;
use vaultsync_core::error::{AppError, E2eeError, ErrorKind};
use vaultsync_core::result::AppResult;
use vaultsync_core::traits::api::{DeleteResponse, E2eeApi};
use vaultsync_core::types::id::{FolderId, LockToken};
use vaultsync_core::types::lock::LockHandle;

use crate::ocs;

const OCS_E2EE_API: [&str; 6] = [
    "ocs",
    "v2.php",
    "apps",
    "end_to_end_encryption",
    "api",
    "v1",
];
const TOKEN_HEADER: &str = "e2e-token";

/// Client for the lock, metadata and WebDAV endpoints of one account.
#[derive(Debug, Clone)]
pub struct HttpE2eeClient {
    http: Client,
    base_url: Url,
    username: String,
    app_password: String,
}

impl HttpE2eeClient {
    /// Build a client from the `[remote]` configuration section.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid server URL '{}'", config.base_url),
                e,
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Server URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        info!(base_url = %base_url, username = %config.username, "Server client ready");
        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            app_password: config.app_password.clone(),
        })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, E2eeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| E2eeError::transport("server URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `{base}/ocs/v2.php/apps/end_to_end_encryption/api/v1/{resource}/{folder_id}`
    fn ocs_url(&self, resource: &str, folder_id: &FolderId) -> Result<Url, E2eeError> {
        self.url(
            OCS_E2EE_API
                .into_iter()
                .chain([resource, folder_id.as_str()]),
        )
    }

    /// `{base}/remote.php/dav/files/{user}/{path}`
    fn dav_url(&self, path: &str) -> Result<Url, E2eeError> {
        self.url(
            ["remote.php", "dav", "files", self.username.as_str()]
                .into_iter()
                .chain(path.split('/').filter(|segment| !segment.is_empty())),
        )
    }

    fn ocs_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.app_password))
            .header("OCS-APIRequest", "true")
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("format", "json")])
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, E2eeError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                E2eeError::transport(format!("request timed out: {e}"))
            } else {
                E2eeError::transport(e.to_string())
            }
        })
    }

    async fn body(response: Response) -> Result<String, E2eeError> {
        response
            .text()
            .await
            .map_err(|e| E2eeError::transport(format!("failed to read response body: {e}")))
    }
}

#[async_trait]
impl E2eeApi for HttpE2eeClient {
    async fn lock_folder(&self, folder_id: &FolderId) -> Result<LockHandle, E2eeError> {
        let url = self.ocs_url("lock", folder_id)?;
        debug!(folder_id = %folder_id, "Requesting folder lock");
        let response = self.send(self.ocs_request(self.http.post(url))).await?;

        match response.status() {
            StatusCode::OK => {
                let token = ocs::data_field(&Self::body(response).await?, TOKEN_HEADER)?;
                Ok(LockHandle::new(folder_id.clone(), LockToken::new(token)))
            }
            StatusCode::FORBIDDEN | StatusCode::CONFLICT | StatusCode::LOCKED => {
                Err(E2eeError::LockUnavailable {
                    folder_id: folder_id.to_string(),
                })
            }
            StatusCode::NOT_FOUND => Err(E2eeError::not_found(format!("folder {folder_id}"))),
            status => Err(E2eeError::transport(format!(
                "unexpected HTTP {status} from lock endpoint"
            ))),
        }
    }

    async fn unlock_folder(&self, lock: &LockHandle, success: bool) -> Result<(), E2eeError> {
        let url = self.ocs_url("lock", lock.folder_id())?;
        let mut request = self
            .ocs_request(self.http.delete(url))
            .header(TOKEN_HEADER, lock.token().as_str());
        if !success {
            request = request.query(&[("abort", "true")]);
        }

        let status = self.send(request).await?.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            warn!(folder_id = %lock.folder_id(), status = status.as_u16(), "Unlock refused");
            Err(E2eeError::UnlockRejected {
                folder_id: lock.folder_id().to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn get_metadata(&self, folder_id: &FolderId) -> Result<String, E2eeError> {
        let url = self.ocs_url("meta-data", folder_id)?;
        let response = self.send(self.ocs_request(self.http.get(url))).await?;

        match response.status() {
            StatusCode::OK => ocs::data_field(&Self::body(response).await?, "meta-data"),
            StatusCode::NOT_FOUND => Err(E2eeError::not_found(format!(
                "metadata of folder {folder_id}"
            ))),
            status => Err(E2eeError::metadata_invalid(format!(
                "metadata download answered HTTP {status}"
            ))),
        }
    }

    async fn put_metadata(&self, lock: &LockHandle, document: &str) -> Result<(), E2eeError> {
        let url = self.ocs_url("meta-data", lock.folder_id())?;
        let request = self
            .ocs_request(self.http.put(url))
            .header(TOKEN_HEADER, lock.token().as_str())
            .form(&[("metaData", document)]);

        let status = self.send(request).await?.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(E2eeError::UploadRejected {
                status: status.as_u16(),
            })
        }
    }

    async fn delete_path(
        &self,
        path: &str,
        lock: &LockHandle,
    ) -> Result<DeleteResponse, E2eeError> {
        let url = self.dav_url(path)?;
        let request = self
            .http
            .delete(url)
            .basic_auth(&self.username, Some(&self.app_password))
            .header(TOKEN_HEADER, lock.token().as_str());

        let status = self.send(request).await?.status().as_u16();
        debug!(path, status, "WebDAV delete answered");
        Ok(DeleteResponse { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> AppResult<HttpE2eeClient> {
        HttpE2eeClient::new(&RemoteConfig {
            base_url: base_url.to_string(),
            username: "alice".into(),
            app_password: "secret".into(),
            timeout_seconds: 5,
            user_agent: "vaultsync-test".into(),
        })
    }

    #[test]
    fn test_ocs_url() {
        let client = client("https://cloud.example.com/").unwrap();
        let url = client.ocs_url("lock", &FolderId::from("42")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.example.com/ocs/v2.php/apps/end_to_end_encryption/api/v1/lock/42"
        );
    }

    #[test]
    fn test_dav_url_encodes_segments() {
        let client = client("https://cloud.example.com/nextcloud").unwrap();
        let url = client.dav_url("/shared/my report.pdf").unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.example.com/nextcloud/remote.php/dav/files/alice/shared/my%20report.pdf"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = client("not a url").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(client("mailto:alice@example.com").is_err());
    }
}
