use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};

use crate::{
    errors::{AppError, AppResult},
    storage::{
        listing::parse_blob_list,
        sas::{SharedKeyCredential, SERVICE_VERSION},
        BlobContent, BlobInfo, BlobStore,
    },
};

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Lifetime of the signatures the client mints for its own requests.
const OPERATION_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    pub account_key: String,
    pub blob_endpoint: String,
}

impl ConnectionString {
    pub fn parse(value: &str) -> AppResult<Self> {
        let parts: HashMap<&str, &str> = value
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();

        if parts
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(Self {
                account_name: DEV_ACCOUNT_NAME.to_string(),
                account_key: DEV_ACCOUNT_KEY.to_string(),
                blob_endpoint: DEV_BLOB_ENDPOINT.to_string(),
            });
        }

        let required = |key: &str| {
            parts
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "Cadena de conexión de almacenamiento sin {}",
                        key
                    ))
                })
        };

        let account_name = required("AccountName")?;
        let account_key = required("AccountKey")?;
        let blob_endpoint = match parts.get("BlobEndpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "{}://{}.blob.{}",
                parts.get("DefaultEndpointsProtocol").unwrap_or(&"https"),
                account_name,
                parts.get("EndpointSuffix").unwrap_or(&"core.windows.net")
            ),
        };

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }
}

/// Azure Blob Storage client. Every request carries a short-lived SAS
/// minted from the account key.
#[derive(Clone)]
pub struct AzureBlobStore {
    client: Client,
    credential: SharedKeyCredential,
    endpoint: Url,
}

impl AzureBlobStore {
    pub fn from_connection_string(connection_string: &str) -> AppResult<Self> {
        let parsed = ConnectionString::parse(connection_string)?;
        let endpoint = Url::parse(&parsed.blob_endpoint).map_err(|e| {
            AppError::InternalError(format!("Endpoint de almacenamiento inválido: {}", e))
        })?;

        Ok(Self {
            client: Client::new(),
            credential: SharedKeyCredential::new(&parsed.account_name, &parsed.account_key)?,
            endpoint,
        })
    }

    pub fn account_name(&self) -> &str {
        self.credential.account_name()
    }

    fn url_for(&self, container: &str, blob: Option<&str>) -> AppResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::InternalError("Endpoint de almacenamiento inválido".to_string())
            })?;
            segments.pop_if_empty().push(container);
            if let Some(blob) = blob {
                segments.push(blob);
            }
        }
        Ok(url)
    }

    fn signed_blob_url(
        &self,
        container: &str,
        blob: &str,
        permissions: &str,
        ttl: Duration,
    ) -> AppResult<Url> {
        let mut url = self.url_for(container, Some(blob))?;
        let sas = self
            .credential
            .service_sas(container, Some(blob), permissions, Utc::now() + ttl)?;
        url.query_pairs_mut().extend_pairs(sas);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("x-ms-version", SERVICE_VERSION)
    }

    fn operation_ttl() -> Duration {
        Duration::minutes(OPERATION_TTL_MINUTES)
    }
}

async fn check_status(response: Response, what: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(AppError::NotFound(what.to_string())),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            Err(AppError::AlreadyExists(what.to_string()))
        }
        _ => Err(AppError::StorageError(format!(
            "{} respondió {}: {}",
            what, status, body
        ))),
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn upload(
        &self,
        container: &str,
        name: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        overwrite: bool,
    ) -> AppResult<String> {
        let url = self.signed_blob_url(container, name, "cw", Self::operation_ttl())?;

        let mut request = self
            .request(Method::PUT, url)
            .header("x-ms-blob-type", "BlockBlob")
            .header(
                header::CONTENT_TYPE,
                content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            )
            .body(data);
        if !overwrite {
            request = request.header(header::IF_NONE_MATCH, "*");
        }

        check_status(request.send().await?, &format!("Blob {}/{}", container, name)).await?;
        log::info!("Uploaded blob {}/{}", container, name);

        Ok(self.url_for(container, Some(name))?.to_string())
    }

    async fn download(&self, container: &str, name: &str) -> AppResult<BlobContent> {
        let url = self.signed_blob_url(container, name, "r", Self::operation_ttl())?;
        let response = self.request(Method::GET, url).send().await?;
        let response = check_status(response, &format!("Blob {}/{}", container, name)).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?.to_vec();

        Ok(BlobContent { data, content_type })
    }

    async fn delete(&self, container: &str, name: &str) -> AppResult<()> {
        let url = self.signed_blob_url(container, name, "d", Self::operation_ttl())?;
        let response = self.request(Method::DELETE, url).send().await?;
        check_status(response, &format!("Blob {}/{}", container, name)).await?;

        log::info!("Deleted blob {}/{}", container, name);
        Ok(())
    }

    async fn list(&self, container: &str) -> AppResult<Vec<BlobInfo>> {
        let mut blobs = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = self.url_for(container, None)?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("restype", "container")
                    .append_pair("comp", "list");
                if let Some(marker) = &marker {
                    query.append_pair("marker", marker);
                }
                query.extend_pairs(self.credential.service_sas(
                    container,
                    None,
                    "l",
                    Utc::now() + Self::operation_ttl(),
                )?);
            }

            let response = self.request(Method::GET, url).send().await?;
            let response =
                check_status(response, &format!("Contenedor {}", container)).await?;
            let page = parse_blob_list(&response.text().await?)?;

            blobs.extend(page.blobs);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(blobs)
    }

    async fn exists(&self, container: &str, name: &str) -> AppResult<bool> {
        let url = self.signed_blob_url(container, name, "r", Self::operation_ttl())?;
        let response = self.request(Method::HEAD, url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(AppError::StorageError(format!(
                "Blob {}/{} respondió {}",
                container, name, status
            ))),
        }
    }

    async fn signed_url(&self, container: &str, name: &str, ttl: Duration) -> AppResult<String> {
        Ok(self.signed_blob_url(container, name, "r", ttl)?.to_string())
    }

    async fn ensure_container(&self, container: &str) -> AppResult<()> {
        let mut url = self.url_for(container, None)?;
        url.query_pairs_mut()
            .append_pair("restype", "container")
            .extend_pairs(self.credential.account_sas(
                "c",
                "c",
                Utc::now() + Self::operation_ttl(),
            )?);

        let response = self.request(Method::PUT, url).send().await?;
        match response.status() {
            StatusCode::CREATED => {
                log::info!("Created blob container {}", container);
                Ok(())
            }
            StatusCode::CONFLICT => Ok(()),
            _ => check_status(response, &format!("Contenedor {}", container))
                .await
                .map(|_| ()),
        }
    }

    async fn health_check(&self) -> AppResult<()> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("comp", "list")
            .append_pair("maxresults", "1")
            .extend_pairs(self.credential.account_sas(
                "l",
                "s",
                Utc::now() + Self::operation_ttl(),
            )?);

        let response = self.request(Method::GET, url).send().await?;
        check_status(response, "Servicio de almacenamiento").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

    #[test]
    fn parses_cloud_connection_string() {
        let parsed = ConnectionString::parse(&format!(
            "DefaultEndpointsProtocol=https;AccountName=induccion;AccountKey={};EndpointSuffix=core.windows.net",
            KEY
        ))
        .unwrap();

        assert_eq!(parsed.account_name, "induccion");
        assert_eq!(parsed.account_key, KEY);
        assert_eq!(parsed.blob_endpoint, "https://induccion.blob.core.windows.net");
    }

    #[test]
    fn explicit_blob_endpoint_wins() {
        let parsed = ConnectionString::parse(&format!(
            "AccountName=local;AccountKey={};BlobEndpoint=http://127.0.0.1:10000/local/",
            KEY
        ))
        .unwrap();

        assert_eq!(parsed.blob_endpoint, "http://127.0.0.1:10000/local");
    }

    #[test]
    fn development_storage_shortcut() {
        let parsed = ConnectionString::parse("UseDevelopmentStorage=true").unwrap();
        assert_eq!(parsed.account_name, DEV_ACCOUNT_NAME);
        assert_eq!(parsed.blob_endpoint, DEV_BLOB_ENDPOINT);
    }

    #[test]
    fn missing_account_key_is_an_error() {
        let err = ConnectionString::parse("AccountName=induccion").unwrap_err();
        assert!(err.to_string().contains("AccountKey"));
    }

    #[test]
    fn blob_urls_escape_names_and_keep_endpoint_path() {
        let store = AzureBlobStore::from_connection_string(&format!(
            "AccountName=local;AccountKey={};BlobEndpoint=http://127.0.0.1:10000/local",
            KEY
        ))
        .unwrap();

        let url = store.url_for("recursos", Some("manual de calidad.pdf")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:10000/local/recursos/manual%20de%20calidad.pdf"
        );
    }

    #[tokio::test]
    async fn signed_url_carries_read_permission() {
        let store = AzureBlobStore::from_connection_string(&format!(
            "AccountName=induccion;AccountKey={}",
            KEY
        ))
        .unwrap();

        let url = store
            .signed_url("videoinduccion", "induccion.mp4", Duration::hours(24))
            .await
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let query: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://induccion.blob.core.windows.net/videoinduccion/induccion.mp4?"));
        assert_eq!(query["sp"], "r");
        assert_eq!(query["sr"], "b");
        assert!(query.contains_key("sig"));
    }
}
