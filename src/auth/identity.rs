use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const GRAPH_ME_URL: &str = "https://graph.microsoft.com/v1.0/me";
const SCOPE: &str = "User.Read";

/// Person signed in through the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub email: String,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where the browser is sent to sign in.
    fn authorization_url(&self) -> AppResult<String>;
    /// Redeems an authorization code and resolves the signed-in user.
    async fn exchange_code(&self, code: &str) -> AppResult<IdentityUser>;
}

#[derive(Clone)]
pub struct MicrosoftIdentityProvider {
    client: Client,
    client_id: String,
    client_secret: SecretString,
    tenant_id: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    mail: Option<String>,
    user_principal_name: Option<String>,
    display_name: Option<String>,
}

impl GraphUser {
    fn into_identity(self) -> AppResult<IdentityUser> {
        let email = self
            .mail
            .filter(|m| !m.trim().is_empty())
            .or(self.user_principal_name)
            .ok_or_else(|| {
                AppError::Unauthorized("La cuenta no tiene correo electrónico".to_string())
            })?;

        Ok(IdentityUser {
            name: self.display_name.unwrap_or_else(|| email.clone()),
            email,
        })
    }
}

impl MicrosoftIdentityProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: config.azure_client_id.clone(),
            client_secret: config.azure_client_secret.clone(),
            tenant_id: config.azure_tenant_id.clone(),
            redirect_uri: config.azure_redirect_uri.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", LOGIN_BASE_URL, self.tenant_id, path)
    }
}

#[async_trait]
impl IdentityProvider for MicrosoftIdentityProvider {
    fn authorization_url(&self) -> AppResult<String> {
        let url = Url::parse_with_params(
            &self.endpoint("authorize"),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_mode", "query"),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("URL de autorización inválida: {}", e)))?;

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<IdentityUser> {
        let token: TokenResponse = self
            .client
            .post(self.endpoint("token"))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("scope", SCOPE),
            ])
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("Token request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::InternalError(format!("Token response invalid: {}", e)))?;

        let access_token = match token.access_token {
            Some(access_token) => access_token,
            None => {
                log::warn!(
                    "Code exchange rejected: {} {}",
                    token.error.as_deref().unwrap_or("unknown_error"),
                    token.error_description.as_deref().unwrap_or_default()
                );
                return Err(AppError::ProviderRejected(
                    token.error.unwrap_or_else(|| "token_error".to_string()),
                ));
            }
        };

        let response = self
            .client
            .get(GRAPH_ME_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("Graph request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "Graph respondió {}",
                response.status()
            )));
        }

        let user: GraphUser = response
            .json()
            .await
            .map_err(|e| AppError::InternalError(format!("Graph response invalid: {}", e)))?;
        user.into_identity()
    }
}
