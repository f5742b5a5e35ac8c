//! Shared-access signatures for Azure Blob Storage.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{AppError, AppResult};

pub const SERVICE_VERSION: &str = "2022-11-02";

const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const PROTOCOLS: &str = "https,http";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SharedKeyCredential {
    account_name: String,
    account_key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .finish_non_exhaustive()
    }
}

impl SharedKeyCredential {
    /// `account_key` is the base64 key from the portal or connection string.
    pub fn new(account_name: &str, account_key: &str) -> AppResult<Self> {
        let account_key = STANDARD.decode(account_key.trim()).map_err(|e| {
            AppError::InternalError(format!("Clave de almacenamiento inválida: {}", e))
        })?;

        Ok(Self {
            account_name: account_name.to_string(),
            account_key,
        })
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    fn sign(&self, string_to_sign: &str) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.account_key)
            .map_err(|e| AppError::InternalError(format!("HMAC key error: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Service SAS scoped to one blob (`sr=b`) or, without `blob`, to the
    /// whole container (`sr=c`).
    pub fn service_sas(
        &self,
        container: &str,
        blob: Option<&str>,
        permissions: &str,
        expiry: DateTime<Utc>,
    ) -> AppResult<Vec<(&'static str, String)>> {
        let expiry = expiry.format(EXPIRY_FORMAT).to_string();
        let resource = if blob.is_some() { "b" } else { "c" };
        let string_to_sign =
            service_string_to_sign(&self.account_name, container, blob, permissions, &expiry);

        Ok(vec![
            ("sv", SERVICE_VERSION.to_string()),
            ("sr", resource.to_string()),
            ("sp", permissions.to_string()),
            ("se", expiry),
            ("spr", PROTOCOLS.to_string()),
            ("sig", self.sign(&string_to_sign)?),
        ])
    }

    /// Account SAS over the blob service, needed for container-level
    /// operations a service SAS cannot grant.
    pub fn account_sas(
        &self,
        permissions: &str,
        resource_types: &str,
        expiry: DateTime<Utc>,
    ) -> AppResult<Vec<(&'static str, String)>> {
        let expiry = expiry.format(EXPIRY_FORMAT).to_string();
        let string_to_sign =
            account_string_to_sign(&self.account_name, permissions, resource_types, &expiry);

        Ok(vec![
            ("sv", SERVICE_VERSION.to_string()),
            ("ss", "b".to_string()),
            ("srt", resource_types.to_string()),
            ("sp", permissions.to_string()),
            ("se", expiry),
            ("spr", PROTOCOLS.to_string()),
            ("sig", self.sign(&string_to_sign)?),
        ])
    }
}

fn service_string_to_sign(
    account: &str,
    container: &str,
    blob: Option<&str>,
    permissions: &str,
    expiry: &str,
) -> String {
    let canonical_resource = match blob {
        Some(blob) => format!("/blob/{}/{}/{}", account, container, blob),
        None => format!("/blob/{}/{}", account, container),
    };
    let resource = if blob.is_some() { "b" } else { "c" };

    [
        permissions,
        "", // start
        expiry,
        &canonical_resource,
        "", // identifier
        "", // ip
        PROTOCOLS,
        SERVICE_VERSION,
        resource,
        "", // snapshot
        "", // encryption scope
        "", // cache-control
        "", // content-disposition
        "", // content-encoding
        "", // content-language
        "", // content-type
    ]
    .join("\n")
}

fn account_string_to_sign(
    account: &str,
    permissions: &str,
    resource_types: &str,
    expiry: &str,
) -> String {
    let mut string_to_sign = [
        account,
        permissions,
        "b",
        resource_types,
        "", // start
        expiry,
        "", // ip
        PROTOCOLS,
        SERVICE_VERSION,
        "", // encryption scope
    ]
    .join("\n");
    string_to_sign.push('\n');
    string_to_sign
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
    }

    fn param<'a>(pairs: &'a [(&'static str, String)], name: &str) -> &'a str {
        pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn rejects_keys_that_are_not_base64() {
        assert!(SharedKeyCredential::new("cuenta", "not base64!!").is_err());
    }

    #[test]
    fn service_string_to_sign_has_sixteen_fields() {
        let sts = service_string_to_sign("cuenta", "recursos", Some("manual.pdf"), "r", "2030-01-02T03:04:05Z");
        let fields: Vec<&str> = sts.split('\n').collect();

        assert_eq!(fields.len(), 16);
        assert_eq!(fields[0], "r");
        assert_eq!(fields[2], "2030-01-02T03:04:05Z");
        assert_eq!(fields[3], "/blob/cuenta/recursos/manual.pdf");
        assert_eq!(fields[7], SERVICE_VERSION);
        assert_eq!(fields[8], "b");
    }

    #[test]
    fn container_scope_uses_container_resource() {
        let sts = service_string_to_sign("cuenta", "recursos", None, "l", "2030-01-02T03:04:05Z");
        let fields: Vec<&str> = sts.split('\n').collect();

        assert_eq!(fields[3], "/blob/cuenta/recursos");
        assert_eq!(fields[8], "c");
    }

    #[test]
    fn service_sas_signature_verifies_with_account_key() {
        let credential = SharedKeyCredential::new("cuenta", KEY).unwrap();
        let pairs = credential
            .service_sas("recursos", Some("manual.pdf"), "r", expiry())
            .unwrap();

        assert_eq!(param(&pairs, "sr"), "b");
        assert_eq!(param(&pairs, "se"), "2030-01-02T03:04:05Z");

        let sts = service_string_to_sign("cuenta", "recursos", Some("manual.pdf"), "r", "2030-01-02T03:04:05Z");
        let mut mac = HmacSha256::new_from_slice(&STANDARD.decode(KEY).unwrap()).unwrap();
        mac.update(sts.as_bytes());
        let signature = STANDARD.decode(param(&pairs, "sig")).unwrap();
        assert!(mac.verify_slice(&signature).is_ok());
    }

    #[test]
    fn account_sas_ends_with_newline() {
        let sts = account_string_to_sign("cuenta", "c", "c", "2030-01-02T03:04:05Z");
        assert!(sts.ends_with('\n'));
        assert!(sts.starts_with("cuenta\nc\nb\nc\n"));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let credential = SharedKeyCredential::new("cuenta", KEY).unwrap();
        let debug = format!("{:?}", credential);
        assert!(debug.contains("cuenta"));
        assert!(!debug.contains("account_key"));
    }
}
