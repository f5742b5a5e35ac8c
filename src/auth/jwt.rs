use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            expiration_hours,
        }
    }

    pub fn create_token(&self, email: &str, name: &str, role: &str) -> AppResult<String> {
        let claims = Claims::new(email, name, role, self.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("La sesión ha expirado".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Firma de token inválida".to_string())
                }
                _ => AppError::Unauthorized(format!("Token inválido: {}", e)),
            })
    }

    pub fn expiration_hours(&self) -> i64 {
        self.expiration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&SecretString::from(secret.to_string()), 8)
    }

    #[test]
    fn test_create_and_validate_token() {
        let jwt = service("test_secret");

        let token = jwt
            .create_token("ana@fundacionsantodomingo.org", "Ana", "administrador")
            .unwrap();
        let claims = jwt.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "ana@fundacionsantodomingo.org");
        assert_eq!(claims.role, "administrador");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = service("one").create_token("a@b.org", "A", "administrador").unwrap();

        let err = service("two").validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtService::new(&SecretString::from("s".to_string()), -2);
        let token = jwt.create_token("a@b.org", "A", "administrador").unwrap();

        let err = jwt.validate_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: La sesión ha expirado");
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(service("s").validate_token("not-a-token").is_err());
    }
}
