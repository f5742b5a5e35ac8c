use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // normalized email
    pub name: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(email: &str, name: &str, role: &str, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("ana@fundacionsantodomingo.org", "Ana", "administrador", 8);

        assert_eq!(claims.email(), "ana@fundacionsantodomingo.org");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }
}
