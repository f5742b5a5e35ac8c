use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "administrador";

/// Allow-list entry. `id` and `email` hold the same normalized address.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Admin {
    pub id: String,
    pub email: String,
    #[serde(rename = "rol", default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    ADMIN_ROLE.to_string()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Admin {
    pub fn new(email: &str) -> Self {
        let email = normalize_email(email);
        Admin {
            id: email.clone(),
            email,
            role: default_role(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_email_is_normalized_and_used_as_id() {
        let admin = Admin::new("  Ana.Perez@FundacionSantoDomingo.org ");

        assert_eq!(admin.email, "ana.perez@fundacionsantodomingo.org");
        assert_eq!(admin.id, admin.email);
        assert_eq!(admin.role, ADMIN_ROLE);
    }

    #[test]
    fn admin_serializes_role_under_wire_name() {
        let json = serde_json::to_value(Admin::new("a@b.org")).unwrap();
        assert_eq!(json["rol"], "administrador");
    }
}
