use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{admin::normalize_email, Admin},
        dto::request::AdminEmailRequest,
    },
    repositories::AdminRepository,
    services::required_field,
};

pub struct AdminService {
    repository: Arc<dyn AdminRepository>,
    allowed_domain: String,
}

impl AdminService {
    pub fn new(repository: Arc<dyn AdminRepository>, allowed_domain: &str) -> Self {
        Self {
            repository,
            allowed_domain: allowed_domain.trim().to_lowercase(),
        }
    }

    pub async fn find_admin(&self, email: &str) -> AppResult<Option<Admin>> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Ok(None);
        }
        self.repository.find_by_email(&email).await
    }

    pub async fn is_admin(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_admin(email).await?.is_some())
    }

    pub async fn list_admins(&self) -> AppResult<Vec<Admin>> {
        self.repository.list().await
    }

    pub async fn add_admin(&self, request: AdminEmailRequest) -> AppResult<Admin> {
        let email = normalize_email(&required_field(request.email, "email")?);

        if !email.ends_with(&self.allowed_domain) {
            return Err(AppError::ValidationError(format!(
                "El correo debe pertenecer al dominio {}",
                self.allowed_domain
            )));
        }
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "El administrador {} ya existe",
                email
            )));
        }

        let admin = self.repository.create(Admin::new(&email)).await?;
        log::info!("Added administrator {}", admin.email);
        Ok(admin)
    }

    pub async fn remove_admin(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        if !self.repository.delete(&email).await? {
            return Err(AppError::NotFound(format!(
                "Administrador {} no encontrado",
                email
            )));
        }
        log::info!("Removed administrator {}", email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryAdminRepository;

    const DOMAIN: &str = "@fundacionsantodomingo.org";

    fn request(email: &str) -> AdminEmailRequest {
        AdminEmailRequest {
            email: Some(email.to_string()),
        }
    }

    async fn service() -> AdminService {
        let repository = InMemoryAdminRepository::with_admins(&["jefe@fundacionsantodomingo.org"]).await;
        AdminService::new(Arc::new(repository), DOMAIN)
    }

    #[tokio::test]
    async fn test_add_admin_normalizes_email() {
        let service = service().await;

        let admin = service
            .add_admin(request("  Nueva.Persona@FundacionSantoDomingo.org "))
            .await
            .unwrap();

        assert_eq!(admin.email, "nueva.persona@fundacionsantodomingo.org");
        assert!(service.is_admin("NUEVA.PERSONA@fundacionsantodomingo.org").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_admin_outside_domain_is_rejected() {
        let err = service()
            .await
            .add_admin(request("alguien@gmail.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_duplicate_admin_conflicts() {
        let err = service()
            .await
            .add_admin(request("JEFE@fundacionsantodomingo.org"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_admin_is_not_found() {
        let service = service().await;

        assert!(matches!(
            service.remove_admin("nadie@fundacionsantodomingo.org").await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.remove_admin("jefe@fundacionsantodomingo.org").await.is_ok());
        assert!(service.list_admins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_is_a_validation_error() {
        let err = service()
            .await
            .add_admin(AdminEmailRequest { email: None })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Se requiere el campo email");
    }
}
