use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{app_state::AppState, errors::AppResult};

#[derive(Debug, Serialize)]
struct ServiceStatus {
    cosmos_db: &'static str,
    azure_storage: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    estado: &'static str,
    mensaje: &'static str,
    servicios: ServiceStatus,
}

fn connectivity(result: Option<AppResult<()>>) -> &'static str {
    match result {
        None => "no configurado",
        Some(Ok(())) => "conectado",
        Some(Err(e)) => {
            log::warn!("Health check failed: {}", e);
            "desconectado"
        }
    }
}

#[get("/api/salud")]
async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.database {
        Some(db) => Some(db.health_check().await),
        None => None,
    };
    let storage = if state.resource_service.is_configured() {
        Some(state.resource_service.health_check().await)
    } else {
        None
    };

    HttpResponse::Ok().json(HealthResponse {
        estado: "activo",
        mensaje: "API de inducción funcionando",
        servicios: ServiceStatus {
            cosmos_db: connectivity(database),
            azure_storage: connectivity(storage),
        },
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_connectivity_labels() {
        assert_eq!(connectivity(None), "no configurado");
        assert_eq!(connectivity(Some(Ok(()))), "conectado");
        assert_eq!(
            connectivity(Some(Err(AppError::StorageError("down".into())))),
            "desconectado"
        );
    }
}
