use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::{
    app_state::AppState,
    auth::{utils::token_from_request, Claims},
    errors::AppError,
    middleware::get_request_id,
};

/// Extractor for routes restricted to the administrator allow-list.
///
/// The token comes from the session cookie or a bearer header; its email
/// must still be on the allow-list when the request is made.
pub struct AuthenticatedAdmin(pub Claims);

impl FromRequest for AuthenticatedAdmin {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = token_from_request(req);
        let request_id = get_request_id(req).unwrap_or_default();

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalError("Application state not configured".to_string())
            })?;
            let Some(token) = token else {
                log::debug!("[{}] Admin request without credentials", request_id);
                return Err(AppError::Unauthorized("No autenticado".to_string()));
            };

            let claims = state.jwt.validate_token(&token).map_err(|e| {
                log::warn!("[{}] Admin token rejected: {}", request_id, e);
                e
            })?;
            if !state.admin_service.is_admin(claims.email()).await? {
                log::warn!(
                    "[{}] Rejected admin request from {}",
                    request_id,
                    claims.email()
                );
                return Err(AppError::Unauthorized(
                    "No tiene permisos de administrador".to_string(),
                ));
            }

            Ok(AuthenticatedAdmin(claims))
        })
    }
}
