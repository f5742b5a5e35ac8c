use actix_web::{
    delete, get, http::header::LOCATION, post, web, HttpRequest, HttpResponse,
};
use reqwest::Url;

use crate::{
    app_state::AppState,
    auth::{removal_cookie, session_cookie, token_from_request, AuthenticatedAdmin},
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{AdminEmailRequest, CallbackParams},
        response::{
            AdminCheckResponse, AdminsOverview, CurrentUserResponse, LoginResponse,
            MessageResponse,
        },
    },
    services::required_field,
};

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// `{frontend}/induccion?error=<reason>`
fn failure_location(frontend_url: &str, reason: &str) -> String {
    let base = format!("{}/induccion", frontend_url.trim_end_matches('/'));
    Url::parse_with_params(&base, &[("error", reason)])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("{}?error={}", base, reason))
}

#[get("/api/auth/login")]
async fn login(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let auth_url = state.identity.authorization_url()?;
    Ok(HttpResponse::Ok().json(LoginResponse { auth_url }))
}

#[get("/api/auth/callback")]
async fn callback(
    state: web::Data<AppState>,
    params: web::Query<CallbackParams>,
    req: HttpRequest,
) -> HttpResponse {
    let frontend_url = state.config.frontend_url.trim_end_matches('/');
    let request_id = get_request_id(&req).unwrap_or_default();
    let params = params.into_inner();

    if let Some(error) = params.error.filter(|e| !e.is_empty()) {
        log::warn!("Identity provider returned error: {}", error);
        return redirect(&failure_location(frontend_url, &error));
    }
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return redirect(&failure_location(frontend_url, "no_code"));
    };

    let user = match state.identity.exchange_code(&code).await {
        Ok(user) => user,
        Err(AppError::ProviderRejected(reason)) => {
            log::warn!("[{}] Authorization code rejected: {}", request_id, reason);
            return redirect(&failure_location(frontend_url, &reason));
        }
        Err(e) => {
            log::error!("[{}] Authorization code exchange failed: {}", request_id, e);
            return redirect(&failure_location(frontend_url, "callback_failed"));
        }
    };

    let admin = match state.admin_service.find_admin(&user.email).await {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            log::warn!("Sign-in rejected for {}: not an administrator", user.email);
            return redirect(&failure_location(frontend_url, "sin_permisos"));
        }
        Err(e) => {
            log::error!(
                "[{}] Administrator lookup failed for {}: {}",
                request_id,
                user.email,
                e
            );
            return redirect(&failure_location(frontend_url, "callback_failed"));
        }
    };

    let token = match state.jwt.create_token(&admin.email, &user.name, &admin.role) {
        Ok(token) => token,
        Err(e) => {
            log::error!("[{}] {}", request_id, e);
            return redirect(&failure_location(frontend_url, "callback_failed"));
        }
    };

    log::info!("Administrator {} signed in", admin.email);
    HttpResponse::Found()
        .insert_header((LOCATION, format!("{}/configuracion", frontend_url)))
        .cookie(session_cookie(
            &token,
            state.jwt.expiration_hours(),
            state.config.is_production(),
        ))
        .finish()
}

#[get("/api/auth/usuario-actual")]
async fn current_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let claims = match token_from_request(&req).map(|token| state.jwt.validate_token(&token)) {
        Some(Ok(claims)) => claims,
        _ => {
            return Ok(HttpResponse::Unauthorized().json(CurrentUserResponse {
                autenticado: false,
                email: None,
                nombre: None,
                es_administrador: None,
            }))
        }
    };

    let is_admin = state.admin_service.is_admin(claims.email()).await?;
    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        autenticado: true,
        email: Some(claims.sub),
        nombre: Some(claims.name),
        es_administrador: Some(is_admin),
    }))
}

#[post("/api/auth/logout")]
async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(MessageResponse::new("Sesión cerrada exitosamente"))
}

#[post("/api/auth/verificar-admin")]
async fn check_admin(
    state: web::Data<AppState>,
    request: web::Json<AdminEmailRequest>,
) -> Result<HttpResponse, AppError> {
    let email = required_field(request.into_inner().email, "email")?;

    let response = match state.admin_service.find_admin(&email).await? {
        Some(admin) => AdminCheckResponse {
            es_administrador: true,
            email: Some(admin.email),
            rol: Some(admin.role),
        },
        None => AdminCheckResponse {
            es_administrador: false,
            email: None,
            rol: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/auth/administradores")]
async fn list_admins(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let admins = state.admin_service.list_admins().await?;
    Ok(HttpResponse::Ok().json(AdminsOverview {
        total: admins.len(),
        administradores: admins,
    }))
}

#[post("/api/auth/administradores")]
async fn add_admin(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    request: web::Json<AdminEmailRequest>,
) -> Result<HttpResponse, AppError> {
    let created = state.admin_service.add_admin(request.into_inner()).await?;
    log::info!("{} granted administrator access to {}", admin.0.email(), created.email);
    Ok(HttpResponse::Created().json(created))
}

#[delete("/api/auth/administradores/{email}")]
async fn remove_admin(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.admin_service.remove_admin(&email).await?;
    log::info!("{} revoked administrator access for {}", admin.0.email(), email);
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Administrador eliminado exitosamente",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(callback)
        .service(current_user)
        .service(logout)
        .service(check_admin)
        .service(list_admins)
        .service(add_admin)
        .service(remove_admin);
}
