pub mod claims;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod utils;

pub use claims::Claims;
pub use identity::{IdentityProvider, IdentityUser, MicrosoftIdentityProvider};
pub use jwt::JwtService;
pub use middleware::AuthenticatedAdmin;
pub use utils::{removal_cookie, session_cookie, token_from_request, SESSION_COOKIE};
