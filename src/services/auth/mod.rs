pub mod account_store;
pub mod cookie;
pub mod credential;
pub mod factory;
pub mod gate;

pub use account_store::{AccountStore, Role};
pub use cookie::CookiePolicy;
pub use credential::CredentialService;
pub use factory::build_auth_service;
pub use gate::{Allowed, AuthService, GateRejection};
