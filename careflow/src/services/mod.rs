pub mod authorization;
pub mod sessions;
pub mod users;

pub use authorization::AuthorizationService;
pub use sessions::SessionStore;
pub use users::UserDirectory;
