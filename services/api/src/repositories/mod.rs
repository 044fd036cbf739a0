//! Repositories for database operations

pub mod activity;
pub mod application;
pub mod registration;
pub mod user;

// Re-export for convenience
pub use activity::ActivityRepository;
pub use application::ApplicationRepository;
pub use registration::RegistrationRepository;
pub use user::UserRepository;
