pub mod health;
pub mod sso;
