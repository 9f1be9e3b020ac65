pub mod directory;
pub mod sso;
