pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryUserDirectory;
pub use postgres::PgUserDirectory;
pub use store::{DirectoryError, DirectoryResult, UserDirectory, UserRecord};
