pub mod budget;
pub mod claims_path;
pub mod resolver;
pub mod role;
pub mod role_mapping;
pub mod types;

pub use budget::BudgetPeriod;
pub use claims_path::ClaimPath;
pub use resolver::{ResolutionError, ResolutionPolicy, RoleResolver};
pub use role::InternalRole;
pub use role_mapping::RoleMappingTable;
pub use types::{AuthorizationDecision, IdentityClaims};
