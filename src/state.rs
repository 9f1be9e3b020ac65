/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::sso::RoleResolver;

#[derive(Clone, Debug)]
pub struct AppState {
    pub resolver: Arc<RoleResolver>,
}

impl AppState {
    pub fn new(resolver: Arc<RoleResolver>) -> Self {
        Self { resolver }
    }
}
