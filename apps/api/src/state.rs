use rolegate_application::{RbacManager, RbacResolver};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub manager: RbacManager,
    pub resolver: RbacResolver,
}
