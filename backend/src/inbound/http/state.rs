//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the domain
//! services, so they stay testable without a database.

use std::sync::Arc;

use crate::domain::ports::{CalculationRepository, UserRepository};
use crate::domain::{CalculationService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User use-cases.
    pub users: UserService,
    /// Calculation use-cases.
    pub calculations: CalculationService,
}

impl HttpState {
    /// Build the services over the given repository ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use calc_api::inbound::http::state::HttpState;
    /// use calc_api::test_support::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::default());
    /// let _state = HttpState::new(store.clone(), store);
    /// ```
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        calculations: Arc<dyn CalculationRepository>,
    ) -> Self {
        Self {
            users: UserService::new(users),
            calculations: CalculationService::new(calculations),
        }
    }
}
