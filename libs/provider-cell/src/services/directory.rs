use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_models::scheduling::{ProviderProfile, RequesterProfile};
use shared_store::store::SchedulingStore;
use shared_store::AppState;

use crate::models::{ProviderError, RegisterProviderRequest, RegisterRequesterRequest};

/// Identity/profile directory for the two party kinds. The scheduling engine
/// only needs opaque-id resolution; anything richer lives elsewhere.
pub struct DirectoryService {
    store: Arc<dyn SchedulingStore>,
}

impl DirectoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn register_provider(
        &self,
        request: RegisterProviderRequest,
    ) -> Result<ProviderProfile, ProviderError> {
        if request.display_name.trim().is_empty() {
            return Err(ProviderError::Validation(
                "display_name must not be empty".to_string(),
            ));
        }

        let profile = ProviderProfile {
            id: Uuid::new_v4(),
            display_name: request.display_name,
            rating_avg: 0.0,
            rating_count: 0,
        };
        self.store.upsert_provider(profile.clone()).await?;
        debug!("Registered provider {}", profile.id);
        Ok(profile)
    }

    pub async fn register_requester(
        &self,
        request: RegisterRequesterRequest,
    ) -> Result<RequesterProfile, ProviderError> {
        if request.display_name.trim().is_empty() {
            return Err(ProviderError::Validation(
                "display_name must not be empty".to_string(),
            ));
        }

        let profile = RequesterProfile {
            id: Uuid::new_v4(),
            display_name: request.display_name,
        };
        self.store.upsert_requester(profile.clone()).await?;
        debug!("Registered requester {}", profile.id);
        Ok(profile)
    }

    pub async fn get_provider(&self, provider_id: Uuid) -> Result<ProviderProfile, ProviderError> {
        Ok(self.store.get_provider(provider_id).await?)
    }
}
