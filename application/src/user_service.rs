use domain::models::chunk_text;
use domain::organization::Organization;
use infrastructure::store::{StoreRegistry, UserRecord};
use infrastructure::vector_index::VectorIndexStore;
use shared::types::{CoreError, Result};
use std::sync::Arc;
use tracing::info;

/// User lifecycle around the vector index: creating a user builds their
/// initial index, updating their text replaces it, deleting removes both.
pub struct UserService {
    registry: Arc<StoreRegistry>,
    index: Arc<VectorIndexStore>,
}

impl UserService {
    pub fn new(registry: Arc<StoreRegistry>, index: Arc<VectorIndexStore>) -> Self {
        Self { registry, index }
    }

    pub async fn create_user(
        &self,
        name: &str,
        password: &str,
        text: &str,
        organization: Organization,
    ) -> Result<()> {
        if name.trim().is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "name and password are required".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(CoreError::Validation("initial text is required".to_string()));
        }
        let store = self.registry.store(organization);
        if store.find_user(name)?.is_some() {
            return Err(CoreError::Validation("name already exists".to_string()));
        }
        store.insert_user(name, password)?;
        self.index
            .build(name, organization, &chunk_text(text))
            .await?;
        info!(user = name, org = %organization, "user created");
        Ok(())
    }

    /// Replaces the user's corpus and bumps their modification counter.
    pub async fn update_user_text(
        &self,
        name: &str,
        text: &str,
        organization: Organization,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("new text is required".to_string()));
        }
        let store = self.registry.store(organization);
        if store.find_user(name)?.is_none() {
            return Err(CoreError::NotFound(format!("user {name} not found")));
        }
        self.index
            .replace(name, organization, &chunk_text(text))
            .await?;
        store.bump_modifications(name)?;
        Ok(())
    }

    pub fn delete_user(&self, name: &str, organization: Organization) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".to_string()));
        }
        let store = self.registry.store(organization);
        if !store.delete_user(name)? {
            return Err(CoreError::NotFound(format!("user {name} not found")));
        }
        self.index.remove(name, organization)?;
        info!(user = name, org = %organization, "user deleted");
        Ok(())
    }

    pub fn list_users(&self, organization: Organization) -> Result<Vec<UserRecord>> {
        self.registry.store(organization).list_users()
    }
}
