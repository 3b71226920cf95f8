/// Category provisioning
///
/// A user with no categories gets the default set the first time they are
/// listed. Seeding relies on the store's conflict-tolerant insert, so two
/// racing first requests still end with one copy of each default.
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::models::category::{Category, NewCategory};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct CategoryService {
    store: SharedStore,
}

impl CategoryService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Lists the user's categories, seeding the defaults if there are none
    pub async fn ensure_categories(&self, user_id: i64) -> ServiceResult<Vec<Category>> {
        let categories = self.store.list_categories(user_id).await?;
        if !categories.is_empty() {
            return Ok(categories);
        }

        info!(user_id, "Provisioning default categories");
        self.store
            .seed_categories(user_id, &NewCategory::defaults())
            .await?;

        Ok(self.store.list_categories(user_id).await?)
    }

    /// Creates a category owned by the caller
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name.
    pub async fn create_category(
        &self,
        user_id: i64,
        input: NewCategory,
    ) -> ServiceResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Category name is required"));
        }

        let category = self
            .store
            .insert_category(user_id, NewCategory::new(name, input.color.trim()))
            .await?;

        debug!(user_id, category_id = category.id, "Category created");
        Ok(category)
    }

    /// Deletes one of the caller's categories; its tasks lose the reference
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category is missing or owned by someone else.
    pub async fn delete_category(&self, user_id: i64, category_id: i64) -> ServiceResult<()> {
        if !self.store.delete_category(user_id, category_id).await? {
            return Err(ServiceError::NotFound("Category"));
        }

        debug!(user_id, category_id, "Category deleted");
        Ok(())
    }
}
