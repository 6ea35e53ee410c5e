//! Dishes and categories.
//!
//! Plain CRUD. The only rules are the ones orders depend on: prices are
//! never negative and category names are unique.

use common::{CategoryId, DishId, Money};
use serde::Deserialize;
use store::{Category, Dish, NewDish, Store};
use validator::Validate;

use crate::error::DomainError;

fn ensure_non_negative(price: Money) -> Result<(), DomainError> {
    if price.is_negative() {
        return Err(DomainError::BadRequest("price must not be negative".to_string()));
    }
    Ok(())
}

fn default_available() -> bool {
    true
}

/// Command to add a dish to the catalog.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDish {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub price: Money,

    #[serde(default = "default_available")]
    pub available: bool,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Partial update of a dish.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateDish {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub available: Option<bool>,
    #[validate(length(max = 255))]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: String,
}

/// Service for the dish and category catalog.
#[derive(Clone)]
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_dish(&self, cmd: CreateDish) -> Result<Dish, DomainError> {
        cmd.validate()?;
        ensure_non_negative(cmd.price)?;

        let dish = self
            .store
            .create_dish(NewDish {
                name: cmd.name,
                description: cmd.description,
                price: cmd.price,
                available: cmd.available,
                image_path: cmd.image_path,
            })
            .await?;

        tracing::info!(dish_id = %dish.id, "Dish created");
        Ok(dish)
    }

    pub async fn get_dish(&self, id: DishId) -> Result<Dish, DomainError> {
        self.store
            .find_dish(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Dish {id} not found")))
    }

    pub async fn list_dishes(&self) -> Result<Vec<Dish>, DomainError> {
        Ok(self.store.list_dishes().await?)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update_dish(&self, id: DishId, patch: UpdateDish) -> Result<Dish, DomainError> {
        patch.validate()?;

        let mut dish = self.get_dish(id).await?;
        if let Some(name) = patch.name {
            dish.name = name;
        }
        if let Some(description) = patch.description {
            dish.description = Some(description);
        }
        if let Some(price) = patch.price {
            ensure_non_negative(price)?;
            dish.price = price;
        }
        if let Some(available) = patch.available {
            dish.available = available;
        }
        if let Some(path) = patch.image_path {
            dish.image_path = Some(path);
        }

        Ok(self.store.save_dish(&dish).await?)
    }

    /// Deletes a dish together with the orders placed for it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_dish(&self, id: DishId) -> Result<(), DomainError> {
        self.store.delete_dish(id).await?;
        tracing::info!(dish_id = %id, "Dish deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_category(&self, cmd: CreateCategory) -> Result<Category, DomainError> {
        cmd.validate()?;
        Ok(self.store.create_category(cmd.name.trim()).await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.store
            .find_category(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Category {id} not found")))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.store.list_categories().await?)
    }
}
