//! In-memory view of the wine catalog, backed by a repository.
//!
//! Every mutation goes to the repository first; the cached list changes
//! only after the repository call succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use vinmap_core::{Country, NewWine, Result, Wine, WineFilter, WineRepository, WineUpdate};

/// Shared catalog cache.
#[derive(Clone)]
pub struct WineStore {
    inner: Arc<WineStoreInner>,
}

struct WineStoreInner {
    repo: Arc<dyn WineRepository>,
    wines: RwLock<Vec<Wine>>,
}

fn newest_first(wines: &mut [Wine]) {
    wines.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

impl WineStore {
    /// Create an empty store; call [`WineStore::load`] to fill it.
    pub fn new(repo: Arc<dyn WineRepository>) -> Self {
        Self {
            inner: Arc::new(WineStoreInner {
                repo,
                wines: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Replace the cache with the repository's contents.
    ///
    /// On failure the previous list is kept and the error returned.
    pub async fn load(&self) -> Result<usize> {
        match self.inner.repo.list_all().await {
            Ok(mut wines) => {
                newest_first(&mut wines);
                let count = wines.len();
                *self.inner.wines.write().await = wines;
                info!(
                    subsystem = "api",
                    component = "wine_store",
                    op = "load",
                    result_count = count,
                    "Wine catalog loaded"
                );
                Ok(count)
            }
            Err(e) => {
                error!(
                    subsystem = "api",
                    component = "wine_store",
                    op = "load",
                    error = %e,
                    "Failed to load wine catalog"
                );
                Err(e)
            }
        }
    }

    /// Every wine, newest first.
    pub async fn all(&self) -> Vec<Wine> {
        self.inner.wines.read().await.clone()
    }

    pub async fn by_id(&self, id: Uuid) -> Option<Wine> {
        self.inner
            .wines
            .read()
            .await
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    /// Wines from one country, newest first.
    pub async fn by_country(&self, country: Country) -> Vec<Wine> {
        self.inner
            .wines
            .read()
            .await
            .iter()
            .filter(|w| w.country == country)
            .cloned()
            .collect()
    }

    /// Wines matching an optional country and the filter, newest first.
    pub async fn list(&self, country: Option<Country>, filter: &WineFilter) -> Vec<Wine> {
        self.inner
            .wines
            .read()
            .await
            .iter()
            .filter(|w| country.map_or(true, |c| w.country == c))
            .filter(|w| filter.matches(w))
            .cloned()
            .collect()
    }

    /// Matching wine count for every country (zero included).
    pub async fn count_by_country(&self, filter: &WineFilter) -> BTreeMap<Country, usize> {
        let mut counts: BTreeMap<Country, usize> = Country::ALL.iter().map(|c| (*c, 0)).collect();
        for wine in self.inner.wines.read().await.iter() {
            if filter.matches(wine) {
                *counts.entry(wine.country).or_insert(0) += 1;
            }
        }
        counts
    }

    pub async fn add(&self, wine: NewWine) -> Result<Wine> {
        wine.validate()?;
        let created = self.inner.repo.insert(wine).await?;

        let mut wines = self.inner.wines.write().await;
        wines.push(created.clone());
        newest_first(&mut wines);

        info!(
            subsystem = "api",
            component = "wine_store",
            op = "add",
            wine_id = %created.id,
            name = %created.name,
            "Wine added"
        );
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, update: WineUpdate) -> Result<Wine> {
        update.validate()?;
        let updated = self.inner.repo.update(id, update).await?;

        let mut wines = self.inner.wines.write().await;
        match wines.iter_mut().find(|w| w.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => wines.push(updated.clone()),
        }
        newest_first(&mut wines);

        info!(
            subsystem = "api",
            component = "wine_store",
            op = "update",
            wine_id = %id,
            "Wine updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.inner.repo.delete(id).await?;
        self.inner.wines.write().await.retain(|w| w.id != id);

        info!(
            subsystem = "api",
            component = "wine_store",
            op = "delete",
            wine_id = %id,
            "Wine deleted"
        );
        Ok(())
    }
}
