//! Category backfill for records created before `wineCategory` existed.
//!
//! The run is sequential and stops at the first persistence failure;
//! records written before the failure stay written.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use vinmap_core::{infer_category, Error, Result, Wine, WineCategory, WineRepository, WineUpdate};

/// A category assignment made (or planned, in dry-run mode) by the backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChange {
    pub id: Uuid,
    pub name: String,
    pub category: WineCategory,
}

/// Outcome of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub changes: Vec<CategoryChange>,
}

/// Assign an inferred category to every wine that has none.
///
/// Wines that already carry a category are never rewritten. With `dry_run`
/// the report lists the changes without writing them.
pub async fn backfill_categories(
    repo: &dyn WineRepository,
    dry_run: bool,
) -> Result<BackfillReport> {
    let start = Instant::now();
    let wines = repo.list_all().await?;

    info!(
        subsystem = "migrate",
        component = "backfill",
        op = "backfill_categories",
        result_count = wines.len(),
        dry_run,
        "Starting category backfill"
    );

    let mut report = BackfillReport {
        total: wines.len(),
        dry_run,
        ..Default::default()
    };

    for wine in &wines {
        if let Some(existing) = wine.wine_category {
            debug!(
                subsystem = "migrate",
                wine_id = %wine.id,
                name = %wine.name,
                category = %existing,
                "Skipping wine that already has a category"
            );
            report.skipped += 1;
            continue;
        }

        let category = infer_category(&wine.name, wine.declared_type());
        if !dry_run {
            repo.update(wine.id, WineUpdate::category(category)).await?;
        }

        info!(
            subsystem = "migrate",
            wine_id = %wine.id,
            name = %wine.name,
            category = %category,
            dry_run,
            "Assigned category"
        );
        report.updated += 1;
        report.changes.push(CategoryChange {
            id: wine.id,
            name: wine.name.clone(),
            category,
        });
    }

    info!(
        subsystem = "migrate",
        component = "backfill",
        op = "backfill_categories",
        total = report.total,
        updated = report.updated,
        skipped = report.skipped,
        duration_ms = start.elapsed().as_millis() as u64,
        "Category backfill finished"
    );

    Ok(report)
}

/// Overwrite the category of the first wine whose name matches exactly.
pub async fn set_category_by_name(
    repo: &dyn WineRepository,
    name: &str,
    category: WineCategory,
) -> Result<Wine> {
    let wine = repo
        .find_by_name(name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("wine named '{}'", name)))?;

    let updated = repo.update(wine.id, WineUpdate::category(category)).await?;

    info!(
        subsystem = "migrate",
        component = "backfill",
        op = "set_category",
        wine_id = %updated.id,
        name = %updated.name,
        category = %category,
        "Category set"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWineRepository;
    use async_trait::async_trait;
    use vinmap_core::{Country, NewWine};

    fn new_wine(name: &str, wine_type: Option<&str>, category: Option<WineCategory>) -> NewWine {
        NewWine {
            name: name.to_string(),
            country: Country::France,
            wine_type: wine_type.map(str::to_string),
            wine_category: category,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_backfill_skips_categorized_and_updates_rest() {
        let repo = MemoryWineRepository::new();
        let kept = repo
            .insert(new_wine("Domaine X Rosé", None, Some(WineCategory::Red)))
            .await
            .unwrap();
        let rose = repo.insert(new_wine("Domaine Y Rosé", None, None)).await.unwrap();
        let plain = repo.insert(new_wine("Unknown Wine", None, None)).await.unwrap();

        let report = backfill_categories(&repo, false).await.unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            repo.fetch(kept.id).await.unwrap().wine_category,
            Some(WineCategory::Red)
        );
        assert_eq!(
            repo.fetch(rose.id).await.unwrap().wine_category,
            Some(WineCategory::Rose)
        );
        assert_eq!(
            repo.fetch(plain.id).await.unwrap().wine_category,
            Some(WineCategory::Red)
        );
    }

    #[tokio::test]
    async fn test_backfill_uses_declared_type() {
        let repo = MemoryWineRepository::new();
        let wine = repo
            .insert(new_wine("Mystery 2020", Some("Sparkling"), None))
            .await
            .unwrap();

        backfill_categories(&repo, false).await.unwrap();

        assert_eq!(
            repo.fetch(wine.id).await.unwrap().wine_category,
            Some(WineCategory::Sparkling)
        );
    }

    #[tokio::test]
    async fn test_backfill_treats_blank_category_as_missing() {
        let legacy = Wine::from_document(
            Uuid::now_v7(),
            serde_json::json!({
                "name": "Chablis Blanc Premier Cru",
                "country": "france",
                "wineCategory": "",
                "timestamp": 1_650_000_000_000i64
            }),
        )
        .unwrap();
        let id = legacy.id;
        let repo = MemoryWineRepository::with_wines([legacy]);

        let report = backfill_categories(&repo, false).await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(
            repo.fetch(id).await.unwrap().wine_category,
            Some(WineCategory::White)
        );
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let repo = MemoryWineRepository::new();
        let wine = repo.insert(new_wine("Veuve Brut", None, None)).await.unwrap();

        let report = backfill_categories(&repo, true).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.updated, 1);
        assert_eq!(report.changes[0].category, WineCategory::Sparkling);
        assert!(repo.fetch(wine.id).await.unwrap().wine_category.is_none());
    }

    #[tokio::test]
    async fn test_rerun_is_all_skips() {
        let repo = MemoryWineRepository::new();
        repo.insert(new_wine("Barolo", None, None)).await.unwrap();

        backfill_categories(&repo, false).await.unwrap();
        let second = backfill_categories(&repo, false).await.unwrap();

        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped, 1);
    }

    #[tokio::test]
    async fn test_set_category_by_name() {
        let repo = MemoryWineRepository::new();
        repo.insert(new_wine("Majestic Chardonnay", Some("Red"), Some(WineCategory::Red)))
            .await
            .unwrap();

        let wine = set_category_by_name(&repo, "Majestic Chardonnay", WineCategory::White)
            .await
            .unwrap();
        assert_eq!(wine.wine_category, Some(WineCategory::White));

        let missing = set_category_by_name(&repo, "Nope", WineCategory::White).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    /// Repository whose writes always fail.
    struct ReadOnlyRepository(MemoryWineRepository);

    #[async_trait]
    impl WineRepository for ReadOnlyRepository {
        async fn list_all(&self) -> Result<Vec<Wine>> {
            self.0.list_all().await
        }
        async fn fetch(&self, id: Uuid) -> Result<Wine> {
            self.0.fetch(id).await
        }
        async fn find_by_name(&self, name: &str) -> Result<Option<Wine>> {
            self.0.find_by_name(name).await
        }
        async fn insert(&self, wine: NewWine) -> Result<Wine> {
            self.0.insert(wine).await
        }
        async fn update(&self, _id: Uuid, _update: WineUpdate) -> Result<Wine> {
            Err(Error::Internal("store is read-only".to_string()))
        }
        async fn delete(&self, _id: Uuid) -> Result<()> {
            Err(Error::Internal("store is read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_first_write_failure_aborts_run() {
        let repo = ReadOnlyRepository(MemoryWineRepository::new());
        repo.insert(new_wine("Barolo", None, None)).await.unwrap();

        let result = backfill_categories(&repo, false).await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
