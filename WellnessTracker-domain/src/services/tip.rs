use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info};

use wellness_tracker_data::database::DatabasePool;
use wellness_tracker_data::repository::{HealthTipRepositoryTrait, RepositoryError, SqliteHealthTipRepository};

use crate::entities::conversions;
use crate::entities::tip::{HealthTip, DEFAULT_TIPS};

/// Health tip service errors
#[derive(Debug, Error)]
pub enum TipServiceError {
    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

impl From<RepositoryError> for TipServiceError {
    fn from(err: RepositoryError) -> Self {
        TipServiceError::RepositoryError(err.to_string())
    }
}

#[async_trait]
pub trait TipServiceTrait: Send + Sync {
    /// Tip to show on `today`. Never fails: storage problems yield the fallback tip.
    async fn tip_of_day(&self, today: NaiveDate) -> HealthTip;

    /// All active tips, latest display date first
    async fn list_tips(&self) -> Result<Vec<HealthTip>, TipServiceError>;

    /// Insert the built-in tips that are not stored yet; returns how many were added
    async fn seed_default_tips(&self) -> Result<usize, TipServiceError>;
}

/// Pick the tip of the day: a pinned tip wins, then a random active tip,
/// then the built-in fallback.
pub fn select_tip_of_day<G: Rng + ?Sized>(pinned: Option<HealthTip>, active: &[HealthTip], rng: &mut G) -> HealthTip {
    if let Some(tip) = pinned {
        return tip;
    }
    active.choose(rng).cloned().unwrap_or_else(HealthTip::fallback)
}

pub struct TipService<R: HealthTipRepositoryTrait> {
    repository: R,
}

impl<R: HealthTipRepositoryTrait> TipService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    async fn pinned_for(&self, today: NaiveDate) -> Result<Option<HealthTip>, TipServiceError> {
        self.repository
            .pinned_for(&conversions::format_date(today))
            .await?
            .map(|tip| conversions::convert_to_domain_tip(tip).map_err(TipServiceError::DataError))
            .transpose()
    }

    async fn try_tip_of_day(&self, today: NaiveDate) -> Result<HealthTip, TipServiceError> {
        if let Some(tip) = self.pinned_for(today).await? {
            debug!("Using tip {} pinned to {}", tip.id, today);
            return Ok(tip);
        }

        let active = self.list_tips().await?;
        Ok(select_tip_of_day(None, &active, &mut rand::thread_rng()))
    }
}

#[async_trait]
impl<R: HealthTipRepositoryTrait> TipServiceTrait for TipService<R> {
    async fn tip_of_day(&self, today: NaiveDate) -> HealthTip {
        match self.try_tip_of_day(today).await {
            Ok(tip) => tip,
            Err(e) => {
                error!("Failed to load tip of the day, using fallback: {}", e);
                HealthTip::fallback()
            }
        }
    }

    async fn list_tips(&self) -> Result<Vec<HealthTip>, TipServiceError> {
        let tips = self.repository.list_active().await?;
        tips.into_iter()
            .map(|tip| conversions::convert_to_domain_tip(tip).map_err(TipServiceError::DataError))
            .collect()
    }

    async fn seed_default_tips(&self) -> Result<usize, TipServiceError> {
        let mut inserted = 0;
        for tip in DEFAULT_TIPS.iter() {
            if self.repository.create_if_title_absent(conversions::convert_to_data_new_tip(tip)).await? {
                inserted += 1;
            }
        }
        info!("Seeded {} of {} default health tips", inserted, DEFAULT_TIPS.len());
        Ok(inserted)
    }
}

/// Create a tip service on top of the SQLite repository
pub fn create_tip_service(pool: DatabasePool) -> TipService<SqliteHealthTipRepository> {
    TipService::new(SqliteHealthTipRepository::new(pool))
}
