use std::path::Path;

use chrono::NaiveDate;
use db::LeagueRepo;
use domain::errors::DomainResult;

/// Everything a service operation needs: the open repository and the
/// in-game current date. Passed explicitly; there is no process-global
/// league state.
#[derive(Clone)]
pub struct LeagueContext {
    pub repo: LeagueRepo,
    pub current_date: NaiveDate,
}

impl LeagueContext {
    pub fn new(repo: LeagueRepo, current_date: NaiveDate) -> Self {
        Self { repo, current_date }
    }

    /// Open (and bootstrap) a league database.
    pub async fn open(path: impl AsRef<Path>, current_date: NaiveDate) -> DomainResult<Self> {
        let repo = LeagueRepo::open(path).await?;
        repo.init_db().await?;
        Ok(Self { repo, current_date })
    }

    pub fn with_date(&self, current_date: NaiveDate) -> Self {
        Self {
            repo: self.repo.clone(),
            current_date,
        }
    }
}
