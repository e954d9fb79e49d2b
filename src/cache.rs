//! Read-through cache in front of a [`DataGateway`].
//!
//! Keys are structured per team (with the sprint id as a second component
//! for work item reads), so a whole team's entries can be invalidated by
//! key prefix after an out-of-band change. Refills are single-flight: one
//! fetch in flight per key, concurrent callers await its result instead of
//! issuing their own.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;
use crate::gateway::DataGateway;
use crate::model::{Sprint, TeamKey, TrackedTeamConfig, WorkItem};

type Cell<T> = Arc<OnceCell<T>>;
type CellMap<K, T> = Mutex<HashMap<K, Cell<T>>>;

/// Caching wrapper over any [`DataGateway`].
pub struct CachingGateway<G> {
    inner: G,
    sprints: CellMap<TeamKey, Vec<Sprint>>,
    sprint_items: CellMap<(TeamKey, String), Vec<WorkItem>>,
    backlog: CellMap<TeamKey, Vec<WorkItem>>,
    work_days: CellMap<TeamKey, HashSet<Weekday>>,
    config: CellMap<TeamKey, TrackedTeamConfig>,
}

impl<G: DataGateway> CachingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            sprints: Mutex::new(HashMap::new()),
            sprint_items: Mutex::new(HashMap::new()),
            backlog: Mutex::new(HashMap::new()),
            work_days: Mutex::new(HashMap::new()),
            config: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached entry whose key starts with `team`.
    pub async fn invalidate_team(&self, team: &TeamKey) {
        self.sprints.lock().await.remove(team);
        self.backlog.lock().await.remove(team);
        self.work_days.lock().await.remove(team);
        self.config.lock().await.remove(team);
        self.sprint_items
            .lock()
            .await
            .retain(|(key_team, _), _| key_team != team);
        log::debug!("invalidated cache entries for {team}");
    }
}

/// The cell for `key`, inserting an empty one under the map lock. The lock
/// is held only for the lookup, never across a fetch.
async fn cell_for<K, T>(map: &CellMap<K, T>, key: &K) -> Cell<T>
where
    K: Eq + Hash + Clone,
{
    let mut map = map.lock().await;
    map.entry(key.clone()).or_default().clone()
}

#[async_trait]
impl<G: DataGateway> DataGateway for CachingGateway<G> {
    async fn read_team_sprints(&self, team: &TeamKey) -> Result<Vec<Sprint>> {
        let cell = cell_for(&self.sprints, team).await;
        let value = cell
            .get_or_try_init(|| self.inner.read_team_sprints(team))
            .await?;
        Ok(value.clone())
    }

    async fn read_sprint_work_items(
        &self,
        team: &TeamKey,
        sprint_id: &str,
    ) -> Result<Vec<WorkItem>> {
        let key = (team.clone(), sprint_id.to_string());
        let cell = cell_for(&self.sprint_items, &key).await;
        let value = cell
            .get_or_try_init(|| self.inner.read_sprint_work_items(team, sprint_id))
            .await?;
        Ok(value.clone())
    }

    async fn read_backlog_work_items(&self, team: &TeamKey) -> Result<Vec<WorkItem>> {
        let cell = cell_for(&self.backlog, team).await;
        let value = cell
            .get_or_try_init(|| self.inner.read_backlog_work_items(team))
            .await?;
        Ok(value.clone())
    }

    async fn read_team_work_days(&self, team: &TeamKey) -> Result<HashSet<Weekday>> {
        let cell = cell_for(&self.work_days, team).await;
        let value = cell
            .get_or_try_init(|| self.inner.read_team_work_days(team))
            .await?;
        Ok(value.clone())
    }

    async fn read_team_config(&self, team: &TeamKey) -> Result<TrackedTeamConfig> {
        let cell = cell_for(&self.config, team).await;
        let value = cell
            .get_or_try_init(|| self.inner.read_team_config(team))
            .await?;
        Ok(value.clone())
    }
}
