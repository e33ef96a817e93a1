use log::{debug, info, warn};

use crate::{
    api::{PlaylistApi, DEFAULT_BATCH_CAP},
    error::{Error, Result},
    model::is_local_uri,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Replace(Vec<String>),
    Append(Vec<String>),
}

impl BatchOp {
    pub fn locators(&self) -> &[String] {
        match self {
            BatchOp::Replace(locators) | BatchOp::Append(locators) => locators,
        }
    }
}

/// Calls needed to set a playlist to an ordered list of locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan(pub Vec<BatchOp>);

impl BatchPlan {
    /// One replace with the first `cap` locators, then appends of up to `cap`
    /// each. An empty input still yields a single (clearing) replace.
    pub fn replace(locators: &[String], cap: usize) -> Self {
        let cap = cap.max(1);
        let split = locators.len().min(cap);
        let mut ops = vec![BatchOp::Replace(locators[..split].to_vec())];
        ops.extend(
            locators[split..]
                .chunks(cap)
                .map(|chunk| BatchOp::Append(chunk.to_vec())),
        );
        BatchPlan(ops)
    }

    pub fn append(locators: &[String], cap: usize) -> Self {
        BatchPlan(
            locators
                .chunks(cap.max(1))
                .map(|chunk| BatchOp::Append(chunk.to_vec()))
                .collect(),
        )
    }
}

/// Applies playlist mutations in batches no larger than `cap`.
///
/// Batches are sent one at a time. When one fails the error names its index
/// and the batches before it stay applied.
#[derive(Debug, Clone, Copy)]
pub struct BatchMutator {
    cap: usize,
}

impl Default for BatchMutator {
    fn default() -> Self {
        BatchMutator::new(DEFAULT_BATCH_CAP)
    }
}

impl BatchMutator {
    pub fn new(cap: usize) -> Self {
        BatchMutator { cap: cap.max(1) }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Replaces the playlist's contents so its order equals `locators`.
    pub async fn apply_replace(
        &self,
        api: &impl PlaylistApi,
        playlist_id: &str,
        locators: &[String],
    ) -> Result<()> {
        let plan = BatchPlan::replace(locators, self.cap);
        self.execute(api, playlist_id, &plan).await?;
        info!("Replaced playlist {playlist_id} with {} tracks", locators.len());
        Ok(())
    }

    pub async fn apply_append(
        &self,
        api: &impl PlaylistApi,
        playlist_id: &str,
        locators: &[String],
    ) -> Result<()> {
        let plan = BatchPlan::append(locators, self.cap);
        self.execute(api, playlist_id, &plan).await?;
        info!("Appended {} tracks to playlist {playlist_id}", locators.len());
        Ok(())
    }

    /// Removes every occurrence of each locator, not just one.
    pub async fn apply_remove(
        &self,
        api: &impl PlaylistApi,
        playlist_id: &str,
        locators: &[String],
    ) -> Result<()> {
        for (chunk, batch) in locators.chunks(self.cap).enumerate() {
            debug!("Removing batch {chunk} ({} locators) from {playlist_id}", batch.len());
            api.remove_all_occurrences(playlist_id, batch)
                .await
                .map_err(|e| Error::mutation(chunk, e))?;
        }
        info!("Removed {} locators from playlist {playlist_id}", locators.len());
        Ok(())
    }

    async fn execute(&self, api: &impl PlaylistApi, playlist_id: &str, plan: &BatchPlan) -> Result<()> {
        let local = plan.0.iter().flat_map(BatchOp::locators).filter(|l| is_local_uri(l)).count();
        if local > 0 {
            warn!("Writing {local} local files to {playlist_id}, Spotify rejects those batches");
        }
        for (chunk, op) in plan.0.iter().enumerate() {
            debug!("Batch {chunk} on {playlist_id}: {op:?}");
            let result = match op {
                BatchOp::Replace(locators) => api.replace_items(playlist_id, locators).await,
                BatchOp::Append(locators) => api.append_items(playlist_id, locators).await,
            };
            result.map_err(|e| Error::mutation(chunk, e))?;
        }
        Ok(())
    }
}
