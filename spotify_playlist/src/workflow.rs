use std::collections::HashSet;

use log::{info, warn};

use crate::{
    api::PlaylistApi,
    dedup::{self, DedupStrategy, EquivalenceKey},
    error::{Error, Result},
    fetch::{fetch_all, fetch_features, find_playlist},
    model::{PlaylistSummary, Track},
    mutate::BatchMutator,
    sort::{sort, SortSpec},
};

/// A playlist named by id or by (case-insensitive) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistRef {
    Id(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortReport {
    pub playlist_id: String,
    pub spec: SortSpec,
    pub tracks: usize,
    /// False when the playlist was already in the requested order.
    pub changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub exact_removed: usize,
    pub fuzzy_removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<String>,
    /// Reference playlists that could not be found.
    pub missing_references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyReport {
    pub target: PlaylistSummary,
    pub created: bool,
    pub copied: usize,
}

/// Fetch, transform, write back. Each operation runs its remote calls one
/// after another; with `dry_run` set nothing is written.
pub struct PlaylistTools<A> {
    api: A,
    mutator: BatchMutator,
    dry_run: bool,
}

impl<A: PlaylistApi> PlaylistTools<A> {
    pub fn new(api: A, mutator: BatchMutator) -> Self {
        PlaylistTools {
            api,
            mutator,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn resolve(&self, playlist: &PlaylistRef) -> Result<String> {
        match playlist {
            PlaylistRef::Id(id) => Ok(id.clone()),
            PlaylistRef::Name(name) => Ok(find_playlist(&self.api, name).await?.id),
        }
    }

    /// Rewrites the playlist in the order given by `spec`.
    pub async fn sort_playlist(&self, playlist: &PlaylistRef, spec: SortSpec) -> Result<SortReport> {
        let playlist_id = self.resolve(playlist).await?;
        let tracks = fetch_all(&self.api, &playlist_id).await?;
        let features = if spec.key.needs_features() {
            Some(fetch_features(&self.api, &tracks, self.mutator.cap()).await?)
        } else {
            None
        };
        let sorted = sort(&tracks, &spec, features.as_ref())?;
        let changed = sorted != tracks;
        if !changed {
            info!("Playlist {playlist_id} is already sorted by {}", spec.key);
        } else if !self.dry_run {
            self.mutator
                .apply_replace(&self.api, &playlist_id, &locators(&sorted))
                .await?;
        }
        Ok(SortReport {
            playlist_id,
            spec,
            tracks: sorted.len(),
            changed,
        })
    }

    /// Removes exact duplicates, then re-reads the playlist and removes fuzzy
    /// (same title and primary artist) duplicates.
    pub async fn remove_duplicates(
        &self,
        playlist: &PlaylistRef,
        strategy: DedupStrategy,
        fuzzy: bool,
    ) -> Result<DedupReport> {
        let playlist_id = self.resolve(playlist).await?;
        let tracks = fetch_all(&self.api, &playlist_id).await?;

        let (exact_removed, mut tracks) = self
            .dedup_pass(&playlist_id, &tracks, EquivalenceKey::Identity, strategy)
            .await?;
        info!("Exact duplicates removed from {playlist_id}: {exact_removed}");

        let mut fuzzy_removed = 0;
        if fuzzy {
            if exact_removed > 0 && !self.dry_run {
                tracks = fetch_all(&self.api, &playlist_id).await?;
            }
            let (removed, rest) = self
                .dedup_pass(&playlist_id, &tracks, EquivalenceKey::Fuzzy, strategy)
                .await?;
            info!("Fuzzy duplicates removed from {playlist_id}: {removed}");
            fuzzy_removed = removed;
            tracks = rest;
        }

        Ok(DedupReport {
            exact_removed,
            fuzzy_removed,
            remaining: tracks.len(),
        })
    }

    /// Returns how many tracks the pass drops and what should be left.
    async fn dedup_pass(
        &self,
        playlist_id: &str,
        tracks: &[Track],
        key: EquivalenceKey,
        strategy: DedupStrategy,
    ) -> Result<(usize, Vec<Track>)> {
        let rest = dedup::remainder(tracks, key, strategy);
        let removed = tracks.len() - rest.len();
        if removed == 0 || self.dry_run {
            return Ok((removed, rest));
        }
        match strategy {
            DedupStrategy::KeepFirst => {
                self.mutator
                    .apply_replace(&self.api, playlist_id, &locators(&rest))
                    .await?
            }
            DedupStrategy::RemoveAll => {
                let doomed = dedup::removal_locators(tracks, key);
                self.mutator.apply_remove(&self.api, playlist_id, &doomed).await?
            }
        }
        Ok((removed, rest))
    }

    /// Removes from `source` every track that is also in one of `references`.
    pub async fn clean_against(
        &self,
        source: &PlaylistRef,
        references: &[String],
        key: EquivalenceKey,
    ) -> Result<CleanReport> {
        let source_id = self.resolve(source).await?;
        let tracks = fetch_all(&self.api, &source_id).await?;

        let mut report = CleanReport::default();
        let mut reference_tracks = Vec::with_capacity(references.len());
        for name in references.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let reference = match find_playlist(&self.api, name).await {
                Ok(reference) => reference,
                Err(Error::NotFound(_)) => {
                    warn!("Reference playlist '{name}' not found, skipping");
                    report.missing_references.push(name.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };
            if reference.id == source_id {
                warn!("Skipping '{name}': it is the playlist being cleaned");
                continue;
            }
            reference_tracks.push(fetch_all(&self.api, &reference.id).await?);
        }

        report.removed = dedup::shared_locators(&tracks, &reference_tracks, key);
        if !report.removed.is_empty() && !self.dry_run {
            self.mutator
                .apply_remove(&self.api, &source_id, &report.removed)
                .await?;
        }
        info!("Removed {} tracks from {source_id}", report.removed.len());
        Ok(report)
    }

    /// Appends the tracks of `source` to the playlist named `target`, creating
    /// it as a private playlist when it does not exist yet.
    pub async fn copy_tracks(&self, source: &PlaylistRef, target: &str, skip_existing: bool) -> Result<CopyReport> {
        let source_id = self.resolve(source).await?;
        let tracks = fetch_all(&self.api, &source_id).await?;

        let (target, created, existing) = match find_playlist(&self.api, target).await {
            Ok(found) => {
                let existing = if skip_existing {
                    fetch_all(&self.api, &found.id).await?
                } else {
                    Vec::new()
                };
                (found, false, existing)
            }
            Err(Error::NotFound(_)) if self.dry_run => {
                let planned = PlaylistSummary {
                    id: String::new(),
                    name: target.to_string(),
                    total_tracks: 0,
                };
                (planned, true, Vec::new())
            }
            Err(Error::NotFound(_)) => {
                let user_id = self.api.current_user_id().await?;
                let created = self.api.create_playlist(&user_id, target, false).await?;
                info!("Created playlist '{}' ({})", created.name, created.id);
                (created, true, Vec::new())
            }
            Err(e) => return Err(e),
        };

        let present: HashSet<&str> = existing.iter().map(|t| t.uri.as_str()).collect();
        let to_copy: Vec<String> = locators(&tracks)
            .into_iter()
            .filter(|uri| !present.contains(uri.as_str()))
            .collect();
        if !to_copy.is_empty() && !self.dry_run {
            self.mutator.apply_append(&self.api, &target.id, &to_copy).await?;
        }
        Ok(CopyReport {
            target,
            created,
            copied: to_copy.len(),
        })
    }
}

fn locators(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.uri.clone()).collect()
}
