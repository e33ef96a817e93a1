use std::collections::{HashMap, HashSet};

use crate::model::Track;

/// What counts as "the same track".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquivalenceKey {
    /// Same locator.
    #[default]
    Identity,
    /// Same title and primary artist, compared verbatim. Catches the single
    /// and album releases of one song, which have different ids.
    Fuzzy,
}

/// How duplicates are taken out of a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupStrategy {
    /// Rewrite the playlist with the first occurrence of every key.
    #[default]
    KeepFirst,
    /// Remove every occurrence of the duplicated locators, the copy that
    /// should have been kept included.
    RemoveAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackKey {
    Identity(String),
    Fuzzy { title: String, artist: String },
}

impl EquivalenceKey {
    pub fn key_of(self, track: &Track) -> TrackKey {
        match self {
            EquivalenceKey::Identity => TrackKey::Identity(track.uri.clone()),
            EquivalenceKey::Fuzzy => TrackKey::Fuzzy {
                title: track.title.clone(),
                artist: track.primary_artist().to_string(),
            },
        }
    }
}

/// Tracks sharing one key. `kept` is the first occurrence, `extras` the rest,
/// all as indices into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: TrackKey,
    pub kept: usize,
    pub extras: Vec<usize>,
}

/// Groups with more than one member, in order of first appearance.
pub fn find_duplicates(tracks: &[Track], key: EquivalenceKey) -> Vec<DuplicateGroup> {
    let mut index: HashMap<TrackKey, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (position, track) in tracks.iter().enumerate() {
        let track_key = key.key_of(track);
        match index.get(&track_key) {
            Some(&group) => groups[group].extras.push(position),
            None => {
                index.insert(track_key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key: track_key,
                    kept: position,
                    extras: Vec::new(),
                });
            }
        }
    }
    groups.retain(|g| !g.extras.is_empty());
    groups
}

/// Keys that occur more than once.
pub fn find_removals(tracks: &[Track], key: EquivalenceKey) -> Vec<TrackKey> {
    find_duplicates(tracks, key).into_iter().map(|g| g.key).collect()
}

/// The first occurrence of every key, in original order.
pub fn surviving(tracks: &[Track], key: EquivalenceKey) -> Vec<&Track> {
    let mut seen = HashSet::new();
    tracks.iter().filter(|t| seen.insert(key.key_of(t))).collect()
}

/// Locators to hand to a remove-all-occurrences call.
///
/// Identity groups yield their shared locator. Fuzzy groups yield the
/// locators of the later occurrences only, so the first copy survives when it
/// is a different release. Either way every physical occurrence of a returned
/// locator disappears from the playlist, the first copy included when it
/// shares the locator.
pub fn removal_locators(tracks: &[Track], key: EquivalenceKey) -> Vec<String> {
    let mut locators = Vec::new();
    for group in find_duplicates(tracks, key) {
        match key {
            EquivalenceKey::Identity => locators.push(tracks[group.kept].uri.clone()),
            EquivalenceKey::Fuzzy => {
                locators.extend(group.extras.iter().map(|&i| tracks[i].uri.clone()))
            }
        }
    }
    unique(locators)
}

/// The playlist left behind once `strategy` has dealt with the duplicates.
pub fn remainder(tracks: &[Track], key: EquivalenceKey, strategy: DedupStrategy) -> Vec<Track> {
    match strategy {
        DedupStrategy::KeepFirst => surviving(tracks, key).into_iter().cloned().collect(),
        DedupStrategy::RemoveAll => {
            let doomed: HashSet<String> = removal_locators(tracks, key).into_iter().collect();
            tracks.iter().filter(|t| !doomed.contains(&t.uri)).cloned().collect()
        }
    }
}

/// Keys of `source` tracks that also appear in any of `references`.
pub fn find_shared(source: &[Track], references: &[Vec<Track>], key: EquivalenceKey) -> Vec<TrackKey> {
    let known = reference_keys(references, key);
    unique(
        source
            .iter()
            .map(|t| key.key_of(t))
            .filter(|k| known.contains(k))
            .collect(),
    )
}

/// Locators of the `source` tracks that also appear in any of `references`.
pub fn shared_locators(source: &[Track], references: &[Vec<Track>], key: EquivalenceKey) -> Vec<String> {
    let known = reference_keys(references, key);
    unique(
        source
            .iter()
            .filter(|t| known.contains(&key.key_of(t)))
            .map(|t| t.uri.clone())
            .collect(),
    )
}

fn reference_keys(references: &[Vec<Track>], key: EquivalenceKey) -> HashSet<TrackKey> {
    references.iter().flatten().map(|t| key.key_of(t)).collect()
}

fn unique<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}
