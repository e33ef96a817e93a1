use std::{cmp::Ordering, fmt, str::FromStr};

use log::warn;

use crate::{
    error::{Error, Result},
    model::{AudioFeatures, FeatureSet, Track},
};

/// An audio feature tracks can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Danceability,
    Energy,
    Valence,
    Tempo,
    Loudness,
    Acousticness,
    Speechiness,
    Instrumentalness,
    Liveness,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Valence,
        Feature::Tempo,
        Feature::Loudness,
        Feature::Acousticness,
        Feature::Speechiness,
        Feature::Instrumentalness,
        Feature::Liveness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Valence => "valence",
            Feature::Tempo => "tempo",
            Feature::Loudness => "loudness",
            Feature::Acousticness => "acousticness",
            Feature::Speechiness => "speechiness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
        }
    }

    pub fn value(self, features: &AudioFeatures) -> f64 {
        match self {
            Feature::Danceability => features.danceability,
            Feature::Energy => features.energy,
            Feature::Valence => features.valence,
            Feature::Tempo => features.tempo,
            Feature::Loudness => features.loudness,
            Feature::Acousticness => features.acousticness,
            Feature::Speechiness => features.speechiness,
            Feature::Instrumentalness => features.instrumentalness,
            Feature::Liveness => features.liveness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    /// Name of the first credited artist.
    Artist,
    Album,
    ReleaseDate,
    Duration,
    Popularity,
    Feature(Feature),
}

impl SortKey {
    pub fn needs_features(self) -> bool {
        matches!(self, SortKey::Feature(_))
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "title" | "name" | "track" => SortKey::Title,
            "artist" => SortKey::Artist,
            "album" => SortKey::Album,
            "release_date" | "release" | "date" => SortKey::ReleaseDate,
            "duration" => SortKey::Duration,
            "popularity" => SortKey::Popularity,
            other => Feature::ALL
                .into_iter()
                .find(|f| f.name() == other)
                .map(SortKey::Feature)
                .ok_or_else(|| format!("unknown sort key '{s}'"))?,
        };
        Ok(key)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Title => f.write_str("title"),
            SortKey::Artist => f.write_str("artist"),
            SortKey::Album => f.write_str("album"),
            SortKey::ReleaseDate => f.write_str("release_date"),
            SortKey::Duration => f.write_str("duration"),
            SortKey::Popularity => f.write_str("popularity"),
            SortKey::Feature(feature) => f.write_str(feature.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: Order,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            key: SortKey::Title,
            order: Order::Ascending,
        }
    }
}

impl SortSpec {
    pub fn new(key: SortKey, order: Order) -> Self {
        SortSpec { key, order }
    }

    /// Parses a selector, falling back to title ascending when it is not
    /// recognised. The requested order is dropped along with the bad key.
    pub fn parse(selector: &str, order: Order) -> Self {
        match selector.parse() {
            Ok(key) => SortSpec { key, order },
            Err(e) => {
                warn!("{e}, sorting by title in ascending order");
                SortSpec::default()
            }
        }
    }
}

/// A comparable value pulled out of a track. Every track sorted under one key
/// yields the same variant; mixed variants order by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SortValue<'a> {
    Text(&'a str),
    Number(u64),
    Real(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.cmp(b),
            (SortValue::Real(a), SortValue::Real(b)) => a.total_cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }

    fn kind(&self) -> u8 {
        match self {
            SortValue::Text(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Real(_) => 2,
        }
    }
}

impl SortKey {
    fn extract<'a>(self, track: &'a Track, features: Option<&FeatureSet>) -> Result<SortValue<'a>> {
        let value = match self {
            SortKey::Title => SortValue::Text(&track.title),
            SortKey::Artist => SortValue::Text(track.primary_artist()),
            SortKey::Album => SortValue::Text(&track.album.name),
            SortKey::ReleaseDate => SortValue::Text(&track.album.release_date),
            SortKey::Duration => SortValue::Number(track.duration_ms),
            SortKey::Popularity => SortValue::Number(track.popularity.into()),
            SortKey::Feature(feature) => {
                let features = features
                    .and_then(|set| set.get(&track.id))
                    .ok_or_else(|| Error::MissingFeature {
                        id: track.id.clone(),
                    })?;
                SortValue::Real(feature.value(features))
            }
        };
        Ok(value)
    }
}

/// Returns `tracks` reordered by `spec`.
///
/// The sort is stable in both directions: descending flips the comparison, so
/// tracks with equal keys keep their original relative order. Feature keys
/// need an entry in `features` for every track.
pub fn sort(tracks: &[Track], spec: &SortSpec, features: Option<&FeatureSet>) -> Result<Vec<Track>> {
    let mut keyed = tracks
        .iter()
        .map(|track| Ok((spec.key.extract(track, features)?, track)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|(a, _), (b, _)| match spec.order {
        Order::Ascending => a.compare(b),
        Order::Descending => b.compare(a),
    });
    Ok(keyed.into_iter().map(|(_, track)| track.clone()).collect())
}
