use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A page or feature lookup failed; nothing was sorted or mutated.
    #[error("Failed to fetch from Spotify: {0}")]
    TransientFetch(String),

    #[error("No audio features available for track '{id}'")]
    MissingFeature { id: String },

    /// Chunk `chunk` (zero-based) failed. Earlier chunks remain applied.
    #[error("Batch {chunk} failed")]
    Mutation {
        chunk: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Playlist '{0}' not found")]
    NotFound(String),

    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn mutation(chunk: usize, source: Error) -> Self {
        Error::Mutation {
            chunk,
            source: Box::new(source),
        }
    }
}
