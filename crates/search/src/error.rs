use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Cannot build matcher for '{word}': {source}")]
    InvalidWord {
        word: String,
        #[source]
        source: regex::Error,
    },
}
