use thiserror::Error;

/// Errors raised by the PAGE engine
#[derive(Error, Debug)]
pub enum PageError {
    /// Results were requested before [`crate::Page::run`] was called
    #[error("PAGE must first be run")]
    NotFit,

    /// The analysis ran but no pathway survived selection
    #[error("There are no significant pathways")]
    NoSignificantPathways,

    /// Gene-indexed arrays disagree on the size of the gene universe
    #[error("Misaligned input: {what} has length {got}, expected {expected}")]
    Alignment {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("No genes are shared between the expression profile and the ontology")]
    EmptyUniverse,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unable to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Hypergeometric distribution: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, PageError>;
