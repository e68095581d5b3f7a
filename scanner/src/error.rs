use thiserror::Error;

/// Scanner-level failures. Transport problems never show up here: the
/// market-data client absorbs them and degrades to empty results.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The code cannot be mapped to a market namespace. Only that symbol is skipped.
    #[error("unrecognized symbol format: {code:?}")]
    UnrecognizedSymbol { code: String },

    /// A fan-out task panicked or was cancelled. Fatal for the current cycle only.
    #[error("fan-out resource exhaustion: {0}")]
    ResourceExhaustion(String),
}
