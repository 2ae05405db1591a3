use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole run.
///
/// Everything local to one file, batch or result is absorbed by the engine and
/// reported through counters instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(
        "OPENAI_API_KEY is required for translation updates.\n\
         Hint: set it with: export OPENAI_API_KEY=\"your-api-key\""
    )]
    MissingApiKey,

    #[error(
        "Locales directory '{}' does not exist.\n\
         Hint: Check the 'localesDir' setting or pass --locales-dir.",
        .0.display()
    )]
    LocalesDirMissing(PathBuf),

    #[error("'{}' is not a directory.", .0.display())]
    LocalesDirNotADirectory(PathBuf),

    #[error("Failed to read locales directory '{}': {source}", path.display())]
    LocalesDirUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
