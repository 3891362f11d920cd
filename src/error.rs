/// Crate error type.
///
/// Only setup-time failures are errors. Malformed level lines are skipped
/// with a warning and absent grid cells are floor, so neither shows up here.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::ActorId;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("could not read level {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("enemy {enemy} uses the chaser policy but has no target")]
    ChaserWithoutTarget { enemy: usize },

    #[error("enemy {enemy} targets {target:?}, which is not in this session")]
    UnknownTarget { enemy: usize, target: ActorId },

    #[error("level '{name}' is neither a file nor a built-in level")]
    LevelNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, MazeError>;
