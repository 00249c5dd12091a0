// Copyright (c) 2026 rezky_nightky

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset {name} has no visible pixels")]
    Empty { name: &'static str },
}
