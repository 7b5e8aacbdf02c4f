use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Benchmark \"{name}\" failed: no successful iterations")]
    NoSuccessfulIterations { name: String },

    #[error("Invalid benchmark configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Unknown suite '{name}'. Supported: hashing, sources, all")]
    UnknownSuite { name: String },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },
}
