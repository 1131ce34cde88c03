use thiserror::Error;

pub mod manifest;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading manifest {path}: {error}")]
    IO { path: String, error: std::io::Error },
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Manifest does not declare any dependency")]
    Empty,
}
