//! # Seeder Generation Errors
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// No `database` folder was found above the model directory.
    #[error("oops, output path not found at {}", .0.display())]
    OutputPathNotFound(PathBuf),

    /// A file in a models folder that does not declare a class.
    #[error("{} is not a valid model", .0.display())]
    InvalidModel(PathBuf),

    #[error("no configuration file found in {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("cannot parse `{1}`: {0}")]
    YAMLFile(#[source] serde_yaml::Error, String),

    #[error(transparent)]
    Tera(#[from] tera::Error),

    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error(transparent)]
    DB(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Gen(#[from] seeder_gen::Error),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}
