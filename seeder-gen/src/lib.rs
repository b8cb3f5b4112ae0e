//! Rendering of Laravel seeder sources.
//!
//! This crate knows nothing about databases or the filesystem layout of the
//! project being seeded. It turns attribute values into PHP literals
//! ([`Value`]) and fills the seeder templates ([`template::Templates`]) with
//! them, returning plain strings for the caller to write.
use std::path::PathBuf;

mod seeder;
pub mod template;
pub mod value;

pub use seeder::{
    pivot_seeder_name, render_aggregator, render_pivot_row, render_record, render_seeder,
    PivotLinkage, SeederFile, PIVOT_IMPORT,
};
pub use value::{quote, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("template {name} not found")]
    TemplateNotFound { name: String },
    #[error("cannot read template override {}", path.display())]
    TemplateOverride {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Tera(#[from] tera::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
