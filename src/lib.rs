pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::document::{HtmlFileDocument, InMemoryDocument};
pub use adapters::storage::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use core::{engine::RenderEngine, renderer::PetListRenderer};
pub use domain::model::{PetCollection, PetRecord, RenderOutcome, RenderedList};
pub use utils::error::{RenderError, Result};
