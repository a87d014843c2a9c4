pub mod engine;
pub mod renderer;
pub mod template;

pub use crate::domain::model::{PetCollection, PetRecord, RenderOutcome, RenderedList};
pub use crate::domain::ports::{ConfigProvider, Document, Pipeline, Storage};
pub use crate::utils::error::Result;
