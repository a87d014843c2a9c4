// Adapters layer: concrete implementations for external systems (documents, storage).

pub mod document;
pub mod storage;
