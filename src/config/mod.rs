//! Runtime settings read from the environment (after `.env`, when present).

mod settings;

pub use settings::{Settings, StoreBackend};
