pub mod aliases;
pub mod clean;
pub mod config;
pub mod error;
pub mod import;
pub mod io;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod store;

pub use error::{IngestError, Result};
