mod actions;
mod config;
mod credentials;
mod layer;
mod metadata;
mod state;

pub use actions::*;
pub use config::*;
pub use credentials::*;
pub use layer::*;
pub use metadata::*;
pub use state::*;
