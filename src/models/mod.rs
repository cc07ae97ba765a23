mod auth;
mod deployment;
mod devices;
mod templates;

pub use auth::*;
pub use deployment::*;
pub use devices::*;
pub use templates::*;
