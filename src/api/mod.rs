pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
mod relay;
pub use relay::relay_stream;
mod state;
pub use state::{AppState, SharedState};
