pub mod app;
pub mod bindings;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod page;
pub mod progress;
pub mod session;
pub mod state;
pub mod transport;

pub use app::attach;
pub use config::{load_page, TrackerConfig};
pub use errors::TrackError;
pub use session::{TrackingSession, UnloadOutcome};
pub use transport::{HttpTransport, Transport};
