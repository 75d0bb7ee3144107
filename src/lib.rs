pub mod allocator;
pub mod auth;
pub mod config;
pub mod dates;
pub mod export;
pub mod grid;
pub mod hatim;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod participant;
pub mod persistence;
pub mod progress;
pub mod store;
pub mod validation;

pub use allocator::{BOUNDARY_PAGE, PageRange, TOTAL_PAGES, day_range, start_page_of};
pub use auth::{AuthError, AuthProvider, SessionUser};
#[cfg(feature = "sqlite")]
pub use auth::SqliteAuthProvider;
pub use config::{ConfigError, PlannerConfig};
pub use export::{ExportError, MAX_EXPORT_DAYS};
pub use grid::{ReadingGrid, reading_grid};
pub use hatim::{Hatim, HatimId, HatimPatch, NewHatim};
pub use participant::Participant;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteHatimRepository;
pub use persistence::{
    HatimRepository, LocalHatims, LocalStorage, PersistenceError, PersistenceResult,
};
pub use progress::{HatimStats, calculate_reading_progress, calculate_stats};
pub use store::{HatimStore, StoreError};
pub use validation::ValidationError;
