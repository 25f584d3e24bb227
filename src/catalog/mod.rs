//! List view: fetching, state machine, projection and the session tying them together

pub mod fetcher;
pub mod projection;
pub mod session;
pub mod state;

pub use fetcher::CatalogFetcher;
pub use projection::{visible_list, VisibleEntry};
pub use session::{CatalogSession, DispatchOutcome};
pub use state::{Completion, FetchTicket, MergeMode, Transition, ViewEvent, ViewState};
