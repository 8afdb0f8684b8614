//! The view engine: filter → sort → page pipeline, record store, mutations
//! and the controller tying them together

pub mod controller;
pub mod filter;
pub mod mutation;
pub mod page;
pub mod sort;
pub mod state;
pub mod store;

pub use controller::{DisplayState, FetchOutcome, FetchTicket, Fetched, Fetcher, ViewController};
pub use filter::{FilterPredicate, filter};
pub use mutation::{MutationCoordinator, MutationOutcome, Reconcile};
pub use page::paginate;
pub use sort::{compare_values, sort};
pub use state::{ListState, ListView};
pub use store::{RecordStore, StorePatch};
