//! Collections of book records, kept in sync with the services they come
//! from.
//!
//! - [`load`] returns a source's [`Collection`], from the local cache while
//!   it's fresh and from the remote otherwise.
//! - [`reconcile`] carries finish dates from one collection over to a
//!   tracking service, one confirmed write at a time.

mod collection;
pub mod error;
mod freshness;
pub mod load;
pub mod reconcile;
pub mod remote;
#[cfg(test)]
mod testing;

pub use crate::collection::{Collection, PersistReport};
pub use crate::freshness::{is_fresh, max_age};
pub use crate::load::{LoadOptions, load};
pub use crate::reconcile::{Candidate, Decider, Decision, Outcome, Report, Target, reconcile};
