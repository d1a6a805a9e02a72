//! Book records shared by every shelfsync source.
//!
//! A [`Record`] is the normalized view over three loosely-typed shapes:
//! - the commerce API's JSON payload ([`Record::from_audible_json`]),
//! - an element scraped from a tracking site's HTML page
//!   ([`Record::from_goodreads_row`], [`Record::from_storygraph_pane`],
//!   [`Record::from_storygraph_result`]),
//! - a flat row read back from the local store or the legacy JSON file
//!   ([`Record::from_fields`]).
//!
//! Whatever the shape, the accessor surface is the same, so everything
//! downstream (collections, reconciliation) only deals with [`Record`].

mod consts;
mod dates;
pub mod error;
pub mod models;
pub mod page;
mod record;
mod words;

pub use crate::dates::{format_timestamp, parse_date, parse_timestamp};
pub use crate::models::{Fields, Source, Status};
pub use crate::record::{ReadDate, Record};
pub use crate::words::{join_words, split_words};
