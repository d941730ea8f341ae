//! Page-level state for the admin screens
//!
//! Each page owns its rows, selection and outstanding-request slots. Async
//! drivers run begin, await and finish; the pure begin/finish halves are what
//! the tests exercise directly.

pub mod ecad;
pub mod listing;

pub use ecad::{filter_candidates, EcadPage, EcadTab};
pub use listing::{ListingPage, LoadRequest};
