//! Pure building blocks of the revocation status list: the compressed bitstring,
//! the URL scheme that locates a bit, and the status-list credential document.
//!
//! Allocation, persistence and signing of lists happen in the engine; nothing here
//! holds state.

pub mod bitstring;
pub mod locator;
pub mod model;
pub mod status_list;
