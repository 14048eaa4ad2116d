//! Database access layer for muziki-mk
//!
//! Thin query modules per entity. Functions that take part in the
//! purchase transaction accept any executor so they run against either
//! the pool or an open transaction.

pub mod artists;
pub mod payments;
pub mod songs;
pub mod streams;
pub mod users;
