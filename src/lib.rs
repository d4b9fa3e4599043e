//! mmview
//!
//! Renders a chronological chat transcript from a directory-per-message
//! storage tree, then keeps appending messages as new files appear.
//!
//! Pure pieces (identity resolution, dedup, formatting) live in [`engine`];
//! filesystem discovery lives in [`source`]; [`config`] and [`logging`] are
//! the startup shell around them.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod source;
