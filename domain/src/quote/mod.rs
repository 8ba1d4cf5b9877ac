//! Quote domain.
//!
//! - [`entities::Quote`] — a stored quote with its vote counter and voter set
//! - [`value_objects`] — identifiers and the validated creation draft
//! - [`view::QuoteView`] — the externally visible, per-viewer projection
//! - [`ranking`] — ordering and filtering of views

pub mod entities;
pub mod ranking;
pub mod sort;
pub mod value_objects;
pub mod view;
