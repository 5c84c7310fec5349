//! Utility modules shared by the Powermark crates.
//!
//! # Modules
//!
//! - [`html`]: Escaping for HTML text and attribute values
//! - [`paths`]: Path helpers (tilde expansion, output path derivation)

pub mod html;
pub mod paths;
