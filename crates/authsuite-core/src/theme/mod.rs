//! Theme settings exchange.
//!
//! The theme is fetched once at startup and replaced wholesale by the
//! server's answer to every save or reset. There is no partial update or
//! conflict detection: the last save wins.

pub mod form;
pub mod store;

pub use form::{ThemeForm, ThemeUpdate};
pub use store::ThemeStore;
