//! Domain models for the trait mapper.
//!
//! # Core Concepts
//!
//! ## Catalogs
//!
//! These are fixed at build time and never persisted:
//!
//! - [`Trait`]: One of the sixteen personality dimensions. Only its stable
//!   `id` ever reaches a project file.
//! - [`PersonalityQuestion`]: A questionnaire item feeding one trait.
//! - [`ColorItem`]: A named swatch offered when editing a character.
//!
//! ## Persisted Entities
//!
//! - [`Project`]: Aggregate root holding characters and per-trait notes.
//! - [`Character`]: A bubble placed on every trait line, grouped by
//!   [`BubbleSize`] and ordered within its group by `display_order`.

mod character;
mod palette;
mod project;
mod question;
mod traits;

pub use character::*;
pub use palette::*;
pub use project::*;
pub use question::*;
pub use traits::*;
