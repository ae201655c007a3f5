//! Built-in TypeScript plugins.
//!
//! # Module Structure
//! - `format`: comment, casing and type spelling helpers
//! - `interface`: one interface per table or view plus select/insert/update
//!   aliases (`typescript`)
//! - `enums`: TypeScript enums read from lookup tables (`typescript-enum`)

pub mod enums;
pub mod format;
pub mod interface;

pub use enums::{EnumClassifier, EnumPlugin};
pub use interface::InterfacePlugin;
