// Core modules: error modeling and JSON shape aliases.
pub mod error;
pub mod json;
