//! The generation artifact: an ordered list of specimens.

pub mod model;
pub mod store;

#[cfg(test)]
#[path = "../../tests/unit/specimen/model.rs"]
mod tests;
