//! Layer and collection configuration documents.

pub mod collection;
pub mod layers;
