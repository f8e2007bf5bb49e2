pub mod contacts;
pub mod genetic;
pub mod orientation;
pub mod prune;
pub mod tour;
