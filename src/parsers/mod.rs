pub mod catalog;
pub mod pattern;
