pub mod atomic;
pub mod backend;
pub mod cache;
pub mod encoding;
pub mod pipeline;
pub mod rebuild;
pub mod report;
pub mod scan;
pub mod settings;
