pub mod block;
pub mod settings;
