pub mod server;
pub mod settings;
pub mod youtrack;
