pub mod chat;
pub mod embeddings;
pub mod health;
pub mod images;
pub mod models;
pub mod proxy;
