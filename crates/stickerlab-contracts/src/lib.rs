pub mod catalog;
pub mod data_uri;
pub mod events;
pub mod models;
pub mod records;
pub mod storage;
