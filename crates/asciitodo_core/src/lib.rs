pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod storage;
pub mod store;
pub mod view;
