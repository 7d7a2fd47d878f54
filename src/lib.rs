pub mod app;
pub mod cli;
pub mod config;
pub mod favorites;
pub mod highlight;
pub mod idle;
pub mod notion;
pub mod poem;
pub mod search;
pub mod service;
pub mod storage;
pub mod store;
pub mod ui;
pub mod views;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use poem::Poem;
pub use service::PoetryService;
pub use store::{PoemStore, StoreEvent, StoreState};
