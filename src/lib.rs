pub mod api;
pub mod charts;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod format;
pub mod screens;
pub mod storage;
pub mod theme;
pub mod types;
pub mod ui;
pub mod upload;
pub mod views;
