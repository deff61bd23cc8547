#![forbid(unsafe_code)]

pub mod bookmarks;
pub mod browse;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod covers;
pub mod criteria;
pub mod error;
pub mod formats;
pub mod logging;
pub mod normalize;
pub mod pagination;
pub mod render;
pub mod session;
pub mod storage;
