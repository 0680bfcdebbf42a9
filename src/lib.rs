pub mod app;
pub mod bulk;
pub mod catalog;
pub mod columns;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod outcome;
pub mod output;
pub mod report;
pub mod set_file;
pub mod staging;
