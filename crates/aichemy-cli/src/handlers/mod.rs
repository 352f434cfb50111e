pub mod activity;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod project;
pub mod status;
pub mod workflow;
