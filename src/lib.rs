pub mod aggregate;
pub mod analytics;
pub mod chart;
pub mod cli;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod query;
pub mod table;
pub mod web;
