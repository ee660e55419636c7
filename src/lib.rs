pub mod audit;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod geo;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod order_id;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod scheduling;
pub mod services;
pub mod state;
