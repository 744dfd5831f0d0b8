//! Core business logic - framework-agnostic marketplace operations.
//! Every function takes a database connection and returns structured data;
//! nothing here knows how it is displayed.

pub mod delivery;
pub mod delivery_run;
pub mod order;
pub mod product;
pub mod report;
pub mod search;
pub mod seed;
pub mod status;
pub mod subscription;
pub mod transaction;
pub mod user;
pub mod views;
