//! ECS resources made available to systems.
//!
//! Overview
//! - `animationconfig` – settings loaded from `config.ini`
//! - `animationtable` – dense per-instance storage with chunked capacity
//! - `clipstore` – frame clip assets and their registry
//! - `frameanimations` – the scheduler: instance API and per-frame tick
//! - `instanceindex` – instance id to row mapping
//! - `worldtime` – simulation time and deltas
pub mod animationconfig;
pub mod animationtable;
pub mod clipstore;
pub mod frameanimations;
pub mod instanceindex;
pub mod worldtime;
