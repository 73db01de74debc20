pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod game;
pub mod health;
pub mod roster;
pub mod stats;
pub mod team;
pub mod validation;
