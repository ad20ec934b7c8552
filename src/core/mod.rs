pub mod engine;
pub mod events;
pub mod host;
pub mod minigame;
pub mod shop;
pub mod sorting;
pub mod store;
pub mod triage;
