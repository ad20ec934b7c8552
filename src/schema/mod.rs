pub mod dialogue;
pub mod inventory;
