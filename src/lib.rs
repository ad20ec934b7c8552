//! Office Dialogue — the conversation core of a point-and-click office game.
//!
//! NPC conversations are trees of JSON-described nodes. Choices can be gated
//! on inventory items, consume items, and fire named events that rewrite the
//! trees in place, so quest progress is the shape of the dialogue itself.
//! Two minigames and a small store feed currency and items back through the
//! same presentation host the dialogue renders through.

pub mod core;
pub mod schema;
