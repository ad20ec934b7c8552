//! WASM bindings for office-dialogue — drives the browser build of the game.
//!
//! Everything crosses the boundary as JSON strings: frames, inventory,
//! catalog entries and minigame results.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use wasm_bindgen::prelude::*;

use office_dialogue::core::engine::{DialogueEngine, DialogueEngineBuilder};
use office_dialogue::core::host::SessionHost;
use office_dialogue::core::minigame::{settle, MinigameOutcome};
use office_dialogue::core::shop::Shop;
use office_dialogue::core::sorting::{DataSort, SortConfig, SortDrop};
use office_dialogue::core::store::DialogueStore;
use office_dialogue::core::triage::{EmailTriage, Folder, TriageConfig, TriageResult};
use office_dialogue::schema::dialogue::START_NODE;

// ---------------------------------------------------------------------------
// Embedded game data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const DIALOGUE: &str = include_str!("../../data/dialogue.json");
    pub const SHOP: &str = include_str!("../../data/shop.ron");
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// OfficeGame — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct OfficeGame {
    engine: DialogueEngine<SessionHost>,
    shop: Shop,
    sort: DataSort,
    triage: EmailTriage,
    rng: StdRng,
    seed: u64,
}

#[wasm_bindgen]
impl OfficeGame {
    /// A fresh session over the shipped dialogue and store.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<OfficeGame, JsError> {
        OfficeGame::with_dialogue(data::DIALOGUE, seed)
    }

    /// A fresh session over a caller-supplied dialogue document.
    pub fn with_dialogue(dialogue_json: &str, seed: u64) -> Result<OfficeGame, JsError> {
        let store = DialogueStore::parse_json(dialogue_json)
            .map_err(|e| JsError::new(&format!("Dialogue parse error: {e}")))?;
        let engine = DialogueEngineBuilder::new()
            .with_store(store)
            .build(SessionHost::new())
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        let shop = Shop::parse_ron(data::SHOP)
            .map_err(|e| JsError::new(&format!("Store parse error: {e}")))?;
        let sort = DataSort::new(SortConfig::default())
            .map_err(|e| JsError::new(&format!("Minigame error: {e}")))?;
        let triage = EmailTriage::new(TriageConfig::default())
            .map_err(|e| JsError::new(&format!("Minigame error: {e}")))?;

        Ok(OfficeGame {
            engine,
            shop,
            sort,
            triage,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    /// Open a conversation with `npc`. Returns the frame JSON. Unknown NPCs
    /// are logged and leave the current frame as it was.
    pub fn talk(&mut self, npc: &str) -> Result<String, JsError> {
        self.engine.start_conversation(npc);
        self.frame()
    }

    /// Like `talk`, but an unknown NPC or missing dialogue is thrown.
    pub fn talk_strict(&mut self, npc: &str) -> Result<String, JsError> {
        self.engine
            .try_start_conversation_at(npc, START_NODE)
            .map_err(|e| JsError::new(&format!("{e}")))?;
        self.frame()
    }

    /// Take the `index`th displayed choice (0-based). Returns the new frame
    /// JSON, or `null` once the dialogue closes.
    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        let action = self
            .engine
            .host()
            .displayed_choice(index)
            .ok_or_else(|| JsError::new(&format!("No choice {index} on screen")))?;
        self.engine.host_mut().dismiss();
        self.engine.choose(&action);
        self.frame()
    }

    /// Close the dialogue box without choosing.
    pub fn dismiss(&mut self) {
        self.engine.host_mut().dismiss();
    }

    /// Current dialogue box as JSON: `{"text": ..., "choices": [{"label": ...}]}`
    /// or `null` while hidden.
    pub fn frame(&self) -> Result<String, JsError> {
        to_json(&self.engine.host().frame())
    }

    /// JSON array of NPC ids, sorted.
    pub fn npcs(&self) -> Result<String, JsError> {
        let mut npcs: Vec<&String> = match self.engine.store() {
            Some(store) => store.graph().npcs.keys().collect(),
            None => Vec::new(),
        };
        npcs.sort();
        to_json(&npcs)
    }

    /// JSON array of held item names in acquisition order.
    pub fn inventory(&self) -> Result<String, JsError> {
        to_json(self.engine.host().inventory().items())
    }

    pub fn balance(&self) -> u32 {
        self.engine.host().wallet().balance()
    }

    pub fn clearance(&self) -> u8 {
        self.engine.host().clearance()
    }

    /// JSON array of catalog entries.
    pub fn catalog(&self) -> Result<String, JsError> {
        to_json(&self.shop.items)
    }

    /// Buy `name`. Returns the purchased entry as JSON.
    pub fn buy(&mut self, name: &str) -> Result<String, JsError> {
        let item = self
            .engine
            .host_mut()
            .buy(&self.shop, name)
            .map_err(|e| JsError::new(&format!("{e}")))?;
        to_json(&item)
    }

    /// Start a data-sort round. Returns the block cluster as JSON.
    pub fn sort_start(&mut self) -> Result<String, JsError> {
        let blocks = self.sort.start(&mut self.rng);
        to_json(blocks)
    }

    /// Drop block `id` on `bin`. A completed round is settled before the
    /// result is returned.
    pub fn sort_drop(&mut self, id: u32, bin: &str) -> Result<String, JsError> {
        let result = self.sort.drop_block(id, bin);
        if let SortDrop::Completed(outcome) = &result {
            settle(outcome, self.engine.host_mut());
        }
        to_json(&result)
    }

    pub fn sort_log_off(&mut self) -> Result<String, JsError> {
        let outcome = self.sort.log_off();
        self.settle_json(&outcome)
    }

    /// Start an email-triage round. Returns the inbox as JSON.
    pub fn triage_start(&mut self) -> Result<String, JsError> {
        self.seed = self.seed.wrapping_add(1);
        to_json(self.triage.start(self.seed))
    }

    /// File email `id` into `folder` ("urgent", "spam" or "archive").
    pub fn triage_classify(&mut self, id: u32, folder: &str) -> Result<String, JsError> {
        let folder = Folder::parse(folder)
            .ok_or_else(|| JsError::new(&format!("Unknown folder: {folder}")))?;
        let result = self.triage.classify(id, folder);
        if let TriageResult::Completed(outcome) = &result {
            settle(outcome, self.engine.host_mut());
        }
        to_json(&result)
    }

    /// Advance the triage clock by `millis`. Returns the failure outcome
    /// JSON if time ran out, otherwise `null`.
    pub fn triage_tick(&mut self, millis: u32) -> Result<String, JsError> {
        match self.triage.tick(Duration::from_millis(u64::from(millis))) {
            Some(outcome) => self.settle_json(&outcome),
            None => Ok("null".to_string()),
        }
    }

    /// Current triage inbox as JSON.
    pub fn triage_inbox(&self) -> Result<String, JsError> {
        to_json(self.triage.inbox())
    }

    pub fn triage_remaining_ms(&self) -> u32 {
        u32::try_from(self.triage.remaining().as_millis()).unwrap_or(u32::MAX)
    }
}

// Private helpers
impl OfficeGame {
    fn settle_json(&mut self, outcome: &MinigameOutcome) -> Result<String, JsError> {
        settle(outcome, self.engine.host_mut());
        to_json(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> OfficeGame {
        OfficeGame::new(1).ok().expect("shipped data loads")
    }

    #[test]
    fn talk_to_unknown_npc_shows_nothing() {
        let mut game = game();
        assert_eq!(game.talk("ghost").ok().as_deref(), Some("null"));
    }

    #[test]
    fn talk_to_unknown_npc_keeps_running_frame() {
        let mut game = game();
        let gary = game.talk("gary").ok().unwrap_or_default();
        assert!(gary.contains("What's wrong, Gary?"));
        assert_eq!(game.talk("ghost").ok(), Some(gary));
    }
}
