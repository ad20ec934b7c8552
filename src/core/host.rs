/// Presentation host boundary — what the dialogue core renders through.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::core::shop::{Shop, ShopError, ShopItem, Wallet};
use crate::schema::dialogue::{Choice, ItemName};
use crate::schema::inventory::Inventory;

/// A choice as offered to the player. Carries its own copy of the source
/// choice, so taking it never depends on list positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceAction {
    pub label: String,
    #[serde(skip)]
    pub choice: Choice,
}

impl ChoiceAction {
    pub fn new(choice: &Choice) -> Self {
        Self {
            label: choice.text.clone(),
            choice: choice.clone(),
        }
    }
}

/// The UI layer the engine reads inventory from and displays through.
pub trait PresentationHost {
    /// Show a line with its choices. An empty list means the host offers
    /// its own dismiss affordance.
    fn show_message(&mut self, text: &str, choices: Vec<ChoiceAction>);

    fn hide_message(&mut self);

    fn current_inventory(&self) -> FxHashSet<ItemName>;

    /// Add an item unless already held.
    fn grant_item(&mut self, name: &str);

    /// Remove an exact-match item if held.
    fn remove_item(&mut self, name: &str);

    /// The inventory changed outside of `grant_item`; redraw it.
    fn refresh_inventory(&mut self);

    fn add_currency(&mut self, amount: u32);

    /// Proxy card clearance changed.
    fn set_clearance(&mut self, _level: u8) {}
}

/// What the player currently sees in the dialogue box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub text: String,
    pub choices: Vec<ChoiceAction>,
}

impl Frame {
    pub fn labels(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.label.as_str()).collect()
    }
}

/// A host that keeps everything in memory: used by the terminal player,
/// the wasm bindings, demos and tests.
#[derive(Debug, Clone)]
pub struct SessionHost {
    inventory: Inventory,
    wallet: Wallet,
    clearance: u8,
    frame: Option<Frame>,
    transcript: Vec<String>,
    inventory_refreshes: usize,
}

impl Default for SessionHost {
    fn default() -> Self {
        Self {
            inventory: Inventory::new(),
            wallet: Wallet::default(),
            clearance: 1,
            frame: None,
            transcript: Vec::new(),
            inventory_refreshes: 0,
        }
    }
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: &[&str]) -> Self {
        let mut host = Self::new();
        for item in items {
            host.inventory.add(item);
        }
        host
    }

    /// The dialogue box contents, or `None` while hidden.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Look up the `n`th displayed choice (0-based).
    pub fn displayed_choice(&self, n: usize) -> Option<ChoiceAction> {
        self.frame.as_ref()?.choices.get(n).cloned()
    }

    /// Close the box the way a player's dismiss click would.
    pub fn dismiss(&mut self) {
        self.frame = None;
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn clearance(&self) -> u8 {
        self.clearance
    }

    /// Every line shown so far, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn inventory_refreshes(&self) -> usize {
        self.inventory_refreshes
    }

    /// Buy an item from `shop` with the session's wallet.
    pub fn buy(&mut self, shop: &Shop, name: &str) -> Result<ShopItem, ShopError> {
        let item = shop.purchase(name, &mut self.wallet, &self.inventory)?.clone();
        self.grant_item(&item.name);
        Ok(item)
    }
}

impl PresentationHost for SessionHost {
    fn show_message(&mut self, text: &str, choices: Vec<ChoiceAction>) {
        self.transcript.push(text.to_string());
        self.frame = Some(Frame {
            text: text.to_string(),
            choices,
        });
    }

    fn hide_message(&mut self) {
        self.frame = None;
    }

    fn current_inventory(&self) -> FxHashSet<ItemName> {
        self.inventory.snapshot()
    }

    fn grant_item(&mut self, name: &str) {
        if self.inventory.add(name) {
            self.refresh_inventory();
        }
    }

    fn remove_item(&mut self, name: &str) {
        self.inventory.remove(name);
    }

    fn refresh_inventory(&mut self) {
        self.inventory_refreshes += 1;
    }

    fn add_currency(&mut self, amount: u32) {
        self.wallet.credit(amount);
    }

    fn set_clearance(&mut self, level: u8) {
        self.clearance = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dialogue::END_NODE;

    #[test]
    fn new_session_starts_at_clearance_one() {
        let host = SessionHost::new();
        assert_eq!(host.clearance(), 1);
        assert!(host.frame().is_none());
        assert!(host.inventory().is_empty());
    }

    #[test]
    fn show_and_hide() {
        let mut host = SessionHost::new();
        host.show_message("Hello", vec![ChoiceAction::new(&Choice::to("Hi", END_NODE))]);
        assert_eq!(host.frame().unwrap().labels(), vec!["Hi"]);
        assert_eq!(host.displayed_choice(0).unwrap().choice.next, END_NODE);
        assert!(host.displayed_choice(1).is_none());
        host.hide_message();
        assert!(host.frame().is_none());
        assert_eq!(host.transcript(), ["Hello"]);
    }

    #[test]
    fn grant_is_idempotent_and_refreshes_once() {
        let mut host = SessionHost::new();
        host.grant_item("Party Hat");
        host.grant_item("Party Hat");
        assert_eq!(host.inventory().len(), 1);
        assert_eq!(host.inventory_refreshes(), 1);
    }

    #[test]
    fn currency_and_clearance() {
        let mut host = SessionHost::new();
        host.add_currency(30);
        host.add_currency(12);
        host.set_clearance(2);
        assert_eq!(host.wallet().balance(), 42);
        assert_eq!(host.clearance(), 2);
    }

    #[test]
    fn choice_action_label_is_choice_text() {
        let choice = Choice::to("Take the hat.", "already_has_hat");
        let action = ChoiceAction::new(&choice);
        assert_eq!(action.label, "Take the hat.");
        assert_eq!(action.choice, choice);
    }

    #[test]
    fn frame_serializes_labels_only() {
        let frame = Frame {
            text: "Hi".to_string(),
            choices: vec![ChoiceAction::new(&Choice::to("Bye", END_NODE))],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"text":"Hi","choices":[{"label":"Bye"}]}"#);
    }
}
