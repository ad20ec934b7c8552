/// The dialogue engine: conversation state machine over the dialogue store.
///
/// Walks the tree of the NPC being talked to, offers the choices the
/// player's inventory unlocks, and runs the side effects of a taken choice
/// (item consumption, then the event, then the next node).

use log::{debug, error, info, warn};
use std::path::Path;

use crate::core::events::EventTable;
use crate::core::host::{ChoiceAction, PresentationHost};
use crate::core::store::{DialogueError, DialogueStore};
use crate::schema::dialogue::{END_NODE, START_NODE};

/// Where the engine is in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    InConversation { npc: String, node: String },
}

/// One engine per game session, bound to one presentation host.
pub struct DialogueEngine<H: PresentationHost> {
    store: Option<DialogueStore>,
    events: EventTable,
    host: H,
    state: ConversationState,
}

/// Builder for constructing a `DialogueEngine`.
#[derive(Debug, Default)]
pub struct DialogueEngineBuilder {
    dialogue_path: Option<String>,
    /// Directly provided store (for testing without files).
    store: Option<DialogueStore>,
    events: Option<EventTable>,
}

impl<H: PresentationHost> DialogueEngine<H> {
    /// An engine with no graph loaded and the office event table.
    pub fn new(host: H) -> Self {
        Self {
            store: None,
            events: EventTable::office(),
            host,
            state: ConversationState::Idle,
        }
    }

    /// Load the dialogue file, replacing any current graph. On failure the
    /// engine is left without a graph and the error is logged.
    pub fn load_graph(&mut self, path: &Path) {
        let loaded = DialogueStore::load(path);
        self.install(loaded, &path.display().to_string());
    }

    /// Same as [`DialogueEngine::load_graph`] for an in-memory JSON document.
    pub fn load_graph_str(&mut self, json: &str) {
        let loaded = DialogueStore::parse_json(json);
        self.install(loaded, "<inline>");
    }

    fn install(&mut self, loaded: Result<DialogueStore, DialogueError>, source: &str) {
        self.state = ConversationState::Idle;
        match loaded {
            Ok(store) => {
                info!(
                    "Dialogue loaded from {} ({} NPCs)",
                    source,
                    store.graph().npcs.len()
                );
                self.store = Some(store);
            }
            Err(e) => {
                error!("Failed to load dialogue from {}: {}", source, e);
                self.store = None;
            }
        }
    }

    pub fn has_graph(&self) -> bool {
        self.store.is_some()
    }

    /// Talk to `npc` from its `start` node.
    pub fn start_conversation(&mut self, npc: &str) {
        self.start_conversation_at(npc, START_NODE);
    }

    /// Talk to `npc` from `node`. Unknown NPCs (or no graph) are logged and
    /// leave everything untouched. A running conversation is replaced.
    pub fn start_conversation_at(&mut self, npc: &str, node: &str) {
        if let Err(e) = self.try_start_conversation_at(npc, node) {
            error!("{}", e);
        }
    }

    pub fn try_start_conversation_at(
        &mut self,
        npc: &str,
        node: &str,
    ) -> Result<(), DialogueError> {
        let store = self.store.as_ref().ok_or(DialogueError::GraphNotLoaded)?;
        if !store.contains_npc(npc) {
            return Err(DialogueError::UnknownNpc(npc.to_string()));
        }
        if let ConversationState::InConversation { npc: current, .. } = &self.state {
            debug!("Conversation with '{}' replaced by '{}'", current, npc);
        }
        self.render_node(npc, node);
        Ok(())
    }

    /// Take a displayed choice. Actions from a conversation that has since
    /// closed are ignored.
    pub fn choose(&mut self, action: &ChoiceAction) {
        let npc = match &self.state {
            ConversationState::InConversation { npc, .. } => npc.clone(),
            ConversationState::Idle => {
                warn!("Ignoring choice '{}': no conversation is active", action.label);
                return;
            }
        };
        let choice = &action.choice;

        if let Some(item) = &choice.consumes {
            if self.host.current_inventory().contains(item) {
                self.host.remove_item(item);
                self.host.refresh_inventory();
            }
        }

        if let Some(event) = &choice.event {
            self.handle_event(event);
        }

        self.render_node(&npc, &choice.next);
    }

    /// Apply a named event to the graph. Unknown names do nothing.
    pub fn handle_event(&mut self, name: &str) {
        match self.store.as_mut() {
            Some(store) => {
                self.events.apply(name, store, &mut self.host);
            }
            None => warn!("Dialogue event '{}' ignored: no graph loaded", name),
        }
    }

    fn render_node(&mut self, npc: &str, node_id: &str) {
        if node_id == END_NODE {
            self.close();
            return;
        }

        let node = match self.store.as_ref().and_then(|s| s.node(npc, node_id)) {
            Some(node) => node,
            None => {
                error!("Dialogue node '{}' not found for NPC '{}'", node_id, npc);
                self.close();
                return;
            }
        };

        self.state = ConversationState::InConversation {
            npc: npc.to_string(),
            node: node_id.to_string(),
        };

        // Gating is evaluated against the inventory as it is right now.
        let inventory = self.host.current_inventory();
        let actions: Vec<ChoiceAction> = node
            .choices
            .iter()
            .filter(|c| c.is_visible(&inventory))
            .map(ChoiceAction::new)
            .collect();

        self.host.show_message(&node.text, actions);
    }

    fn close(&mut self) {
        self.host.hide_message();
        self.state = ConversationState::Idle;
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn current_npc(&self) -> Option<&str> {
        match &self.state {
            ConversationState::InConversation { npc, .. } => Some(npc),
            ConversationState::Idle => None,
        }
    }

    pub fn current_node(&self) -> Option<&str> {
        match &self.state {
            ConversationState::InConversation { node, .. } => Some(node),
            ConversationState::Idle => None,
        }
    }

    pub fn store(&self) -> Option<&DialogueStore> {
        self.store.as_ref()
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl DialogueEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialogue_path(mut self, path: &str) -> Self {
        self.dialogue_path = Some(path.to_string());
        self
    }

    /// Provide a store directly (for testing without files).
    pub fn with_store(mut self, store: DialogueStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `events` instead of the office event table.
    pub fn with_events(mut self, events: EventTable) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the engine around `host`. A configured dialogue path must load;
    /// with neither a path nor a store the engine starts without a graph.
    pub fn build<H: PresentationHost>(
        self,
        host: H,
    ) -> Result<DialogueEngine<H>, DialogueError> {
        let store = match (self.store, self.dialogue_path) {
            (Some(store), _) => Some(store),
            (None, Some(path)) => Some(DialogueStore::load(Path::new(&path))?),
            (None, None) => None,
        };

        Ok(DialogueEngine {
            store,
            events: self.events.unwrap_or_else(EventTable::office),
            host,
            state: ConversationState::Idle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::SessionHost;
    use crate::schema::dialogue::Choice;

    const DOOR: &str = r#"{
        "door": {
            "start": {"text": "A locked door.", "choices": [
                {"text": "Unlock it.", "next": "open", "requires": "Key", "consumes": "Key"},
                {"text": "Knock.", "next": "knock"},
                {"text": "Leave.", "next": "END"}
            ]},
            "knock": {"text": "Nobody answers.", "choices": [{"text": "Try again.", "next": "start"}]},
            "open": {"text": "The door swings open.", "choices": []}
        }
    }"#;

    fn engine(items: &[&str]) -> DialogueEngine<SessionHost> {
        DialogueEngineBuilder::new()
            .with_store(DialogueStore::parse_json(DOOR).unwrap())
            .build(SessionHost::with_items(items))
            .unwrap()
    }

    fn labels(engine: &DialogueEngine<SessionHost>) -> Vec<String> {
        engine
            .host()
            .frame()
            .map(|f| f.choices.iter().map(|c| c.label.clone()).collect())
            .unwrap_or_default()
    }

    fn pick(engine: &mut DialogueEngine<SessionHost>, label: &str) {
        let action = engine
            .host()
            .frame()
            .and_then(|f| f.choices.iter().find(|c| c.label == label).cloned())
            .unwrap();
        engine.choose(&action);
    }

    #[test]
    fn start_renders_entry_node() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        assert_eq!(e.current_npc(), Some("door"));
        assert_eq!(e.current_node(), Some("start"));
        assert_eq!(e.host().frame().unwrap().text, "A locked door.");
        assert_eq!(labels(&e), ["Knock.", "Leave."]);
    }

    #[test]
    fn gated_choice_appears_with_item() {
        let mut e = engine(&["Key"]);
        e.start_conversation("door");
        assert_eq!(labels(&e), ["Unlock it.", "Knock.", "Leave."]);
    }

    #[test]
    fn gating_is_rechecked_on_every_render() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        assert_eq!(labels(&e).len(), 2);

        // already-displayed list does not change
        e.host_mut().grant_item("Key");
        assert_eq!(labels(&e).len(), 2);

        pick(&mut e, "Knock.");
        pick(&mut e, "Try again.");
        assert_eq!(labels(&e), ["Unlock it.", "Knock.", "Leave."]);
    }

    #[test]
    fn consuming_choice_removes_item_once() {
        let mut e = engine(&["Key", "Lint"]);
        e.start_conversation("door");
        let refreshes = e.host().inventory_refreshes();
        pick(&mut e, "Unlock it.");
        assert!(!e.host().inventory().contains("Key"));
        assert!(e.host().inventory().contains("Lint"));
        assert_eq!(e.host().inventory_refreshes(), refreshes + 1);
        assert_eq!(e.current_node(), Some("open"));
        assert!(labels(&e).is_empty());
    }

    #[test]
    fn consuming_choice_without_item_removes_nothing() {
        let mut e = engine(&["Lint"]);
        e.start_conversation("door");
        // a stale action for a consuming choice, taken without the item
        let action = ChoiceAction::new(&Choice::to("Unlock it.", "open").consuming("Key"));
        e.choose(&action);
        assert_eq!(e.host().inventory().items(), ["Lint"]);
        assert_eq!(e.host().inventory_refreshes(), 0);
        assert_eq!(e.current_node(), Some("open"));
    }

    #[test]
    fn end_hides_and_resets() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        pick(&mut e, "Leave.");
        assert_eq!(*e.state(), ConversationState::Idle);
        assert!(e.host().frame().is_none());
    }

    #[test]
    fn unknown_npc_changes_nothing() {
        let mut e = engine(&[]);
        e.start_conversation("ghost");
        assert_eq!(*e.state(), ConversationState::Idle);
        assert!(e.host().transcript().is_empty());
        assert!(matches!(
            e.try_start_conversation_at("ghost", START_NODE),
            Err(DialogueError::UnknownNpc(_))
        ));
    }

    #[test]
    fn unknown_npc_keeps_running_conversation() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        e.start_conversation("ghost");
        assert_eq!(e.current_npc(), Some("door"));
        assert!(e.host().frame().is_some());
    }

    #[test]
    fn unknown_node_closes_conversation() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        e.start_conversation_at("door", "attic");
        assert_eq!(*e.state(), ConversationState::Idle);
        assert!(e.host().frame().is_none());
    }

    #[test]
    fn no_graph_means_no_conversation() {
        let mut e = DialogueEngine::new(SessionHost::new());
        assert!(!e.has_graph());
        e.start_conversation("door");
        assert_eq!(*e.state(), ConversationState::Idle);
        assert!(matches!(
            e.try_start_conversation_at("door", START_NODE),
            Err(DialogueError::GraphNotLoaded)
        ));
    }

    #[test]
    fn failed_load_leaves_graph_unset() {
        let mut e = engine(&[]);
        e.load_graph_str("{ broken");
        assert!(!e.has_graph());
        e.load_graph(Path::new("does/not/exist.json"));
        assert!(!e.has_graph());
        e.load_graph_str(DOOR);
        assert!(e.has_graph());
    }

    #[test]
    fn stale_action_is_ignored() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        let knock = e.host().displayed_choice(0).unwrap();
        pick(&mut e, "Leave.");
        e.choose(&knock);
        assert_eq!(*e.state(), ConversationState::Idle);
        assert!(e.host().frame().is_none());
    }

    #[test]
    fn new_conversation_overwrites_current() {
        let mut e = engine(&[]);
        e.start_conversation("door");
        pick(&mut e, "Knock.");
        e.start_conversation("door");
        assert_eq!(e.current_node(), Some("start"));
    }

    #[test]
    fn builder_without_sources_has_no_graph() {
        let e = DialogueEngineBuilder::new().build(SessionHost::new()).unwrap();
        assert!(!e.has_graph());
        assert!(e.events().contains("give_hat"));
    }

    #[test]
    fn builder_rejects_missing_dialogue_file() {
        let result = DialogueEngineBuilder::new()
            .dialogue_path("does/not/exist.json")
            .build(SessionHost::new());
        assert!(matches!(result, Err(DialogueError::Io(_))));
    }
}
