/// Event mutation table — named side effects that rewrite the dialogue graph.
///
/// Quest progress lives in the graph itself: an event grants items and
/// rewires nodes, and the next traversal of that NPC sees the new wiring.

use log::{debug, info, warn};
use std::collections::HashMap;

use crate::core::host::PresentationHost;
use crate::core::store::{DialogueError, DialogueStore};
use crate::schema::dialogue::{Choice, DialogueNode, END_NODE, START_NODE};

/// A mutation procedure bound to an event name.
pub type EventHandler = fn(&mut DialogueStore, &mut dyn PresentationHost);

pub const PARTY_HAT: &str = "Party Hat";
pub const POST_IT_NOTES: &str = "Post-it Notes";
pub const SMALL_KEY: &str = "Small Key";

/// Maps event names to handlers. Names with no handler are ignored.
#[derive(Clone, Default)]
pub struct EventTable {
    handlers: HashMap<String, EventHandler>,
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("EventTable").field("events", &names).finish()
    }
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The events wired into the office dialogue.
    pub fn office() -> Self {
        let mut table = Self::new();
        table.register("used_notes_on_carl", used_notes_on_carl);
        table.register("give_hat", give_hat);
        table.register("give_notes", give_notes);
        table.register("give_key", give_key);
        table.register("qa_complete", qa_complete);
        table
    }

    /// Bind `name` to `handler`, replacing any previous binding.
    pub fn register(&mut self, name: &str, handler: EventHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }

    /// Run the handler for `name`. Returns false if no handler exists.
    pub fn apply(
        &self,
        name: &str,
        store: &mut DialogueStore,
        host: &mut dyn PresentationHost,
    ) -> bool {
        match self.handlers.get(name) {
            Some(handler) => {
                info!("Dialogue event triggered: {}", name);
                handler(store, host);
                true
            }
            None => {
                debug!("No handler for dialogue event '{}'", name);
                false
            }
        }
    }
}

/// Log a rewrite the current graph cannot take and carry on.
fn skip_on_error(event: &str, result: Result<(), DialogueError>) {
    if let Err(e) = result {
        warn!("Event '{}' skipped a rewrite: {}", event, e);
    }
}

fn used_notes_on_carl(store: &mut DialogueStore, _host: &mut dyn PresentationHost) {
    skip_on_error(
        "used_notes_on_carl",
        store.copy_node("carlbot", "shut_down", START_NODE),
    );
}

fn give_hat(store: &mut DialogueStore, host: &mut dyn PresentationHost) {
    host.grant_item(PARTY_HAT);
    skip_on_error(
        "give_hat",
        store.replace_choices(
            "hr_bot",
            START_NODE,
            vec![Choice::to("Take the hat.", "already_has_hat")],
        ),
    );
}

fn give_notes(store: &mut DialogueStore, host: &mut dyn PresentationHost) {
    host.grant_item(POST_IT_NOTES);
    skip_on_error(
        "give_notes",
        store.replace_choices(
            "gary",
            START_NODE,
            vec![Choice::to(
                "Have you put the note on Carl yet?",
                "waiting_for_car",
            )],
        ),
    );
}

fn give_key(store: &mut DialogueStore, host: &mut dyn PresentationHost) {
    host.grant_item(SMALL_KEY);
    skip_on_error(
        "give_key",
        store.replace_choices(
            "gary",
            "thanks_for_note",
            vec![Choice::to(
                "What about those Proxybots you needed to QA?",
                "qa_proxybot",
            )],
        ),
    );
}

fn qa_complete(store: &mut DialogueStore, _host: &mut dyn PresentationHost) {
    skip_on_error(
        "qa_complete",
        store.replace_node(
            "proxybot_qa",
            START_NODE,
            DialogueNode::new(
                "The bot hums quietly, its screen displaying a green checkmark.",
                vec![Choice::to("Leave it alone.", END_NODE)],
            ),
        ),
    );

    // Gary only hears about it if he is still waiting on the QA or the note.
    let gary_waiting = matches!(
        store.first_next("gary", START_NODE),
        Some("qa_proxybot") | Some("waiting_for_car")
    );
    if gary_waiting {
        skip_on_error(
            "qa_complete",
            store.replace_node(
                "gary",
                START_NODE,
                DialogueNode::new(
                    "Gary is staring blankly at his monitor. 'Thanks for testing the bot. I might actually get to go home today.'",
                    vec![Choice::to("No problem.", END_NODE)],
                ),
            ),
        );
    }
}
