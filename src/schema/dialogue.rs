/// Dialogue graph schema — NPC trees of nodes and the choices between them.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NpcId = String;
pub type NodeId = String;
pub type ItemName = String;
pub type EventName = String;

/// Entry node for a fresh conversation.
pub const START_NODE: &str = "start";
/// Reserved `next` target that closes the dialogue. Never stored as a node.
pub const END_NODE: &str = "END";

/// One option offered to the player under a dialogue line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next: NodeId,
    /// Only offered while the player holds this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<ItemName>,
    /// Removed from the inventory (if held) when the choice is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<ItemName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventName>,
}

impl Choice {
    /// A plain choice with no gating, consumption or event.
    pub fn to(text: &str, next: &str) -> Self {
        Self {
            text: text.to_string(),
            next: next.to_string(),
            requires: None,
            consumes: None,
            event: None,
        }
    }

    pub fn requiring(mut self, item: &str) -> Self {
        self.requires = Some(item.to_string());
        self
    }

    pub fn consuming(mut self, item: &str) -> Self {
        self.consumes = Some(item.to_string());
        self
    }

    pub fn firing(mut self, event: &str) -> Self {
        self.event = Some(event.to_string());
        self
    }

    /// Whether this choice is offered given the player's current items.
    pub fn is_visible(&self, inventory: &FxHashSet<ItemName>) -> bool {
        match &self.requires {
            Some(item) => inventory.contains(item),
            None => true,
        }
    }

    pub fn ends_dialogue(&self) -> bool {
        self.next == END_NODE
    }
}

/// A line of dialogue and the choices that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl DialogueNode {
    pub fn new(text: &str, choices: Vec<Choice>) -> Self {
        Self {
            text: text.to_string(),
            choices,
        }
    }
}

/// All nodes belonging to one NPC, keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcTree {
    pub nodes: HashMap<NodeId, DialogueNode>,
}

impl NpcTree {
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut DialogueNode> {
        self.nodes.get_mut(id)
    }

    /// True if `next` may be followed from inside this tree.
    pub fn resolves(&self, next: &str) -> bool {
        next == END_NODE || self.nodes.contains_key(next)
    }
}

/// A `next` value that points at a node missing from its NPC's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub npc: NpcId,
    pub node: NodeId,
    pub choice_index: usize,
    pub next: NodeId,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} choice {} points at missing node '{}'",
            self.npc, self.node, self.choice_index, self.next
        )
    }
}

/// Every NPC's conversation tree, keyed by NPC id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueGraph {
    pub npcs: HashMap<NpcId, NpcTree>,
}

impl DialogueGraph {
    pub fn tree(&self, npc: &str) -> Option<&NpcTree> {
        self.npcs.get(npc)
    }

    pub fn tree_mut(&mut self, npc: &str) -> Option<&mut NpcTree> {
        self.npcs.get_mut(npc)
    }

    pub fn node(&self, npc: &str, node: &str) -> Option<&DialogueNode> {
        self.tree(npc)?.node(node)
    }

    pub fn contains_npc(&self, npc: &str) -> bool {
        self.npcs.contains_key(npc)
    }

    /// Collect every choice whose `next` does not resolve within its tree.
    /// Sorted by NPC, node and choice position so reports are stable.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for (npc, tree) in &self.npcs {
            for (node_id, node) in &tree.nodes {
                for (i, choice) in node.choices.iter().enumerate() {
                    if !tree.resolves(&choice.next) {
                        dangling.push(DanglingReference {
                            npc: npc.clone(),
                            node: node_id.clone(),
                            choice_index: i,
                            next: choice.next.clone(),
                        });
                    }
                }
            }
        }
        dangling.sort_by(|a, b| {
            (&a.npc, &a.node, a.choice_index).cmp(&(&b.npc, &b.node, b.choice_index))
        });
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(items: &[&str]) -> FxHashSet<ItemName> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn choice_without_requirement_is_visible() {
        let choice = Choice::to("Hi", END_NODE);
        assert!(choice.is_visible(&inventory(&[])));
    }

    #[test]
    fn choice_visibility_follows_inventory() {
        let choice = Choice::to("Unlock", "open").requiring("Key");
        assert!(!choice.is_visible(&inventory(&[])));
        assert!(!choice.is_visible(&inventory(&["Keychain"])));
        assert!(choice.is_visible(&inventory(&["Key"])));
    }

    #[test]
    fn choice_deserializes_optional_fields() {
        let json = r#"{"text": "Use it", "next": "END", "consumes": "Battery", "event": "zap"}"#;
        let choice: Choice = serde_json::from_str(json).unwrap();
        assert_eq!(choice.requires, None);
        assert_eq!(choice.consumes.as_deref(), Some("Battery"));
        assert_eq!(choice.event.as_deref(), Some("zap"));
        assert!(choice.ends_dialogue());
    }

    #[test]
    fn choice_serialization_omits_absent_fields() {
        let json = serde_json::to_string(&Choice::to("Bye", END_NODE)).unwrap();
        assert_eq!(json, r#"{"text":"Bye","next":"END"}"#);
    }

    #[test]
    fn node_without_choices_defaults_to_empty() {
        let node: DialogueNode = serde_json::from_str(r#"{"text": "..."}"#).unwrap();
        assert!(node.choices.is_empty());
    }

    #[test]
    fn graph_is_plain_nested_mapping() {
        let json = r#"{"a": {"start": {"text": "Hello", "choices": [{"text": "Hi", "next": "END"}]}}}"#;
        let graph: DialogueGraph = serde_json::from_str(json).unwrap();
        assert!(graph.contains_npc("a"));
        assert_eq!(graph.node("a", "start").unwrap().text, "Hello");
        assert!(graph.node("a", "missing").is_none());
        assert!(graph.node("b", "start").is_none());
    }

    #[test]
    fn dangling_references_are_reported_in_order() {
        let mut tree = NpcTree::default();
        tree.nodes.insert(
            "start".to_string(),
            DialogueNode::new(
                "Hello",
                vec![
                    Choice::to("Ok", "middle"),
                    Choice::to("Lost", "nowhere"),
                    Choice::to("Bye", END_NODE),
                    Choice::to("Also lost", "elsewhere"),
                ],
            ),
        );
        tree.nodes
            .insert("middle".to_string(), DialogueNode::new("...", vec![]));
        let mut graph = DialogueGraph::default();
        graph.npcs.insert("npc".to_string(), tree);

        let dangling = graph.dangling_references();
        assert_eq!(dangling.len(), 2);
        assert_eq!(dangling[0].choice_index, 1);
        assert_eq!(dangling[0].next, "nowhere");
        assert_eq!(dangling[1].choice_index, 3);
        assert_eq!(
            dangling[0].to_string(),
            "npc.start choice 1 points at missing node 'nowhere'"
        );
    }

    #[test]
    fn next_resolution_is_per_tree() {
        let mut a = NpcTree::default();
        a.nodes
            .insert("only_in_a".to_string(), DialogueNode::new("", vec![]));
        let b = NpcTree::default();
        assert!(a.resolves("only_in_a"));
        assert!(!b.resolves("only_in_a"));
        assert!(b.resolves(END_NODE));
    }
}
