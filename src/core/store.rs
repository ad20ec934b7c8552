/// Dialogue store — loading, validation and in-place mutation of the graph.

use std::path::Path;
use thiserror::Error;

use crate::schema::dialogue::{
    Choice, DanglingReference, DialogueGraph, DialogueNode, NpcTree,
};

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no dialogue graph is loaded")]
    GraphNotLoaded,
    #[error("dialogue not found for NPC: {0}")]
    UnknownNpc(String),
    #[error("dialogue node '{node}' not found for NPC '{npc}'")]
    UnknownNode { npc: String, node: String },
    #[error("dangling reference: {0}")]
    DanglingReference(DanglingReference),
}

/// Owns the loaded dialogue graph. Node contents change over a run;
/// the set of NPCs does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueStore {
    graph: DialogueGraph,
}

impl DialogueStore {
    /// Wrap an already-built graph, rejecting it if any `next` dangles.
    pub fn new(graph: DialogueGraph) -> Result<Self, DialogueError> {
        if let Some(first) = graph.dangling_references().into_iter().next() {
            return Err(DialogueError::DanglingReference(first));
        }
        Ok(Self { graph })
    }

    /// Load a dialogue file. `.ron` files are read as RON, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, DialogueError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("ron") => Self::load_from_ron(path),
            _ => Self::load_from_json(path),
        }
    }

    pub fn load_from_json(path: &Path) -> Result<Self, DialogueError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_json(&contents)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, DialogueError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_json(input: &str) -> Result<Self, DialogueError> {
        let graph: DialogueGraph = serde_json::from_str(input)?;
        Self::new(graph)
    }

    pub fn parse_ron(input: &str) -> Result<Self, DialogueError> {
        let graph: DialogueGraph = ron::from_str(input)?;
        Self::new(graph)
    }

    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    pub fn contains_npc(&self, npc: &str) -> bool {
        self.graph.contains_npc(npc)
    }

    pub fn node(&self, npc: &str, node: &str) -> Option<&DialogueNode> {
        self.graph.node(npc, node)
    }

    /// The `next` of a node's first choice, if it has any choices.
    pub fn first_next(&self, npc: &str, node: &str) -> Option<&str> {
        self.node(npc, node)?
            .choices
            .first()
            .map(|c| c.next.as_str())
    }

    /// Replace a node wholesale. The node must already exist and every
    /// `next` in the replacement must resolve within the NPC's tree.
    pub fn replace_node(
        &mut self,
        npc: &str,
        node: &str,
        replacement: DialogueNode,
    ) -> Result<(), DialogueError> {
        let tree = self.tree_mut(npc)?;
        check_choices(npc, node, tree, &replacement.choices)?;
        let slot = node_slot(npc, node, tree)?;
        *slot = replacement;
        Ok(())
    }

    pub fn replace_choices(
        &mut self,
        npc: &str,
        node: &str,
        choices: Vec<Choice>,
    ) -> Result<(), DialogueError> {
        let tree = self.tree_mut(npc)?;
        check_choices(npc, node, tree, &choices)?;
        node_slot(npc, node, tree)?.choices = choices;
        Ok(())
    }

    pub fn set_text(&mut self, npc: &str, node: &str, text: &str) -> Result<(), DialogueError> {
        let tree = self.tree_mut(npc)?;
        node_slot(npc, node, tree)?.text = text.to_string();
        Ok(())
    }

    /// Overwrite `to` with a copy of `from`. Both nodes belong to `npc`.
    pub fn copy_node(&mut self, npc: &str, from: &str, to: &str) -> Result<(), DialogueError> {
        let source = self
            .node(npc, from)
            .cloned()
            .ok_or_else(|| unknown_node(npc, from))?;
        self.replace_node(npc, to, source)
    }

    fn tree_mut(&mut self, npc: &str) -> Result<&mut NpcTree, DialogueError> {
        self.graph
            .tree_mut(npc)
            .ok_or_else(|| DialogueError::UnknownNpc(npc.to_string()))
    }
}

fn unknown_node(npc: &str, node: &str) -> DialogueError {
    DialogueError::UnknownNode {
        npc: npc.to_string(),
        node: node.to_string(),
    }
}

fn node_slot<'a>(
    npc: &str,
    node: &str,
    tree: &'a mut NpcTree,
) -> Result<&'a mut DialogueNode, DialogueError> {
    tree.node_mut(node).ok_or_else(|| unknown_node(npc, node))
}

fn check_choices(
    npc: &str,
    node: &str,
    tree: &NpcTree,
    choices: &[Choice],
) -> Result<(), DialogueError> {
    for (i, choice) in choices.iter().enumerate() {
        if !tree.resolves(&choice.next) {
            return Err(DialogueError::DanglingReference(DanglingReference {
                npc: npc.to_string(),
                node: node.to_string(),
                choice_index: i,
                next: choice.next.clone(),
            }));
        }
    }
    Ok(())
}
