/// Dialogue Linter — validates a dialogue file's wiring and event coverage.
///
/// Usage: dialogue_linter <dialogue.json|dialogue.ron>

use office_dialogue::core::events::EventTable;
use office_dialogue::core::store::DialogueError;
use office_dialogue::schema::dialogue::{DialogueGraph, NpcTree, END_NODE, START_NODE};
use rustc_hash::FxHashSet;
use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: dialogue_linter <dialogue.json|dialogue.ron>");
        process::exit(0);
    }

    let path = Path::new(&args[1]);
    if !path.is_file() {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    // Parse without the store's integrity check so every problem is reported.
    let graph = match read_graph(path) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("ERROR: Failed to load dialogue file: {}", e);
            process::exit(1);
        }
    };

    let node_count: usize = graph.npcs.values().map(|t| t.nodes.len()).sum();
    println!("Loaded {} NPCs, {} nodes", graph.npcs.len(), node_count);

    let (errors, warnings) = lint_graph(&graph, &EventTable::office());

    println!("\n=== Dialogue Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn read_graph(path: &Path) -> Result<DialogueGraph, DialogueError> {
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|s| s.to_str()) {
        Some("ron") => Ok(ron::from_str(&contents)?),
        _ => Ok(serde_json::from_str(&contents)?),
    }
}

fn lint_graph(graph: &DialogueGraph, events: &EventTable) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for dangling in graph.dangling_references() {
        errors.push(dangling.to_string());
    }

    let mut npcs: Vec<&String> = graph.npcs.keys().collect();
    npcs.sort();

    for npc in npcs {
        let tree = &graph.npcs[npc];

        if tree.node(START_NODE).is_none() {
            errors.push(format!("NPC '{}' has no '{}' node", npc, START_NODE));
        }
        if tree.node(END_NODE).is_some() {
            errors.push(format!(
                "NPC '{}' defines a node named '{}', which is reserved",
                npc, END_NODE
            ));
        }

        let reachable = reachable_nodes(tree);
        let mut node_ids: Vec<&String> = tree.nodes.keys().collect();
        node_ids.sort();

        for node_id in node_ids {
            let node = &tree.nodes[node_id];

            if !reachable.contains(node_id.as_str()) {
                // Events can wire nodes in later, so this is only a hint.
                warnings.push(format!(
                    "{}.{} is not reachable from '{}' without events",
                    npc, node_id, START_NODE
                ));
            }

            if node.text.trim().is_empty() {
                warnings.push(format!("{}.{} has empty text", npc, node_id));
            }

            for (i, choice) in node.choices.iter().enumerate() {
                if let Some(event) = &choice.event {
                    if !events.contains(event) {
                        warnings.push(format!(
                            "{}.{} choice {} fires unknown event '{}' (it will be ignored)",
                            npc, node_id, i, event
                        ));
                    }
                }
                if let Some(consumed) = &choice.consumes {
                    if choice.requires.as_deref() != Some(consumed.as_str()) {
                        warnings.push(format!(
                            "{}.{} choice {} consumes '{}' without requiring it",
                            npc, node_id, i, consumed
                        ));
                    }
                }
            }

            let all_gated = !node.choices.is_empty()
                && node.choices.iter().all(|c| c.requires.is_some());
            if all_gated {
                warnings.push(format!(
                    "{}.{} offers no choices without items; players may see only a dismiss button",
                    npc, node_id
                ));
            }
        }
    }

    let items: BTreeSet<&str> = graph
        .npcs
        .values()
        .flat_map(|t| t.nodes.values())
        .flat_map(|n| n.choices.iter())
        .filter_map(|c| c.requires.as_deref())
        .collect();
    if !items.is_empty() {
        println!("Items gating choices: {:?}", items);
    }

    (errors, warnings)
}

/// Nodes reachable from `start` by following choices as currently wired.
fn reachable_nodes(tree: &NpcTree) -> FxHashSet<&str> {
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    if tree.node(START_NODE).is_some() {
        queue.push_back(START_NODE);
    }
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = tree.node(id) {
            for choice in &node.choices {
                if choice.next != END_NODE && tree.node(&choice.next).is_some() {
                    queue.push_back(choice.next.as_str());
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(json: &str) -> DialogueGraph {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn reachability_follows_current_wiring() {
        let g = graph(
            r#"{"gary": {
                "start": {"text": "Hi.", "choices": [{"text": "Go", "next": "problem"}]},
                "problem": {"text": "Help.", "choices": [{"text": "Back", "next": "start"}]},
                "later": {"text": "Thanks."}
            }}"#,
        );
        let reachable = reachable_nodes(&g.npcs["gary"]);
        let mut ids: Vec<&str> = reachable.into_iter().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["problem", "start"]);
    }

    #[test]
    fn shipped_dialogue_has_no_errors() {
        let g = read_graph(Path::new("data/dialogue.json")).unwrap();
        let (errors, _) = lint_graph(&g, &EventTable::office());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn dangling_and_unknown_events_are_reported() {
        let g = graph(
            r#"{"a": {"start": {"text": "x", "choices": [
                {"text": "go", "next": "ghost", "event": "give_unicorn"}
            ]}}}"#,
        );
        let (errors, warnings) = lint_graph(&g, &EventTable::office());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ghost"));
        assert!(warnings.iter().any(|w| w.contains("give_unicorn")));
    }
}
