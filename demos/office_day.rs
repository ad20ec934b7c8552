/// Office Day example — plays the shipped quest line start to finish.
///
/// Hat from HR → notes for Gary → Carlbot switched off → key → Proxybot QA,
/// then a round at the data-sort terminal and a trip to the vending store.
///
/// Run with: cargo run --example office_day

use office_dialogue::core::engine::{DialogueEngine, DialogueEngineBuilder};
use office_dialogue::core::host::SessionHost;
use office_dialogue::core::minigame::settle;
use office_dialogue::core::shop::Shop;
use office_dialogue::core::sorting::{DataSort, SortConfig, SortDrop};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Scene title, NPC, and the choices taken in order.
const QUEST: &[(&str, &str, &[&str])] = &[
    (
        "The Festive Mandate",
        "hr_bot",
        &["Is there anything festive I can wear?", "Thanks, I guess."],
    ),
    (
        "Gary Has a Problem",
        "gary",
        &["What's wrong, Gary?", "I could do that.", "On it."],
    ),
    (
        "Lights Out for Carl",
        "carlbot",
        &["Stick a Post-it note on its sensor.", "Leave it."],
    ),
    (
        "Payment in Brass",
        "gary",
        &[
            "Have you put the note on Carl yet?",
            "Carl is out cold.",
            "Take the key.",
            "See you around.",
        ],
    ),
    (
        "Quality Assurance",
        "proxybot_qa",
        &["Open the panel with the Small Key.", "Run the diagnostic."],
    ),
    ("Gratitude", "gary", &["No problem."]),
];

fn main() {
    env_logger::init();

    let mut engine = DialogueEngineBuilder::new()
        .dialogue_path("data/dialogue.json")
        .build(SessionHost::new())
        .expect("Failed to load office dialogue");
    let shop =
        Shop::load_from_ron(Path::new("data/shop.ron")).expect("Failed to load store catalog");

    println!("========================================");
    println!("   A DAY AT THE OFFICE");
    println!("========================================");

    for (i, (title, npc, script)) in QUEST.iter().enumerate() {
        scene(i + 1, title, &mut engine, npc, script);
    }

    // --- Scene 7: the data-sort terminal ---
    println!("--- Scene 7: Ego Calibration ---");
    let mut sort = DataSort::new(SortConfig::default()).expect("Default sort config is valid");
    let blocks = sort.start(&mut StdRng::seed_from_u64(2026)).to_vec();
    for block in &blocks {
        match sort.drop_block(block.id, &block.kind) {
            SortDrop::Completed(outcome) => {
                settle(&outcome, engine.host_mut());
                print_frame(engine.host());
            }
            SortDrop::Sorted { score } => {
                println!("  {} -> {} ({}/{})", block.label, block.kind, score, blocks.len())
            }
            other => println!("  unexpected drop result: {:?}", other),
        }
    }
    println!();

    // --- Scene 8: vending store ---
    println!("--- Scene 8: The Vending Store ---");
    for name in ["Coffee", "Stress Ball", "Noise-Cancelling Headphones"] {
        match engine.host_mut().buy(&shop, name) {
            Ok(item) => println!("  Bought {} for {} credits.", item.name, item.price),
            Err(e) => println!("  {}: {}", name, e),
        }
    }
    println!();

    let host = engine.host();
    println!("========================================");
    println!("Inventory: {}", host.inventory().items().join(", "));
    println!("Credits:   {}", host.wallet().balance());
    println!("Clearance: Level {}", host.clearance());
    println!("========================================");
}

fn scene(
    number: usize,
    title: &str,
    engine: &mut DialogueEngine<SessionHost>,
    npc: &str,
    script: &[&str],
) {
    println!("--- Scene {}: {} ---", number, title);
    engine.start_conversation(npc);
    print_frame(engine.host());
    for line in script {
        let action = engine
            .host()
            .frame()
            .and_then(|f| f.choices.iter().find(|c| c.label == *line).cloned());
        match action {
            Some(action) => {
                println!("  > {}", line);
                engine.choose(&action);
                print_frame(engine.host());
            }
            None => {
                println!("  ('{}' is not on offer)", line);
                break;
            }
        }
    }
    engine.host_mut().dismiss();
    println!();
}

fn print_frame(host: &SessionHost) {
    if let Some(frame) = host.frame() {
        println!("  {}", frame.text);
    }
}
