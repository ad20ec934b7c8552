/// Play — interactive terminal session over the office dialogue.
///
/// Usage: play [--dialogue <path>] [--shop <path>] [--seed <n>]
///
/// Commands:
///   talk <npc>            — start a conversation
///   <n>                   — take the n-th displayed choice
///   npcs                  — list NPCs in the loaded dialogue
///   inv                   — show inventory, wallet and clearance
///   give <item>           — put an item in the inventory
///   take <item>           — remove an item from the inventory
///   shop                  — list the store catalog
///   buy <item>            — buy an item
///   sort                  — start the data-sort terminal
///   drop <block> <bin>    — sort a block into a bin
///   logoff                — leave the data-sort terminal
///   help                  — list commands
///   quit                  — exit

use office_dialogue::core::engine::DialogueEngine;
use office_dialogue::core::host::{PresentationHost, SessionHost};
use office_dialogue::core::minigame::settle;
use office_dialogue::core::shop::Shop;
use office_dialogue::core::sorting::{DataSort, SortConfig, SortDrop};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let mut dialogue_path = "data/dialogue.json".to_string();
    let mut shop_path = "data/shop.ron".to_string();
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--dialogue" if i + 1 < args.len() => {
                i += 1;
                dialogue_path = args[i].clone();
            }
            "--shop" if i + 1 < args.len() => {
                i += 1;
                shop_path = args[i].clone();
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut engine = DialogueEngine::new(SessionHost::new());
    engine.load_graph(Path::new(&dialogue_path));
    if !engine.has_graph() {
        eprintln!("WARNING: no dialogue loaded from {}", dialogue_path);
    }

    let shop = match Shop::load_from_ron(Path::new(&shop_path)) {
        Ok(shop) => shop,
        Err(e) => {
            eprintln!("WARNING: store closed ({}): {}", shop_path, e);
            Shop::default()
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut sort = match DataSort::new(SortConfig::default()) {
        Ok(sort) => sort,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("office> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        if let Ok(n) = cmd.parse::<usize>() {
            match n.checked_sub(1).and_then(|i| engine.host().displayed_choice(i)) {
                Some(action) => {
                    engine.host_mut().dismiss();
                    engine.choose(&action);
                    print_frame(engine.host());
                }
                None => println!("No choice {} on screen.", n),
            }
            continue;
        }

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "talk" => {
                if rest.is_empty() {
                    println!("Usage: talk <npc>");
                    continue;
                }
                if talk(&mut engine, rest) {
                    print_frame(engine.host());
                } else {
                    println!("Nobody called '{}' here.", rest);
                }
            }
            "npcs" => match engine.store() {
                Some(store) => {
                    let mut npcs: Vec<&String> = store.graph().npcs.keys().collect();
                    npcs.sort();
                    for npc in npcs {
                        println!("  {}", npc);
                    }
                }
                None => println!("No dialogue loaded."),
            },
            "inv" | "i" => {
                let host = engine.host();
                if host.inventory().is_empty() {
                    println!("Inventory: (empty)");
                } else {
                    println!("Inventory: {}", host.inventory().items().join(", "));
                }
                println!("Credits: {}", host.wallet().balance());
                println!("Clearance: Level {}", host.clearance());
            }
            "give" => {
                if rest.is_empty() {
                    println!("Usage: give <item>");
                    continue;
                }
                engine.host_mut().grant_item(rest);
                println!("Added '{}'.", rest);
            }
            "take" => {
                if rest.is_empty() {
                    println!("Usage: take <item>");
                    continue;
                }
                engine.host_mut().remove_item(rest);
                println!("Removed '{}'.", rest);
            }
            "shop" => {
                if shop.items.is_empty() {
                    println!("The store is closed.");
                }
                for item in &shop.items {
                    println!("  {:<30} {:>4} cr  {}", item.name, item.price, item.description);
                }
            }
            "buy" => match engine.host_mut().buy(&shop, rest) {
                Ok(item) => println!("Bought {} for {} credits.", item.name, item.price),
                Err(e) => println!("Can't buy that: {}", e),
            },
            "sort" => {
                let blocks = sort.start(&mut rng).to_vec();
                println!("AWAITING INPUT... FILE: PROXY-01");
                println!("Bins: {}", sort.config().categories.join(", "));
                for b in &blocks {
                    println!("  [{:>2}] {:<10} ({})", b.id, b.label, b.kind);
                }
            }
            "drop" => {
                let mut args = rest.split_whitespace();
                let (Some(id), Some(bin)) = (args.next(), args.next()) else {
                    println!("Usage: drop <block> <bin>");
                    continue;
                };
                let Ok(id) = id.parse::<u32>() else {
                    println!("Invalid block id: {}", id);
                    continue;
                };
                match sort.drop_block(id, bin) {
                    SortDrop::Inactive => println!("The terminal is off. Type 'sort' first."),
                    SortDrop::UnknownBlock => println!("No block {}.", id),
                    SortDrop::WrongBin => println!("*bzzt* Wrong bin."),
                    SortDrop::Sorted { score } => println!(
                        "Sorted. {}/{} ({:.0}%)",
                        score,
                        sort.config().target_score,
                        sort.progress() * 100.0
                    ),
                    SortDrop::Completed(outcome) => {
                        println!("EGO CALIBRATED. CLEARANCE UPGRADED.");
                        settle(&outcome, engine.host_mut());
                        print_frame(engine.host());
                    }
                }
            }
            "logoff" => {
                let outcome = sort.log_off();
                settle(&outcome, engine.host_mut());
                print_frame(engine.host());
            }
            _ => println!("Unknown command '{}'. Type 'help'.", cmd),
        }
    }
}

/// Start a conversation with `npc` if the loaded dialogue knows it.
/// A running conversation is left alone when it does not.
fn talk(engine: &mut DialogueEngine<SessionHost>, npc: &str) -> bool {
    let known = engine.store().is_some_and(|s| s.contains_npc(npc));
    if known {
        engine.start_conversation(npc);
    }
    known
}

fn print_frame(host: &SessionHost) {
    let Some(frame) = host.frame() else {
        println!("(dialogue closed)\n");
        return;
    };
    println!("\n{}\n", frame.text);
    if frame.choices.is_empty() {
        println!("  (Click to continue)");
    }
    for (i, choice) in frame.choices.iter().enumerate() {
        println!("  {}. {}", i + 1, choice.label);
    }
    println!();
}

fn print_usage() {
    println!("Usage: play [--dialogue <path>] [--shop <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  talk <npc>          start a conversation");
    println!("  <n>                 take the n-th displayed choice");
    println!("  npcs                list NPCs");
    println!("  inv                 inventory, credits and clearance");
    println!("  give <item>         add an item");
    println!("  take <item>         remove an item");
    println!("  shop                list the store catalog");
    println!("  buy <item>          buy an item");
    println!("  sort                start the data-sort terminal");
    println!("  drop <block> <bin>  sort a block");
    println!("  logoff              leave the terminal");
    println!("  quit                exit");
}
