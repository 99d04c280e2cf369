//! Interactive menu for poking the poetry node-graph engine without a
//! window: spawn, merge, focus, close, and watch the store evolve.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use poem_graph::lexicon::{split_words, BOOTSTRAP_TEXT};
use poem_graph::{
    attempt_merge, next_background, spawn_from_word, BackgroundKind, NodeId, NodeStore, Viewport,
};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║            Hyperlink Poetry — Engine Explorer            ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let viewport = Viewport::new(1280.0, 800.0);
    let mut store = NodeStore::new();
    let mut bg = BackgroundKind::BlissDream;
    let mut rng = StdRng::from_entropy();

    let (cx, cy) = viewport.center();
    store.create(BOOTSTRAP_TEXT, cx - 150.0, cy - 100.0, 0, None);
    println!("  Bootstrapped \"{}\" at the center.\n", BOOTSTRAP_TEXT);

    loop {
        print_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => list_nodes(&store, bg),
            "2" => {
                let Some(id) = pick_node(&store) else { continue };
                let Some(node) = store.get(id) else { continue };
                let words = split_words(&node.full_text);
                if words.is_empty() {
                    println!("  No clickable words in that node.");
                    continue;
                }
                for (i, w) in words.iter().enumerate() {
                    println!("    {}. {}", i + 1, w);
                }
                let idx: usize = read_line("  Word #: ").trim().parse().unwrap_or(1);
                let word = words[idx.saturating_sub(1).min(words.len() - 1)].to_string();
                match spawn_from_word(&mut store, &word, id, viewport, &mut rng) {
                    Some(child) => {
                        bg = next_background(bg, &mut rng);
                        let n = store.get(child).unwrap();
                        println!(
                            "  Spawned {} \"{}\" at ({:.0},{:.0})  depth {}  bg → {}",
                            child, n.text, n.x, n.y, n.depth, bg.name()
                        );
                    }
                    None => println!("  Parent vanished — nothing spawned."),
                }
            }
            "3" => {
                let Some(id) = pick_node(&store) else { continue };
                match attempt_merge(&mut store, id) {
                    Some(merged) => {
                        bg = next_background(bg, &mut rng);
                        let n = store.get(merged).unwrap();
                        println!("  Merged into {}: \"{}\"  depth {}", merged, n.full_text, n.depth);
                    }
                    None => println!("  No neighbor within range — nothing merged."),
                }
            }
            "4" => {
                let Some(id) = pick_node(&store) else { continue };
                store.focus(id);
                println!("  {} raised to the top.", id);
            }
            "5" => {
                let Some(id) = pick_node(&store) else { continue };
                store.close(id);
                println!("  {} closed.", id);
            }
            "6" => {
                bg = next_background(bg, &mut rng);
                println!("  Background pulse → {}", bg.name());
            }
            "q" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  1–6 or q."),
        }
        println!();
    }
}

fn print_menu() {
    println!("  1. List nodes      2. Spawn from word   3. Merge nearest");
    println!("  4. Focus           5. Close             6. Pulse background");
    println!("  q. Quit");
}

fn list_nodes(store: &NodeStore, bg: BackgroundKind) {
    println!("  Background: {}   Nodes: {}", bg.name(), store.len());
    for n in store.paint_order() {
        println!(
            "    {:<8} z={:<4} depth={} ({:>4.0},{:>4.0}) {:.0}×{:.0}  \"{}\"",
            n.id.to_string(), n.z_index, n.depth, n.x, n.y, n.width, n.height, n.full_text
        );
    }
}

fn pick_node(store: &NodeStore) -> Option<NodeId> {
    if store.is_empty() {
        println!("  Store is empty.");
        return None;
    }
    let raw = read_line("  Node id (number): ");
    let n: u64 = raw.trim().trim_start_matches("node-").parse().ok()?;
    let id = NodeId(n);
    if store.get(id).is_none() {
        println!("  No such node.");
        return None;
    }
    Some(id)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
