//! poem_desktop — interactive entry point.

use std::io::{self, Write};

use poem_desktop::app::{run, AppConfig};
use poem_graph::Viewport;

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hyperlink Poetry Space — 超連結詩意空間               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Mode: webcam light tracking");
    #[cfg(not(feature = "camera"))]
    println!("  Mode: simulated light  (use --features camera for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: vision driver off, press V to enable.\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening canvas…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    println!("  歡迎進入超連結詩意空間。");
    println!("  The installation can track a light source through the camera");
    println!("  and use it as the cursor.");
    println!();

    let vision = matches!(
        read_line("  Start the vision driver? (y/N): ").trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    );

    AppConfig { viewport: Viewport::new(1280.0, 800.0), vision }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
