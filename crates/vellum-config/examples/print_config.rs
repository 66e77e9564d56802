/// Example program to print the loaded configuration
///
/// Run with: cargo run -p vellum-config --example print_config

fn main() {
    let config = vellum_config::VellumConfig::load();

    println!("=== Vellum Configuration ===\n");

    println!("Input:");
    println!("  Double-click window: {} ms", config.input.double_click_ms);
    println!();

    println!("Overlay:");
    println!("  Enabled: {}", config.overlay.enabled);
    println!("  Button height: {}", config.overlay.button_height);
    println!("  Char width: {}", config.overlay.char_width);
    println!("  Button padding: {}", config.overlay.button_padding);
    println!();

    println!("Recording:");
    println!("  Undo dir: {}", config.recording.undo_dir.display());
    println!("  Playback dir: {}", config.recording.playback_dir.display());
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
