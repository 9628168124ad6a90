//! # Blockworld Engine Entry Point
//!
//! Runs a headless session of the engine.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = blockworld_engine::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
