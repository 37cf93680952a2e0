//! # Reentel Desktop Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reentel Calculator Desktop                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Tauri WebView                               │  │
//! │  │  • Balance / quantity form     • Live rate ticker                │  │
//! │  │  • Discount preview            • Result card + export            │  │
//! │  │                              │                                   │  │
//! │  │                     invoke('command')                            │  │
//! │  └──────────────────────────────┼───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► calls reentel_desktop_lib::run()                  │  │
//! │  │  lib.rs ─────► logging, rate service, state, commands            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// Prevents an additional console window on Windows in release
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

fn main() {
    reentel_desktop_lib::run();
}
