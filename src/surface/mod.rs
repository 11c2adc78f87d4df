//! 描画面の実装
//!
//! 現在は Chromium (chromiumoxide) のみ

mod chromium;

pub use chromium::{ChromiumLauncher, ChromiumSurface};
