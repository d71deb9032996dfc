//! Shared UI icons.
//!
//! Each icon falls back to plain text on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Session
pub static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");

// Records and generation
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static TRASH: Emoji<'_, '_> = Emoji("🗑️  ", "-");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[?]");
pub static PENDING: Emoji<'_, '_> = Emoji("⏳ ", "[..]");
