//! Shared UI icons and emojis.
//!
//! Emoji with plain-text fallbacks for terminals without emoji support.

use console::Emoji;

use crate::model::Status;

// Stage status indicators
pub static PENDING: Emoji<'_, '_> = Emoji("\u{2b1c} ", "[ ] ");
pub static IN_PROGRESS: Emoji<'_, '_> = Emoji("\u{1f504} ", "[~] ");
pub static DONE: Emoji<'_, '_> = Emoji("\u{2705} ", "[x] ");
pub static FAILED: Emoji<'_, '_> = Emoji("\u{274c} ", "[!] ");
pub static SKIPPED: Emoji<'_, '_> = Emoji("\u{23ed}\u{fe0f}  ", "[>] ");

// General indicators
pub static OK: Emoji<'_, '_> = Emoji("\u{2705} ", "");
pub static PROJECT: Emoji<'_, '_> = Emoji("\u{1f4cb} ", "");
pub static GOAL: Emoji<'_, '_> = Emoji("\u{1f3af} ", "");
pub static NEXT: Emoji<'_, '_> = Emoji("\u{25b6}\u{fe0f}  ", "");
pub static READY: Emoji<'_, '_> = Emoji("\u{1f7e2} ", "");
pub static WAITING: Emoji<'_, '_> = Emoji("\u{1f7e1} ", "");
pub static PIN: Emoji<'_, '_> = Emoji("\u{1f4cc} ", "- ");
pub static SPEECH: Emoji<'_, '_> = Emoji("\u{1f5e3}\u{fe0f}  ", "");

/// Icon for a stage status.
pub fn status_icon(status: Status) -> Emoji<'static, 'static> {
    match status {
        Status::Pending => PENDING,
        Status::InProgress => IN_PROGRESS,
        Status::Done => DONE,
        Status::Failed => FAILED,
        Status::Skipped => SKIPPED,
    }
}
