//! Positional resolution of the "add to album" menu entry.
//!
//! The entry's index varies by locale and media type, so it is located
//! relative to anchors that are stable across locales: the download
//! entry's accelerator, an optional second (video-specific) download
//! entry recognized by label containment, and the rotate entry's
//! accelerator. The target is the entry after the furthest anchor found.

use crate::heuristics::{DOWNLOAD_SHORTCUT, ROTATE_SHORTCUT};

/// One recognizable menu entry: its visible label and, if present, the
/// accelerator it advertises.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub shortcut: Option<String>,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>, shortcut: Option<&str>) -> Self {
        Self {
            label: label.into(),
            shortcut: shortcut.map(str::to_string),
        }
    }
}

/// Index of the target entry. Defaults to 0 when no anchor is found,
/// which is a known fallback risk on unexpected layouts; callers bound it
/// against the actual entry list.
pub fn locate_target_menu_item(entries: &[MenuEntry]) -> usize {
    let download = entries
        .iter()
        .position(|e| e.shortcut.as_deref() == Some(DOWNLOAD_SHORTCUT));

    // A video item shows a second download entry whose label embeds the
    // plain one's ("Download" / "Download original"); containment skips it
    // without depending on the locale's wording.
    let video_download = download.and_then(|idx| {
        let label = entries[idx].label.as_str();
        if label.is_empty() {
            return None;
        }
        entries
            .iter()
            .enumerate()
            .skip(idx + 1)
            .find(|(_, e)| e.label.contains(label))
            .map(|(i, _)| i)
    });

    let rotate = entries
        .iter()
        .position(|e| e.shortcut.as_deref() == Some(ROTATE_SHORTCUT));

    [download, video_download, rotate]
        .into_iter()
        .flatten()
        .max()
        .map(|idx| idx + 1)
        .unwrap_or(0)
}
