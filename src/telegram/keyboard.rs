//! Format menu controls
//!
//! Every format becomes one button whose payload is `dl_<format_id>`.

use crate::core::config;
use crate::download::source::FormatDescriptor;
use crate::telegram::transport::{ControlButton, ControlGrid};

/// Prefix of selection payloads
pub const SELECTION_PREFIX: &str = "dl_";

/// Button label: `EXT note (x.x MB)`, size omitted when unknown.
pub fn format_label(format: &FormatDescriptor) -> String {
    let mut label = format!("{} {}", format.ext.to_uppercase(), format.note);
    if let Some(size) = format.size_bytes.filter(|s| *s > 0) {
        label.push_str(&format!(" ({:.1} MB)", size as f64 / 1024.0 / 1024.0));
    }
    label
}

pub fn selection_payload(format_id: &str) -> String {
    format!("{}{}", SELECTION_PREFIX, format_id)
}

/// Extracts the format id from a selection payload.
///
/// Everything after the first prefix is the id, so ids that contain `_`
/// come back intact.
pub fn parse_selection_payload(payload: &str) -> Option<&str> {
    payload.strip_prefix(SELECTION_PREFIX)
}

/// Builds the menu in listing order, `CONTROLS_PER_ROW` buttons per row.
///
/// Formats whose payload would not fit into Telegram callback data are left
/// off the menu.
pub fn format_controls(formats: &[FormatDescriptor]) -> ControlGrid {
    let buttons: Vec<ControlButton> = formats
        .iter()
        .filter_map(|format| {
            let payload = selection_payload(&format.format_id);
            if payload.len() > config::delivery::MAX_CALLBACK_DATA_BYTES {
                log::warn!("Format id '{}' too long for a button, skipping", format.format_id);
                return None;
            }
            Some(ControlButton {
                label: format_label(format),
                payload,
            })
        })
        .collect();

    buttons
        .chunks(config::delivery::CONTROLS_PER_ROW)
        .map(<[ControlButton]>::to_vec)
        .collect()
}
