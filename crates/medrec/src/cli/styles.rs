//! Styles for the medrec CLI.
//!
//! Code refers to styles by what the text *is* (a header, an id, a warning), never by
//! color. The palette maps those names to `console` styles in one place, so the look can
//! change without touching the renderers.
//!
//! `console` drops the escape codes when stdout is not a terminal or `NO_COLOR` is set,
//! so piped output and tests see plain text.

use console::{Style, StyledObject};
use medrecapp::services::MessageLevel;
use once_cell::sync::Lazy;

pub struct Palette {
    pub header: Style,
    pub id: Style,
    pub muted: Style,
    pub title: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
}

pub static PALETTE: Lazy<Palette> = Lazy::new(|| {
    let muted = Style::new().color256(245);
    Palette {
        header: Style::new().bold().underlined(),
        id: Style::new().yellow(),
        title: Style::new().bold(),
        success: Style::new().green(),
        warning: Style::new().yellow().bold(),
        error: Style::new().red().bold(),
        info: muted.clone(),
        muted,
    }
});

pub fn for_level(level: MessageLevel) -> &'static Style {
    match level {
        MessageLevel::Info => &PALETTE.info,
        MessageLevel::Success => &PALETTE.success,
        MessageLevel::Warning => &PALETTE.warning,
    }
}

pub fn paint<D>(style: &Style, value: D) -> StyledObject<D> {
    style.apply_to(value)
}
