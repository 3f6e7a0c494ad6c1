use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Camera presets and playback commands reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewCommand {
    ResetView,
    FitRoute,
    FitGalaxy,
    Recenter,
    ReplayAnimation,
}

static KEY_BINDINGS: Lazy<HashMap<char, ViewCommand>> = Lazy::new(|| {
    HashMap::from([
        ('r', ViewCommand::ResetView),
        ('f', ViewCommand::FitRoute),
        ('g', ViewCommand::FitGalaxy),
        ('c', ViewCommand::Recenter),
        ('a', ViewCommand::ReplayAnimation),
    ])
});

/// Where keyboard focus was when the key went down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyFocus {
    #[default]
    Map,
    /// A text field or similar; shortcuts must not steal its keys.
    TextInput,
}

/// Command bound to `key`, if any. Single characters only, case-insensitive.
pub fn command_for_key(key: &str, focus: KeyFocus) -> Option<ViewCommand> {
    if focus == KeyFocus::TextInput {
        return None;
    }
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    KEY_BINDINGS.get(&c.to_ascii_lowercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_are_case_insensitive() {
        assert_eq!(command_for_key("r", KeyFocus::Map), Some(ViewCommand::ResetView));
        assert_eq!(command_for_key("F", KeyFocus::Map), Some(ViewCommand::FitRoute));
        assert_eq!(command_for_key("a", KeyFocus::Map), Some(ViewCommand::ReplayAnimation));
        assert_eq!(command_for_key("x", KeyFocus::Map), None);
        assert_eq!(command_for_key("Enter", KeyFocus::Map), None);
    }

    #[test]
    fn text_input_swallows_shortcuts() {
        assert_eq!(command_for_key("g", KeyFocus::TextInput), None);
    }
}
