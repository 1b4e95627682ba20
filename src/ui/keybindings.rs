use std::collections::HashMap;

use winit::keyboard::KeyCode;

use crate::settings::ModifierKey;

/// Modifier flags for a key combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierFlags {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Command / super / logo key.
    pub command: bool,
}

impl ModifierFlags {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        command: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Whether the configured hotkey modifier is held. `None` always holds.
    pub fn holds(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::None => true,
            ModifierKey::Alt => self.alt,
            ModifierKey::Command => self.command,
            ModifierKey::Control => self.ctrl,
            ModifierKey::Shift => self.shift,
        }
    }
}

/// A key combination: modifier flags + a physical key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: ModifierFlags,
    pub key: KeyCode,
}

impl KeyCombo {
    /// Plain key, no modifiers.
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            modifiers: ModifierFlags::NONE,
            key,
        }
    }

    pub const fn ctrl(key: KeyCode) -> Self {
        Self {
            modifiers: ModifierFlags::CTRL,
            key,
        }
    }
}

/// Actions that can be triggered by keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Open the wealth window (released, gated by the configured modifier).
    ToggleWindow,
    /// Apply the search field as the text filter and rescan.
    SubmitSearch,
    Rescan,
    /// Switch between per-kind and per-category grouping.
    ToggleGrouping,
    CloseWindow,
}

/// Configurable keyboard shortcut map.
pub struct KeyBindings {
    map: HashMap<KeyCombo, Action>,
    /// Reverse lookup: action → first combo that maps to it.
    reverse: HashMap<Action, KeyCombo>,
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let mut map = HashMap::new();

        map.insert(KeyCombo::plain(KeyCode::F8), Action::ToggleWindow);
        map.insert(KeyCombo::plain(KeyCode::Enter), Action::SubmitSearch);
        map.insert(KeyCombo::plain(KeyCode::NumpadEnter), Action::SubmitSearch);
        map.insert(KeyCombo::plain(KeyCode::F5), Action::Rescan);
        map.insert(KeyCombo::ctrl(KeyCode::KeyG), Action::ToggleGrouping);
        map.insert(KeyCombo::plain(KeyCode::Escape), Action::CloseWindow);

        let reverse = Self::build_reverse(&map);
        Self { map, reverse }
    }

    /// Look up the action for a key combination.
    pub fn lookup(&self, combo: KeyCombo) -> Option<Action> {
        self.map.get(&combo).copied()
    }

    /// The combo bound to an action, if any.
    pub fn combo_for(&self, action: Action) -> Option<KeyCombo> {
        self.reverse.get(&action).copied()
    }

    /// Display label for an action's combo, e.g. "F8" or "Ctrl+G".
    pub fn label_for(&self, action: Action) -> Option<String> {
        let combo = self.reverse.get(&action)?;
        let m = combo.modifiers;
        let mut label = String::new();
        for (held, name) in [(m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.shift, "Shift"), (m.command, "Cmd")] {
            if held {
                label.push_str(name);
                label.push('+');
            }
        }
        label.push_str(&key_name(combo.key));
        Some(label)
    }

    /// Rebind an action. Any previous combo for that action is removed.
    pub fn rebind(&mut self, action: Action, combo: KeyCombo) {
        self.map.retain(|_, a| *a != action);
        self.map.insert(combo, action);
        self.reverse = Self::build_reverse(&self.map);
    }

    fn build_reverse(map: &HashMap<KeyCombo, Action>) -> HashMap<Action, KeyCombo> {
        let mut reverse = HashMap::new();
        // Sorted so the label an action shows is stable across runs.
        let mut combos: Vec<(&KeyCombo, &Action)> = map.iter().collect();
        combos.sort_by_key(|(c, _)| {
            let m = c.modifiers;
            (m.ctrl, m.alt, m.shift, m.command, format!("{:?}", c.key))
        });
        for (&combo, &action) in combos {
            reverse.entry(action).or_insert(combo);
        }
        reverse
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Short key name: "KeyG" → "G", "Digit4" → "4", "Escape" → "Esc".
fn key_name(key: KeyCode) -> String {
    match key {
        KeyCode::Escape => return "Esc".into(),
        KeyCode::Backspace => return "Bksp".into(),
        KeyCode::NumpadEnter => return "Enter".into(),
        _ => {}
    }
    let name = format!("{key:?}");
    if let Some(short) = name.strip_prefix("Key").or_else(|| name.strip_prefix("Digit")) {
        return short.to_string();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_exist() {
        let kb = KeyBindings::defaults();
        assert_eq!(
            kb.lookup(KeyCombo::plain(KeyCode::F8)),
            Some(Action::ToggleWindow)
        );
        assert_eq!(
            kb.lookup(KeyCombo::plain(KeyCode::Escape)),
            Some(Action::CloseWindow)
        );
        assert_eq!(
            kb.lookup(KeyCombo::ctrl(KeyCode::KeyG)),
            Some(Action::ToggleGrouping)
        );
        // Plain G is not grouping.
        assert_eq!(kb.lookup(KeyCombo::plain(KeyCode::KeyG)), None);
    }

    #[test]
    fn labels() {
        let kb = KeyBindings::defaults();
        assert_eq!(kb.label_for(Action::ToggleWindow).as_deref(), Some("F8"));
        assert_eq!(kb.label_for(Action::ToggleGrouping).as_deref(), Some("Ctrl+G"));
        assert_eq!(kb.label_for(Action::SubmitSearch).as_deref(), Some("Enter"));
    }

    #[test]
    fn key_names() {
        assert_eq!(key_name(KeyCode::KeyG), "G");
        assert_eq!(key_name(KeyCode::Digit4), "4");
        assert_eq!(key_name(KeyCode::Escape), "Esc");
        assert_eq!(key_name(KeyCode::F5), "F5");
    }

    #[test]
    fn rebind_replaces_old_combo() {
        let mut kb = KeyBindings::defaults();
        kb.rebind(Action::ToggleWindow, KeyCombo::plain(KeyCode::KeyW));
        assert_eq!(kb.lookup(KeyCombo::plain(KeyCode::F8)), None);
        assert_eq!(
            kb.combo_for(Action::ToggleWindow),
            Some(KeyCombo::plain(KeyCode::KeyW))
        );
    }

    #[test]
    fn modifier_gate() {
        let alt = ModifierFlags {
            alt: true,
            ..ModifierFlags::NONE
        };
        assert!(alt.holds(ModifierKey::None));
        assert!(alt.holds(ModifierKey::Alt));
        assert!(!alt.holds(ModifierKey::Shift));
        assert!(!ModifierFlags::NONE.holds(ModifierKey::Control));
        assert!(ModifierFlags::CTRL.holds(ModifierKey::Control));
        assert!(ModifierFlags::SHIFT.holds(ModifierKey::Shift));
    }
}
