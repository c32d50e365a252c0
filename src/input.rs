//! Keyboard input translation
//!
//! Turns crossterm key events into game actions. Each physical press fires
//! once: auto-repeat events only refresh the held state. Soft drop starts on
//! press and stops on release.
//!
//! Many terminals never report key releases, so a key also counts as released
//! once no event for it arrived within a timeout. Until the first auto-repeat
//! shows up the timeout is the longer repeat delay, since terminals wait that
//! long before repeating a held key.

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use std::time::{Duration, Instant};

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub start: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!(key = %s, "ignoring unknown key name in bindings");
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&settings.keys.rotate_ccw),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            start: Self::parse_keys(&settings.keys.start),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// Action triggered by pressing `code`, if any
    fn action_for(&self, code: KeyCode) -> Option<Action> {
        if self.move_left.contains(&code) {
            Some(Action::MoveLeft)
        } else if self.move_right.contains(&code) {
            Some(Action::MoveRight)
        } else if self.rotate_cw.contains(&code) {
            Some(Action::RotateCW)
        } else if self.rotate_ccw.contains(&code) {
            Some(Action::RotateCCW)
        } else if self.soft_drop.contains(&code) {
            Some(Action::SoftDropStart)
        } else if self.hard_drop.contains(&code) {
            Some(Action::HardDrop)
        } else if self.start.contains(&code) {
            Some(Action::StartGame)
        } else if self.quit.contains(&code) {
            Some(Action::Quit)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// A key currently considered held down
#[derive(Debug, Clone)]
struct HeldKey {
    code: KeyCode,
    action: Action,
    last_seen: Instant,
    /// Seen at least one repeat since the press
    repeating: bool,
}

/// Input handler with key-repeat suppression
pub struct InputHandler {
    bindings: KeyBindings,
    held: Vec<HeldKey>,
    release_timeout: Duration,
    repeat_delay: Duration,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            bindings: KeyBindings::default(),
            held: Vec::new(),
            release_timeout: Duration::from_millis(150),
            repeat_delay: Duration::from_millis(700),
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            held: Vec::new(),
            release_timeout: Duration::from_millis(settings.gameplay.key_release_ms),
            repeat_delay: Duration::from_millis(settings.gameplay.key_repeat_delay_ms),
        }
    }

    /// Handle a key press or repeat event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent, now: Instant) -> Vec<Action> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        let code = normalize_key(key.code);

        if let Some(held) = self.held.iter_mut().find(|h| h.code == code) {
            held.last_seen = now;
            held.repeating = true;
            return Vec::new();
        }

        let Some(action) = self.bindings.action_for(code) else {
            return Vec::new();
        };

        self.held.push(HeldKey {
            code,
            action,
            last_seen: now,
            repeating: false,
        });
        vec![action]
    }

    /// Handle a key release event (may never be called on some terminals)
    pub fn key_up(&mut self, key: KeyEvent) -> Vec<Action> {
        let code = normalize_key(key.code);
        let mut actions = Vec::new();
        self.held.retain(|held| {
            if held.code != code {
                return true;
            }
            if let Some(action) = release_action(held.action) {
                actions.push(action);
            }
            false
        });
        actions
    }

    /// Release keys that timed out and return the resulting actions (call every frame)
    pub fn update(&mut self, now: Instant) -> Vec<Action> {
        let (release_timeout, repeat_delay) = (self.release_timeout, self.repeat_delay);
        let mut actions = Vec::new();
        self.held.retain(|held| {
            let timeout = if held.repeating {
                release_timeout
            } else {
                repeat_delay
            };
            if now.duration_since(held.last_seen) <= timeout {
                return true;
            }
            if let Some(action) = release_action(held.action) {
                actions.push(action);
            }
            false
        });
        actions
    }

    /// Forget all held keys
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Action fired when a key bound to `pressed` is let go
fn release_action(pressed: Action) -> Option<Action> {
    match pressed {
        Action::SoftDropStart => Some(Action::SoftDropStop),
        _ => None,
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for(KeyCode::Left), Some(Action::MoveLeft));
        assert_eq!(bindings.action_for(KeyCode::Up), Some(Action::RotateCW));
        assert_eq!(bindings.action_for(KeyCode::Char('x')), Some(Action::RotateCW));
        assert_eq!(bindings.action_for(KeyCode::Char('z')), Some(Action::RotateCCW));
        assert_eq!(bindings.action_for(KeyCode::Char(' ')), Some(Action::HardDrop));
        assert_eq!(bindings.action_for(KeyCode::Enter), Some(Action::StartGame));
        assert_eq!(bindings.action_for(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(bindings.action_for(KeyCode::Char('k')), None);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(KeyBindings::parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("ESCAPE"), Some(KeyCode::Esc));
        assert_eq!(KeyBindings::parse_key("a"), Some(KeyCode::Char('a')));
        assert_eq!(KeyBindings::parse_key("nonsense"), None);
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let keys = vec!["Left".to_string(), "bogus".to_string()];
        assert_eq!(KeyBindings::parse_keys(&keys), vec![KeyCode::Left]);
    }

    #[test]
    fn test_press_fires_once_while_repeating() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(input.key_down(press(KeyCode::Left), start), vec![Action::MoveLeft]);
        for i in 1..10 {
            let t = start + Duration::from_millis(30 * i);
            assert!(input.key_down(press(KeyCode::Left), t).is_empty());
            assert!(input.update(t).is_empty());
        }
    }

    #[test]
    fn test_press_again_after_release() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down(press(KeyCode::Right), start);
        assert!(input.key_up(press(KeyCode::Right)).is_empty());
        assert_eq!(
            input.key_down(press(KeyCode::Right), start + Duration::from_millis(10)),
            vec![Action::MoveRight]
        );
    }

    #[test]
    fn test_soft_drop_start_and_stop() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(
            input.key_down(press(KeyCode::Down), start),
            vec![Action::SoftDropStart]
        );
        assert_eq!(input.key_up(press(KeyCode::Down)), vec![Action::SoftDropStop]);
    }

    #[test]
    fn test_soft_drop_stops_on_timeout() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down(press(KeyCode::Down), start);
        // Still within the repeat delay
        assert!(input.update(start + Duration::from_millis(600)).is_empty());
        assert_eq!(
            input.update(start + Duration::from_millis(701)),
            vec![Action::SoftDropStop]
        );
        // Already released, nothing more to report
        assert!(input.update(start + Duration::from_millis(900)).is_empty());
    }

    #[test]
    fn test_short_timeout_once_repeating() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down(press(KeyCode::Down), start);
        input.key_down(press(KeyCode::Down), start + Duration::from_millis(500));
        assert!(input.update(start + Duration::from_millis(650)).is_empty());
        assert_eq!(
            input.update(start + Duration::from_millis(651)),
            vec![Action::SoftDropStop]
        );
    }

    /// Hold `code` with the terminal repeating after 500 ms, then every 33 ms
    /// until `held_for`, updating every 16 ms until `until`
    fn hold_with_repeat_delay(code: KeyCode, held_for: u64, until: u64) -> Vec<Action> {
        let mut input = InputHandler::new();
        let start = Instant::now();
        let mut actions = input.key_down(press(code), start);
        let mut next_repeat = 500;
        for ms in (16..=until).step_by(16) {
            while next_repeat <= ms && next_repeat <= held_for {
                let t = start + Duration::from_millis(next_repeat);
                actions.extend(input.key_down(press(code), t));
                next_repeat += 33;
            }
            actions.extend(input.update(start + Duration::from_millis(ms)));
        }
        actions
    }

    #[test]
    fn test_held_key_fires_once_across_repeat_delay() {
        assert_eq!(
            hold_with_repeat_delay(KeyCode::Left, 1000, 1000),
            vec![Action::MoveLeft]
        );
    }

    #[test]
    fn test_held_soft_drop_survives_repeat_delay() {
        assert_eq!(
            hold_with_repeat_delay(KeyCode::Down, 1000, 1000),
            vec![Action::SoftDropStart]
        );
        assert_eq!(
            hold_with_repeat_delay(KeyCode::Down, 1000, 1400),
            vec![Action::SoftDropStart, Action::SoftDropStop]
        );
    }

    #[test]
    fn test_uppercase_char_matches_binding() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.key_down(press(KeyCode::Char('Z')), Instant::now()),
            vec![Action::RotateCCW]
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = InputHandler::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.key_down(key, Instant::now()), vec![Action::Quit]);
    }

    #[test]
    fn test_clear_forgets_held_keys() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down(press(KeyCode::Left), now);
        input.clear();
        assert_eq!(input.key_down(press(KeyCode::Left), now), vec![Action::MoveLeft]);
    }
}
