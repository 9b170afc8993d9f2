use std::fmt;

use rdev::Key;

/// Logical modifier. Left and right physical keys both map to one modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::Meta => "Meta",
        };
        f.write_str(name)
    }
}

/// Physical key as tracked by the chord machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    /// `A`..=`Z`, stored upper-case
    Letter(char),
    /// `0`..=`9`
    Digit(u8),
    /// `F1`..=`F12`
    Function(u8),
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    PrintScreen,
}

impl KeyCode {
    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            KeyCode::ControlLeft | KeyCode::ControlRight => Some(Modifier::Ctrl),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Modifier::Shift),
            KeyCode::AltLeft | KeyCode::AltRight => Some(Modifier::Alt),
            KeyCode::MetaLeft | KeyCode::MetaRight => Some(Modifier::Meta),
            _ => None,
        }
    }

    /// Map an `rdev` key; keys the chord parser cannot name give `None`.
    pub fn from_rdev(key: Key) -> Option<KeyCode> {
        let code = match key {
            Key::ControlLeft => KeyCode::ControlLeft,
            Key::ControlRight => KeyCode::ControlRight,
            Key::ShiftLeft => KeyCode::ShiftLeft,
            Key::ShiftRight => KeyCode::ShiftRight,
            Key::Alt => KeyCode::AltLeft,
            Key::AltGr => KeyCode::AltRight,
            Key::MetaLeft => KeyCode::MetaLeft,
            Key::MetaRight => KeyCode::MetaRight,
            Key::Space => KeyCode::Space,
            Key::Tab => KeyCode::Tab,
            Key::Return | Key::KpReturn => KeyCode::Enter,
            Key::Escape => KeyCode::Escape,
            Key::Backspace => KeyCode::Backspace,
            Key::Delete => KeyCode::Delete,
            Key::Insert => KeyCode::Insert,
            Key::Home => KeyCode::Home,
            Key::End => KeyCode::End,
            Key::PageUp => KeyCode::PageUp,
            Key::PageDown => KeyCode::PageDown,
            Key::LeftArrow => KeyCode::Left,
            Key::RightArrow => KeyCode::Right,
            Key::UpArrow => KeyCode::Up,
            Key::DownArrow => KeyCode::Down,
            Key::PrintScreen => KeyCode::PrintScreen,
            Key::F1 => KeyCode::Function(1),
            Key::F2 => KeyCode::Function(2),
            Key::F3 => KeyCode::Function(3),
            Key::F4 => KeyCode::Function(4),
            Key::F5 => KeyCode::Function(5),
            Key::F6 => KeyCode::Function(6),
            Key::F7 => KeyCode::Function(7),
            Key::F8 => KeyCode::Function(8),
            Key::F9 => KeyCode::Function(9),
            Key::F10 => KeyCode::Function(10),
            Key::F11 => KeyCode::Function(11),
            Key::F12 => KeyCode::Function(12),
            Key::Num0 => KeyCode::Digit(0),
            Key::Num1 => KeyCode::Digit(1),
            Key::Num2 => KeyCode::Digit(2),
            Key::Num3 => KeyCode::Digit(3),
            Key::Num4 => KeyCode::Digit(4),
            Key::Num5 => KeyCode::Digit(5),
            Key::Num6 => KeyCode::Digit(6),
            Key::Num7 => KeyCode::Digit(7),
            Key::Num8 => KeyCode::Digit(8),
            Key::Num9 => KeyCode::Digit(9),
            Key::KeyA => KeyCode::Letter('A'),
            Key::KeyB => KeyCode::Letter('B'),
            Key::KeyC => KeyCode::Letter('C'),
            Key::KeyD => KeyCode::Letter('D'),
            Key::KeyE => KeyCode::Letter('E'),
            Key::KeyF => KeyCode::Letter('F'),
            Key::KeyG => KeyCode::Letter('G'),
            Key::KeyH => KeyCode::Letter('H'),
            Key::KeyI => KeyCode::Letter('I'),
            Key::KeyJ => KeyCode::Letter('J'),
            Key::KeyK => KeyCode::Letter('K'),
            Key::KeyL => KeyCode::Letter('L'),
            Key::KeyM => KeyCode::Letter('M'),
            Key::KeyN => KeyCode::Letter('N'),
            Key::KeyO => KeyCode::Letter('O'),
            Key::KeyP => KeyCode::Letter('P'),
            Key::KeyQ => KeyCode::Letter('Q'),
            Key::KeyR => KeyCode::Letter('R'),
            Key::KeyS => KeyCode::Letter('S'),
            Key::KeyT => KeyCode::Letter('T'),
            Key::KeyU => KeyCode::Letter('U'),
            Key::KeyV => KeyCode::Letter('V'),
            Key::KeyW => KeyCode::Letter('W'),
            Key::KeyX => KeyCode::Letter('X'),
            Key::KeyY => KeyCode::Letter('Y'),
            Key::KeyZ => KeyCode::Letter('Z'),
            _ => return None,
        };
        Some(code)
    }

    /// Parse a single non-modifier key name (case-insensitive).
    pub fn parse(name: &str) -> Option<KeyCode> {
        let upper = name.trim().to_ascii_uppercase();
        let code = match upper.as_str() {
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "BACKSPACE" => KeyCode::Backspace,
            "DELETE" | "DEL" => KeyCode::Delete,
            "INSERT" | "INS" => KeyCode::Insert,
            "HOME" => KeyCode::Home,
            "END" => KeyCode::End,
            "PAGEUP" => KeyCode::PageUp,
            "PAGEDOWN" => KeyCode::PageDown,
            "LEFT" | "LEFTARROW" => KeyCode::Left,
            "RIGHT" | "RIGHTARROW" => KeyCode::Right,
            "UP" | "UPARROW" => KeyCode::Up,
            "DOWN" | "DOWNARROW" => KeyCode::Down,
            "PRINTSCREEN" | "PRTSC" => KeyCode::PrintScreen,
            _ if upper.len() > 1 && upper.starts_with('F') => match upper[1..].parse::<u8>() {
                Ok(n @ 1..=12) => KeyCode::Function(n),
                _ => return None,
            },
            _ => {
                let mut chars = upper.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => KeyCode::Letter(c),
                    (Some(c), None) if c.is_ascii_digit() => KeyCode::Digit(c as u8 - b'0'),
                    _ => return None,
                }
            }
        };
        Some(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Letter(c) => write!(f, "{c}"),
            KeyCode::Digit(d) => write!(f, "{d}"),
            KeyCode::Function(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}
