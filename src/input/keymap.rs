//! Key normalization: browser key events -> simulation key codes.
//!
//! Navigation keys are matched by physical position (`KeyboardEvent.code`),
//! everything that types a character by the character itself
//! (`KeyboardEvent.key`), so AZERTY, QWERTZ and Dvorak users get the letter
//! printed on their keycap.

/// A normalized simulation key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const LEFT: KeyCode = KeyCode(0);
    pub const RIGHT: KeyCode = KeyCode(1);
    pub const UP: KeyCode = KeyCode(2);
    pub const DOWN: KeyCode = KeyCode(3);
    pub const SPACE: KeyCode = KeyCode(4);
    pub const ENTER: KeyCode = KeyCode(5);
    pub const TAB: KeyCode = KeyCode(10);
    pub const BACKSPACE: KeyCode = KeyCode(11);
    pub const DELETE: KeyCode = KeyCode(12);
    pub const HOME: KeyCode = KeyCode(13);
    pub const END: KeyCode = KeyCode(14);
    pub const ESCAPE: KeyCode = KeyCode(15);

    pub const LETTER_BASE: u32 = 100;
    pub const DIGIT_BASE: u32 = 200;

    /// The value handed across the simulation boundary.
    pub fn tagged(self) -> i32 {
        tag_int(self.0 as i32)
    }
}

/// Tagged small-integer encoding used by the simulation: `(n << 1) | 1`.
pub fn tag_int(n: i32) -> i32 {
    (n << 1) | 1
}

/// Positional keys, looked up by `KeyboardEvent.code`.
pub fn code_key(code: &str) -> Option<KeyCode> {
    let key = match code {
        "ArrowLeft" => KeyCode::LEFT,
        "ArrowRight" => KeyCode::RIGHT,
        "ArrowUp" => KeyCode::UP,
        "ArrowDown" => KeyCode::DOWN,
        "Space" => KeyCode::SPACE,
        "Enter" => KeyCode::ENTER,
        "Tab" => KeyCode::TAB,
        "Backspace" => KeyCode::BACKSPACE,
        "Delete" => KeyCode::DELETE,
        "Home" => KeyCode::HOME,
        "End" => KeyCode::END,
        "Escape" => KeyCode::ESCAPE,
        _ => return None,
    };
    Some(key)
}

/// Character keys, looked up by the typed character (`KeyboardEvent.key`).
/// Shifted and unshifted punctuation share a code.
pub fn char_key(key: &str) -> Option<KeyCode> {
    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };

    let code = match c {
        'a'..='z' => KeyCode::LETTER_BASE + (c as u32 - 'a' as u32),
        'A'..='Z' => KeyCode::LETTER_BASE + (c as u32 - 'A' as u32),
        '0'..='9' => KeyCode::DIGIT_BASE + (c as u32 - '0' as u32),
        '-' | '_' => 210,
        '=' | '+' => 211,
        '[' | '{' => 212,
        ']' | '}' => 213,
        ';' | ':' => 214,
        '\'' | '"' => 215,
        '`' | '~' => 216,
        '\\' | '|' => 217,
        ',' | '<' => 218,
        '.' | '>' => 219,
        '/' | '?' => 220,
        _ => return None,
    };
    Some(KeyCode(code))
}

/// Positional match first, then the typed character.
pub fn lookup(code: &str, key: &str) -> Option<KeyCode> {
    code_key(code).or_else(|| char_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagging_matches_simulation_abi() {
        assert_eq!(tag_int(0), 1);
        assert_eq!(tag_int(5), 11);
        assert_eq!(tag_int(100), 201);
        assert_eq!(KeyCode(220).tagged(), 441);
    }

    #[test]
    fn navigation_keys_by_position() {
        assert_eq!(code_key("ArrowLeft"), Some(KeyCode(0)));
        assert_eq!(code_key("ArrowDown"), Some(KeyCode(3)));
        assert_eq!(code_key("Escape"), Some(KeyCode(15)));
        assert_eq!(code_key("KeyA"), None);
    }

    #[test]
    fn letters_ignore_case() {
        assert_eq!(char_key("a"), Some(KeyCode(100)));
        assert_eq!(char_key("A"), Some(KeyCode(100)));
        assert_eq!(char_key("z"), Some(KeyCode(125)));
        assert_eq!(char_key("Z"), Some(KeyCode(125)));
    }

    #[test]
    fn digits_and_punctuation_pairs() {
        assert_eq!(char_key("0"), Some(KeyCode(200)));
        assert_eq!(char_key("9"), Some(KeyCode(209)));
        for (plain, shifted, code) in [
            ("-", "_", 210),
            ("=", "+", 211),
            ("[", "{", 212),
            ("]", "}", 213),
            (";", ":", 214),
            ("'", "\"", 215),
            ("`", "~", 216),
            ("\\", "|", 217),
            (",", "<", 218),
            (".", ">", 219),
            ("/", "?", 220),
        ] {
            assert_eq!(char_key(plain), Some(KeyCode(code)), "{plain}");
            assert_eq!(char_key(shifted), Some(KeyCode(code)), "{shifted}");
        }
    }

    #[test]
    fn named_and_non_ascii_keys_are_unmapped() {
        assert_eq!(char_key("Shift"), None);
        assert_eq!(char_key("F1"), None);
        assert_eq!(char_key(""), None);
        assert_eq!(char_key("é"), None);
        assert_eq!(char_key("!"), None);
    }

    #[test]
    fn layout_independence() {
        // AZERTY: the physical Q position types 'a'.
        assert_eq!(lookup("KeyQ", "a"), Some(KeyCode(100)));
        // Space is positional even though its key is " ".
        assert_eq!(lookup("Space", " "), Some(KeyCode::SPACE));
        // Position wins over character for navigation keys.
        assert_eq!(lookup("Enter", "Enter"), Some(KeyCode::ENTER));
        assert_eq!(lookup("ShiftLeft", "Shift"), None);
    }
}
