use winit::keyboard::KeyCode;

/// Every key name Scratch (plus F-keys and backspace) can put in a
/// "when key pressed" hat.
pub const KEY_NAMES: &[&str] = &[
    "up arrow", "down arrow", "left arrow", "right arrow", "space", "enter", "backspace",
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
    "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "<", ">", "+", "-", "=", ".", ",", "%", "$", "#", "@", "!", "^", "&", "*",
    "(", ")", "[", "]", "?", "\\", "/", "'", "\"", "`",
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
];

/// Map a key name to a physical key code.
///
/// Shifted punctuation resolves to the key that produces it on a US layout,
/// e.g. `"?"` is `Slash` and `"%"` is `Digit5`.
pub fn key_code(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up arrow" => KeyCode::ArrowUp,
        "down arrow" => KeyCode::ArrowDown,
        "left arrow" => KeyCode::ArrowLeft,
        "right arrow" => KeyCode::ArrowRight,
        "space" => KeyCode::Space,
        "enter" => KeyCode::Enter,
        "backspace" => KeyCode::Backspace,

        "a" => KeyCode::KeyA,
        "b" => KeyCode::KeyB,
        "c" => KeyCode::KeyC,
        "d" => KeyCode::KeyD,
        "e" => KeyCode::KeyE,
        "f" => KeyCode::KeyF,
        "g" => KeyCode::KeyG,
        "h" => KeyCode::KeyH,
        "i" => KeyCode::KeyI,
        "j" => KeyCode::KeyJ,
        "k" => KeyCode::KeyK,
        "l" => KeyCode::KeyL,
        "m" => KeyCode::KeyM,
        "n" => KeyCode::KeyN,
        "o" => KeyCode::KeyO,
        "p" => KeyCode::KeyP,
        "q" => KeyCode::KeyQ,
        "r" => KeyCode::KeyR,
        "s" => KeyCode::KeyS,
        "t" => KeyCode::KeyT,
        "u" => KeyCode::KeyU,
        "v" => KeyCode::KeyV,
        "w" => KeyCode::KeyW,
        "x" => KeyCode::KeyX,
        "y" => KeyCode::KeyY,
        "z" => KeyCode::KeyZ,

        "0" | ")" => KeyCode::Digit0,
        "1" | "!" => KeyCode::Digit1,
        "2" | "@" => KeyCode::Digit2,
        "3" | "#" => KeyCode::Digit3,
        "4" | "$" => KeyCode::Digit4,
        "5" | "%" => KeyCode::Digit5,
        "6" | "^" => KeyCode::Digit6,
        "7" | "&" => KeyCode::Digit7,
        "8" | "*" => KeyCode::Digit8,
        "9" | "(" => KeyCode::Digit9,

        "," | "<" => KeyCode::Comma,
        "." | ">" => KeyCode::Period,
        "-" => KeyCode::Minus,
        "=" | "+" => KeyCode::Equal,
        "[" => KeyCode::BracketLeft,
        "]" => KeyCode::BracketRight,
        "/" | "?" => KeyCode::Slash,
        "\\" => KeyCode::Backslash,
        "'" | "\"" => KeyCode::Quote,
        "`" => KeyCode::Backquote,

        "f1" => KeyCode::F1,
        "f2" => KeyCode::F2,
        "f3" => KeyCode::F3,
        "f4" => KeyCode::F4,
        "f5" => KeyCode::F5,
        "f6" => KeyCode::F6,
        "f7" => KeyCode::F7,
        "f8" => KeyCode::F8,
        "f9" => KeyCode::F9,
        "f10" => KeyCode::F10,
        "f11" => KeyCode::F11,
        "f12" => KeyCode::F12,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for name in KEY_NAMES {
            assert!(key_code(name).is_some(), "no key code for {name:?}");
        }
    }
}
