//! Key-chord recognition.
//!
//! The modifier contract is idiosyncratic but fixed: Ctrl held, nothing
//! else. IME composition sequences are filtered out before any key is
//! considered.

/// Snapshot of one keyboard event as delivered by the host environment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyChord {
    pub key: String,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Part of an IME composition sequence.
    pub composing: bool,
}

impl KeyChord {
    /// Plain Ctrl-chord over a key, the only modifier shape recognized.
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt: false,
            ctrl: true,
            meta: false,
            shift: false,
            composing: false,
        }
    }
}

/// Workflow a recognized chord triggers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    NavigateLeft,
    NavigateRight,
    AddToAlbum,
    EditLocation,
}

/// Map a chord to its command. `None` means the event is not ours and
/// default handling must proceed.
pub fn recognize(chord: &KeyChord) -> Option<Command> {
    if chord.composing {
        return None;
    }
    if chord.alt || !chord.ctrl || chord.meta || chord.shift {
        return None;
    }
    match chord.key.as_str() {
        "[" => Some(Command::NavigateLeft),
        "]" => Some(Command::NavigateRight),
        "'" => Some(Command::AddToAlbum),
        "," => Some(Command::EditLocation),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_four_chords() {
        assert_eq!(recognize(&KeyChord::ctrl("[")), Some(Command::NavigateLeft));
        assert_eq!(
            recognize(&KeyChord::ctrl("]")),
            Some(Command::NavigateRight)
        );
        assert_eq!(recognize(&KeyChord::ctrl("'")), Some(Command::AddToAlbum));
        assert_eq!(recognize(&KeyChord::ctrl(",")), Some(Command::EditLocation));
    }

    #[test]
    fn ctrl_is_required_and_sufficient() {
        let mut chord = KeyChord::ctrl("[");
        chord.ctrl = false;
        assert_eq!(recognize(&chord), None);

        let mut chord = KeyChord::ctrl("[");
        chord.shift = true;
        assert_eq!(recognize(&chord), None);

        let mut chord = KeyChord::ctrl("]");
        chord.meta = true;
        assert_eq!(recognize(&chord), None);

        let mut chord = KeyChord::ctrl("]");
        chord.alt = true;
        assert_eq!(recognize(&chord), None);
    }

    #[test]
    fn composition_sequences_are_ignored() {
        let mut chord = KeyChord::ctrl("[");
        chord.composing = true;
        assert_eq!(recognize(&chord), None);
    }

    #[test]
    fn unbound_keys_pass_through() {
        assert_eq!(recognize(&KeyChord::ctrl("x")), None);
    }
}
