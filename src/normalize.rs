// Hyphenation transform pair used by the normalize flag.

/// Forward transform: every space becomes a hyphen.
pub fn hyphenate(text: &str) -> String {
    text.replace(' ', "-")
}

/// Backward transform: every hyphen becomes a space.
pub fn dehyphenate(text: &str) -> String {
    text.replace('-', " ")
}

/// Apply the transform in the direction the flag asks for.
pub fn apply(text: &str, enabled: bool) -> String {
    if enabled {
        hyphenate(text)
    } else {
        dehyphenate(text)
    }
}
