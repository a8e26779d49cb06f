//! Validation helpers for DTOs.

use validator::ValidationError;

/// Upper bound on player name length, in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 64;

/// Validates that a player name stays within the accepted size and carries no
/// control characters.
///
/// Blank names are not rejected here: a blank press still reaches the
/// arbitration engine, which answers it with its own player-facing message.
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_PLAYER_NAME_CHARS {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!("Player name must be at most {MAX_PLAYER_NAME_CHARS} characters").into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_name_control_chars");
        err.message = Some("Player name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("Alice").is_ok());
        assert!(validate_player_name("Jean-Luc Picard").is_ok());
        assert!(validate_player_name("").is_ok()); // handled by the engine
        assert!(validate_player_name("   ").is_ok()); // handled by the engine
    }

    #[test]
    fn test_validate_player_name_too_long() {
        let name = "x".repeat(MAX_PLAYER_NAME_CHARS + 1);
        assert!(validate_player_name(&name).is_err());
        let name = "x".repeat(MAX_PLAYER_NAME_CHARS);
        assert!(validate_player_name(&name).is_ok());
    }

    #[test]
    fn test_validate_player_name_control_chars() {
        assert!(validate_player_name("Ali\nce").is_err());
        assert!(validate_player_name("Ali\tce").is_err());
        assert!(validate_player_name("\u{7f}").is_err());
    }
}
