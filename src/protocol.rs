//! Command interpreter for the datagram control protocol
//!
//! One command per datagram, line-oriented ASCII:
//!
//! | Payload            | Command                 |
//! |--------------------|-------------------------|
//! | `delay <ms>`       | [`Command::SetDelay`]   |
//! | `min <0-255>`      | [`Command::SetMinVolume`] |
//! | `max <0-255>`      | [`Command::SetMaxVolume`] |
//! | `abort`            | [`Command::Abort`]      |
//! | `play` / `pause`   | [`Command::Play`] / [`Command::Pause`] |
//! | `song <name>`      | [`Command::PlaySound`]  |
//! | `<name>`           | [`Command::PlaySound`] (legacy bare form) |
//!
//! Parsing never has side effects; a rejection is returned as a
//! [`ParseError`] for the caller to log and discard.

use std::time::Duration;

use crate::constants::MAX_BLOCK_DELAY_MS;
use crate::error::ParseError;

/// Reserved keywords. Anything else in the first position makes the whole
/// payload a legacy bare sound name.
pub const KEYWORDS: [&str; 7] = ["delay", "min", "max", "abort", "play", "pause", "song"];

/// A parsed control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change the per-source debounce window
    SetDelay(Duration),
    /// Change the ducked external player volume
    SetMinVolume(u8),
    /// Change the restored external player volume
    SetMaxVolume(u8),
    /// Stop the server
    Abort,
    /// Resume the external player
    Play,
    /// Pause the external player
    Pause,
    /// Play a sound from the catalog
    PlaySound(String),
}

impl Command {
    /// Parse a raw datagram payload
    pub fn from_bytes(payload: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidEncoding)?;
        parse(text)
    }
}

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a command line.
///
/// The keyword is everything up to the first whitespace run; the remainder
/// is the rest with that whitespace removed.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (keyword, remainder) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (line, ""),
    };

    match keyword {
        "delay" => parse_delay(remainder).map(Command::SetDelay),
        "min" => parse_volume(remainder).map(Command::SetMinVolume),
        "max" => parse_volume(remainder).map(Command::SetMaxVolume),
        "abort" => no_arguments("abort", remainder, Command::Abort),
        "play" => no_arguments("play", remainder, Command::Play),
        "pause" => no_arguments("pause", remainder, Command::Pause),
        "song" => {
            if remainder.is_empty() {
                Err(ParseError::MissingSoundName)
            } else {
                Ok(Command::PlaySound(remainder.to_string()))
            }
        }
        // Older clients send bare sound names. The whole payload is the name.
        _ => Ok(Command::PlaySound(line.to_string())),
    }
}

fn parse_delay(arg: &str) -> Result<Duration, ParseError> {
    // Unsigned parse: "-5" is rejected, never clamped
    match arg.parse::<u64>() {
        Ok(ms) if ms <= MAX_BLOCK_DELAY_MS => Ok(Duration::from_millis(ms)),
        _ => Err(ParseError::IllegalDelay(arg.to_string())),
    }
}

fn parse_volume(arg: &str) -> Result<u8, ParseError> {
    arg.parse::<u8>()
        .map_err(|_| ParseError::IllegalVolume(arg.to_string()))
}

fn no_arguments(
    keyword: &'static str,
    remainder: &str,
    command: Command,
) -> Result<Command, ParseError> {
    if remainder.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnexpectedArgument {
            keyword,
            argument: remainder.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_song_and_bare_name_agree() {
        assert_eq!(parse("song foo"), Ok(Command::PlaySound("foo".into())));
        assert_eq!(parse("foo"), Ok(Command::PlaySound("foo".into())));
    }

    #[test]
    fn test_bare_fallback_keeps_whole_payload() {
        assert_eq!(
            parse("airhorn extra loud"),
            Ok(Command::PlaySound("airhorn extra loud".into()))
        );
        assert_eq!(
            parse("song airhorn extra loud"),
            Ok(Command::PlaySound("airhorn extra loud".into()))
        );
    }

    #[test]
    fn test_delay() {
        assert_eq!(parse("delay 500"), Ok(Command::SetDelay(Duration::from_millis(500))));
        assert_eq!(parse("delay 0"), Ok(Command::SetDelay(Duration::ZERO)));
        assert_eq!(parse("delay  \t250"), Ok(Command::SetDelay(Duration::from_millis(250))));
    }

    #[test]
    fn test_illegal_delay() {
        assert_eq!(parse("delay -5"), Err(ParseError::IllegalDelay("-5".into())));
        assert_eq!(parse("delay abc"), Err(ParseError::IllegalDelay("abc".into())));
        assert_eq!(parse("delay"), Err(ParseError::IllegalDelay(String::new())));
        assert_eq!(parse("delay 1.5"), Err(ParseError::IllegalDelay("1.5".into())));
        assert_eq!(
            parse("delay 9223372036854775808"),
            Err(ParseError::IllegalDelay("9223372036854775808".into()))
        );
        assert_eq!(
            parse("delay 9223372036854775807"),
            Ok(Command::SetDelay(Duration::from_millis(MAX_BLOCK_DELAY_MS)))
        );
    }

    #[test]
    fn test_volume() {
        assert_eq!(parse("min 10"), Ok(Command::SetMinVolume(10)));
        assert_eq!(parse("max 255"), Ok(Command::SetMaxVolume(255)));
        assert_eq!(parse("max 256"), Err(ParseError::IllegalVolume("256".into())));
        assert_eq!(parse("min -1"), Err(ParseError::IllegalVolume("-1".into())));
    }

    #[test]
    fn test_argument_free_keywords() {
        assert_eq!(parse("abort"), Ok(Command::Abort));
        assert_eq!(parse("play"), Ok(Command::Play));
        assert_eq!(parse("pause"), Ok(Command::Pause));
        assert!(matches!(
            parse("pause now"),
            Err(ParseError::UnexpectedArgument { keyword: "pause", .. })
        ));
    }

    #[test]
    fn test_line_terminators_and_empty() {
        assert_eq!(parse("abort\r\n"), Ok(Command::Abort));
        assert_eq!(parse("alarm\n"), Ok(Command::PlaySound("alarm".into())));
        assert_eq!(parse("  \n"), Err(ParseError::Empty));
        assert_eq!(parse("song"), Err(ParseError::MissingSoundName));
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(Command::from_bytes(b"song alarm"), Ok(Command::PlaySound("alarm".into())));
        assert_eq!(Command::from_bytes(&[0xff, 0xfe]), Err(ParseError::InvalidEncoding));
    }

    proptest! {
        #[test]
        fn prop_never_panics(s in "\\PC*") {
            let _ = parse(&s);
        }

        #[test]
        fn prop_unreserved_name_is_bare_sound(name in "[a-z][a-z0-9_]{0,15}") {
            prop_assume!(!KEYWORDS.contains(&name.as_str()));
            prop_assert_eq!(parse(&name), Ok(Command::PlaySound(name.clone())));
            let song = format!("song {}", name);
            prop_assert_eq!(parse(&song), Ok(Command::PlaySound(name)));
        }

        #[test]
        fn prop_delay_round_trips(ms in 0..=MAX_BLOCK_DELAY_MS) {
            let line = format!("delay {}", ms);
            prop_assert_eq!(parse(&line), Ok(Command::SetDelay(Duration::from_millis(ms))));
        }
    }
}
