// Command surface for the interactive binary. No widgets here - vidslice
// talks through a plain command line, the shape of the commands is what
// matters.

/// Everything the user can ask for, parsed from a line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    SetRegion { start: f64, end: f64 },
    ToggleLoop,
    TogglePlayPause,
    Seek(f64),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  load <url-or-id>     load a media item from the library
  region <start> <end> set the loop region (seconds)
  loop                 toggle loop enforcement
  play                 toggle play/pause
  seek <seconds>       jump to a position
  status               show player state
  help                 this text
  quit                 leave";

/// Parse one input line. Errors are user-facing strings, not a taxonomy -
/// a typo is not a system condition.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command, try 'help'".to_string());
    };

    match verb {
        "load" | "l" => {
            let target = parts.next().ok_or("usage: load <url-or-id>")?;
            Ok(Command::Load(target.to_string()))
        }
        "region" | "r" => {
            let start = parse_seconds(parts.next(), "usage: region <start> <end>")?;
            let end = parse_seconds(parts.next(), "usage: region <start> <end>")?;
            Ok(Command::SetRegion { start, end })
        }
        "loop" => Ok(Command::ToggleLoop),
        "play" | "pause" | "p" => Ok(Command::TogglePlayPause),
        "seek" | "s" => {
            let position = parse_seconds(parts.next(), "usage: seek <seconds>")?;
            Ok(Command::Seek(position))
        }
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_seconds(part: Option<&str>, usage: &str) -> Result<f64, String> {
    let raw = part.ok_or_else(|| usage.to_string())?;
    raw.parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))
}

/// Format a position as M:SS (or H:MM:SS past the hour mark).
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Duration display that tolerates the not-yet-known window.
pub fn format_duration(duration: Option<f64>) -> String {
    match duration {
        Some(d) => format_time(d),
        None => "--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(
            parse_command("load dQw4w9WgXcQ"),
            Ok(Command::Load("dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(
            parse_command("region 5 10.5"),
            Ok(Command::SetRegion {
                start: 5.0,
                end: 10.5
            })
        );
        assert_eq!(parse_command("loop"), Ok(Command::ToggleLoop));
        assert_eq!(parse_command("play"), Ok(Command::TogglePlayPause));
        assert_eq!(parse_command("seek 42"), Ok(Command::Seek(42.0)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("region 5").is_err());
        assert!(parse_command("region five ten").is_err());
        assert!(parse_command("seek").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(3661.0), "1:01:01");
        // never show a negative position
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn test_format_duration_unknown() {
        assert_eq!(format_duration(None), "--:--");
        assert_eq!(format_duration(Some(120.0)), "2:00");
    }
}
