//! Line commands read from stdin while the card is running.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the display language
    Language(String),
    Theme(String),
    /// Fetch both feeds immediately
    Refresh,
    /// Print the current page
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "commands: lang <code> | theme <id> | refresh | show | help | quit";

impl Command {
    /// Parses one input line. `Ok(None)` for a blank line, `Err` with a
    /// message for anything unrecognised.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for {name}"));
        }

        let command = match (name.to_lowercase().as_str(), arg) {
            ("lang" | "language", Some(code)) => Command::Language(code.to_string()),
            ("theme", Some(id)) => Command::Theme(id.to_string()),
            ("refresh", None) => Command::Refresh,
            ("show", None) => Command::Show,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            ("lang" | "language" | "theme", None) => {
                return Err(format!("{name} needs an argument"))
            }
            (_, _) => return Err(format!("unknown command: {}", line.trim())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            Command::parse("lang en"),
            Ok(Some(Command::Language("en".to_string())))
        );
        assert_eq!(
            Command::parse("  THEME light "),
            Ok(Some(Command::Theme("light".to_string())))
        );
        assert_eq!(Command::parse("refresh"), Ok(Some(Command::Refresh)));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("lang").is_err());
        assert!(Command::parse("theme dark light").is_err());
        assert!(Command::parse("show me").is_err());
        assert!(Command::parse("dance").is_err());
    }
}
