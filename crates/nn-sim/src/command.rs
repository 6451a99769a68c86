//! Console commands.

/// Commands that can be sent from the input thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Spawn(usize),
    Despawn(usize),
    Stats,
    Quit,
    Help,
    Invalid(String),
}

impl Command {
    /// Parse one input line. `None` for blank lines.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let count = words.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "s" | "spawn" => parse_count(count).map_or_else(
                || Self::Invalid(line.trim().to_owned()),
                Self::Spawn,
            ),
            "d" | "despawn" => parse_count(count).map_or_else(
                || Self::Invalid(line.trim().to_owned()),
                Self::Despawn,
            ),
            "stats" => Self::Stats,
            "q" | "quit" => Self::Quit,
            "h" | "help" => Self::Help,
            _ => Self::Invalid(line.trim().to_owned()),
        };
        Some(command)
    }
}

/// A missing count means one.
fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.map_or(Some(1), |raw| raw.parse().ok())
}
