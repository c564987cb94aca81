use crate::error::FtpError;

/// A parsed protocol command, shared by the server's dispatch loop and the
/// client's prompt (the CLI strings are exactly the wire strings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls,
    Get(String),
    Put(String),
    Quit,
}

impl Command {
    /// Parses command text. `ls` and `quit` take no argument; `get`/`put`
    /// take exactly one filename.
    pub fn parse(text: &str) -> Result<Self, FtpError> {
        let mut parts = text.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| FtpError::Framing("empty command".to_string()))?;
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(FtpError::Framing(format!(
                "too many arguments: {:?}",
                text
            )));
        }

        match (verb, arg) {
            ("ls", None) => Ok(Command::Ls),
            ("quit", None) => Ok(Command::Quit),
            ("get", Some(name)) => Ok(Command::Get(name.to_string())),
            ("put", Some(name)) => Ok(Command::Put(name.to_string())),
            ("get", None) | ("put", None) => Err(FtpError::Framing(format!(
                "{} requires a filename",
                verb
            ))),
            _ => Err(FtpError::Framing(format!("unknown command: {:?}", text))),
        }
    }

    /// Renders the wire text for this command.
    pub fn to_wire(&self) -> String {
        match self {
            Command::Ls => "ls".to_string(),
            Command::Quit => "quit".to_string(),
            Command::Get(name) => format!("get {}", name),
            Command::Put(name) => format!("put {}", name),
        }
    }

    /// Whether this command is accompanied by a data channel.
    pub fn wants_data_channel(&self) -> bool {
        !matches!(self, Command::Quit)
    }
}
