use std::fmt;

/// Outcome of one statement as written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Successful result text: `OK` or a header-plus-rows block.
    Output(String),
    /// Failure rendered as a single error line; never fatal to the session.
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Output(text) => write!(f, "{text}"),
            Reply::Error(description) => write!(f, "ERROR:{description}"),
        }
    }
}
