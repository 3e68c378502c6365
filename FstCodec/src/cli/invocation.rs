//! Command-line syntax: `fstfile -<cmd>[mod] <path> [arg]`
//!
//! The command letter and an optional modifier letter are written together
//! after a single dash, case-insensitive. A lone archive path shows that
//! archive; no arguments prints short help and `-h` the full help.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Operating mode selected by the command letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Show,
    Unpack,
    Extract,
    List,
    Pack,
    Complex,
}

impl Mode {
    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            's' => Some(Self::Show),
            'u' => Some(Self::Unpack),
            'e' => Some(Self::Extract),
            'l' => Some(Self::List),
            'p' => Some(Self::Pack),
            'c' => Some(Self::Complex),
            _ => None,
        }
    }
}

/// Display settings chosen by the modifier letter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Skip the key press before exit
    pub ignore_pause: bool,
    /// Skip the directory tables
    pub ignore_info: bool,
}

/// A parsed `-<cmd>[mod]` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub mode: Mode,
    pub session: SessionOptions,
    /// Modifier letter that was not recognized (the operation still runs)
    pub invalid_modifier: Option<char>,
}

impl FromStr for CommandSpec {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(body) = s.strip_prefix('-') else {
            return Err(UsageError::new(
                "Invalid command - Can't find the dash character.",
            ));
        };

        let letters: Vec<char> = body.chars().collect();
        let (command, modifier) = match letters.as_slice() {
            [] => return Err(UsageError::new("Invalid command - Missing command letter.")),
            [command] => (*command, None),
            [command, modifier] => (*command, Some(*modifier)),
            _ => {
                return Err(UsageError::new(format!(
                    "Invalid command - '{s}' is too long (expected -<command>[modifier])."
                )));
            }
        };

        let mut session = SessionOptions::default();
        let mut invalid_modifier = None;
        match modifier.map(|m| m.to_ascii_lowercase()) {
            None => {}
            Some('a') => {
                session.ignore_pause = true;
                session.ignore_info = true;
            }
            Some('p') => session.ignore_pause = true,
            Some('i') => session.ignore_info = true,
            Some(_) => invalid_modifier = modifier,
        }

        let mode = Mode::from_letter(command)
            .ok_or_else(|| UsageError::new(format!("Invalid command: {command}")).with(session))?;

        Ok(Self {
            mode,
            session,
            invalid_modifier,
        })
    }
}

/// Operation to run, with its mode-specific argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show,
    Unpack,
    Extract { index: usize },
    List,
    Pack { output: PathBuf },
    Complex,
}

/// A fully validated request to run one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: Action,
    pub session: SessionOptions,
    pub invalid_modifier: Option<char>,
    /// Archive, or list-file for [`Action::Pack`]
    pub input: PathBuf,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    ShortHelp,
    FullHelp,
    Run(Request),
}

impl Invocation {
    /// Parse the raw arguments (without the program name)
    ///
    /// # Errors
    /// Returns a [`UsageError`] for a malformed command, a wrong argument
    /// count or a non-numeric entry index.
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        match args {
            [] => Ok(Self::ShortHelp),
            [single] if single.eq_ignore_ascii_case("-h") => Ok(Self::FullHelp),
            [single] if single.starts_with('-') => Err(UsageError::new(format!(
                "Unknown single parameter: {single}"
            ))),
            [path] => Ok(Self::Run(Request {
                action: Action::Show,
                session: SessionOptions::default(),
                invalid_modifier: None,
                input: PathBuf::from(path),
            })),
            [command, input, rest @ ..] if rest.len() <= 1 => {
                let spec: CommandSpec = command.parse()?;
                let wrong_count = || {
                    UsageError::new(format!("Wrong number of arguments. Argc: {}", args.len() + 1))
                        .with(spec.session)
                };

                let action = match (spec.mode, rest.first()) {
                    (Mode::Extract, Some(value)) => {
                        let index = value.trim().parse::<usize>().map_err(|_| {
                            UsageError::new(format!("Entry number '{value}' is not a number."))
                                .with(spec.session)
                        })?;
                        Action::Extract { index }
                    }
                    (Mode::Pack, Some(output)) => Action::Pack {
                        output: PathBuf::from(output),
                    },
                    (Mode::Extract | Mode::Pack, None) | (_, Some(_)) => return Err(wrong_count()),
                    (Mode::Show, None) => Action::Show,
                    (Mode::Unpack, None) => Action::Unpack,
                    (Mode::List, None) => Action::List,
                    (Mode::Complex, None) => Action::Complex,
                };

                Ok(Self::Run(Request {
                    action,
                    session: spec.session,
                    invalid_modifier: spec.invalid_modifier,
                    input: PathBuf::from(input),
                }))
            }
            _ => Err(UsageError::new(format!(
                "Wrong number of arguments. Argc: {}",
                args.len() + 1
            ))),
        }
    }
}

/// Malformed command line (result code 2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub message: String,
    /// Display settings parsed before the error, if any
    pub session: SessionOptions,
}

impl UsageError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session: SessionOptions::default(),
        }
    }

    fn with(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error. {}", self.message)
    }
}

impl std::error::Error for UsageError {}
