//! Gesture parsing for `explore`.
//!
//! One gesture per line:
//!
//! ```text
//! select <id>     pick an application, starting a fresh trail
//! click <id>      click a node in the current graph
//! back <index>    click the breadcrumb at <index> (0 is the first)
//! clear           drop the selection
//! help            print this list
//! quit            stop reading gestures
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::domain::ApplicationId;
use crate::navigator::Command;
use thiserror::Error;

/// Usage text printed by the `help` gesture
pub const GESTURE_HELP: &str = "\
select <id>     pick an application, starting a fresh trail
click <id>      click a node in the current graph
back <index>    click the breadcrumb at <index> (0 is the first)
clear           drop the selection
help            print this list
quit            stop reading gestures";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Forward to the navigator
    Command(Command),
    /// Print the gesture list
    Help,
    /// Stop reading input
    Quit,
}

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// First word is not a known gesture
    #[error("Unknown gesture '{0}' (try 'help')")]
    Unknown(String),

    /// Gesture needs an argument that was not given
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    /// Extra words after the gesture
    #[error("Unexpected input after '{0}'")]
    TrailingInput(&'static str),

    /// Breadcrumb index is not a number
    #[error("Invalid breadcrumb index '{0}'")]
    InvalidIndex(String),
}

/// Parse one input line. Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns a [`GestureError`] describing what is wrong with the line.
pub fn parse_gesture(line: &str) -> Result<Option<Gesture>, GestureError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let rest = words.next();

    let gesture = match verb.to_ascii_lowercase().as_str() {
        "select" => Gesture::Command(Command::Select(single_arg("select", arg, rest)?.into())),
        "click" => Gesture::Command(Command::ClickNode(ApplicationId::new(single_arg(
            "click", arg, rest,
        )?))),
        "back" => {
            let raw = single_arg("back", arg, rest)?;
            let index = raw
                .parse::<usize>()
                .map_err(|_| GestureError::InvalidIndex(raw.to_string()))?;
            Gesture::Command(Command::ClickBreadcrumb(index))
        }
        "clear" => no_arg("clear", arg, Gesture::Command(Command::Clear))?,
        "help" | "?" => no_arg("help", arg, Gesture::Help)?,
        "quit" | "exit" => no_arg("quit", arg, Gesture::Quit)?,
        _ => return Err(GestureError::Unknown(verb.to_string())),
    };
    Ok(Some(gesture))
}

fn single_arg<'a>(
    verb: &'static str,
    arg: Option<&'a str>,
    rest: Option<&str>,
) -> Result<&'a str, GestureError> {
    match (arg, rest) {
        (None, _) => Err(GestureError::MissingArgument(verb)),
        (Some(_), Some(_)) => Err(GestureError::TrailingInput(verb)),
        (Some(arg), None) => Ok(arg),
    }
}

fn no_arg(verb: &'static str, arg: Option<&str>, gesture: Gesture) -> Result<Gesture, GestureError> {
    match arg {
        Some(_) => Err(GestureError::TrailingInput(verb)),
        None => Ok(gesture),
    }
}
