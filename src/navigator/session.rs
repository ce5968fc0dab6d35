//! Text-driven event loop delivering clicks to a navigator.

use crate::error::{InspectError, Result};
use crate::navigator::{ClickOutcome, DisplaySurface, HierarchyNavigator, ViewId};
use log::{debug, warn};
use std::io::{BufRead, Write};
use std::str::FromStr;

/// One command of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Click pixel `(x, y)` of a view's weight image.
    Click {
        /// Target view.
        view: ViewId,
        /// Horizontal pixel coordinate.
        x: f64,
        /// Vertical pixel coordinate.
        y: f64,
    },
    /// Close a view.
    Close(ViewId),
    /// List open views.
    List,
    /// Show the command summary.
    Help,
    /// End the session.
    Quit,
}

const HELP: &str = "commands:
  click <view> <x> <y>   open the child map under pixel (x, y)
  close <view>           dismiss a view
  list                   show open views
  quit                   end the session";

fn parse_view(token: Option<&str>) -> Result<ViewId> {
    let token = token.ok_or_else(|| InspectError::Config("missing view id".to_string()))?;
    token
        .parse()
        .map_err(|_| InspectError::Config(format!("bad view id {:?}", token)))
}

fn parse_coord(token: Option<&str>, name: &str) -> Result<f64> {
    let token = token.ok_or_else(|| InspectError::Config(format!("missing {}", name)))?;
    token
        .parse()
        .map_err(|_| InspectError::Config(format!("bad {} {:?}", name, token)))
}

impl FromStr for Command {
    type Err = InspectError;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| InspectError::Config("empty command".to_string()))?;

        let command = match verb.to_ascii_lowercase().as_str() {
            "click" | "c" => Command::Click {
                view: parse_view(tokens.next())?,
                x: parse_coord(tokens.next(), "x")?,
                y: parse_coord(tokens.next(), "y")?,
            },
            "close" => Command::Close(parse_view(tokens.next())?),
            "list" | "ls" => Command::List,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(InspectError::Config(format!("unknown command {:?}", other))),
        };

        if tokens.next().is_some() {
            return Err(InspectError::Config(format!("trailing arguments in {:?}", line.trim())));
        }
        Ok(command)
    }
}

/// Floors a data coordinate to a pixel index; negative or non-finite
/// coordinates are outside every image.
fn to_pixel(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 {
        Some(v.floor() as usize)
    } else {
        None
    }
}

/// Runs commands from `input` until `quit` or end of input.
///
/// Errors of individual commands (unknown views, unrenderable child maps,
/// typos) are reported on `output` and the session continues. Only I/O
/// failures on `input`/`output` end the session with an error.
pub fn run_session<S, R, W>(
    navigator: &mut HierarchyNavigator<'_, S>,
    input: R,
    output: &mut W,
    prompt: bool,
) -> Result<()>
where
    S: DisplaySurface,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "> ")?;
            output.flush()?;
        }

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                writeln!(output, "{} (try `help`)", e)?;
                continue;
            }
        };
        debug!("command: {:?}", command);

        match command {
            Command::Click { view, x, y } => {
                let outcome = match (to_pixel(x), to_pixel(y)) {
                    (Some(px), Some(py)) => navigator.click(view, px, py),
                    _ if navigator.view(view).is_none() => Err(InspectError::UnknownView(view)),
                    _ => Ok(ClickOutcome::OutsideImage),
                };
                match outcome {
                    Ok(ClickOutcome::Opened(id)) => {
                        let title = navigator.view(id).map(|v| v.title()).unwrap_or_default();
                        writeln!(output, "opened view {}: {}", id, title)?;
                    }
                    Ok(ClickOutcome::Leaf { row, col }) => {
                        writeln!(output, "neuron ({}, {}) is a leaf", row, col)?;
                    }
                    Ok(ClickOutcome::OutsideImage) => {
                        writeln!(output, "click outside view {}", view)?;
                    }
                    Err(e) => writeln!(output, "error: {}", e)?,
                }
            }
            Command::Close(id) => match navigator.close(id) {
                Ok(()) => writeln!(output, "closed view {}", id)?,
                Err(e) => writeln!(output, "error: {}", e)?,
            },
            Command::List => {
                for view in navigator.views() {
                    let (rows, cols) = view.map().shape();
                    writeln!(output, "{:>4}  {}  [{}x{}]", view.id(), view.title(), rows, cols)?;
                }
            }
            Command::Help => writeln!(output, "{}", HELP)?,
            Command::Quit => break,
        }
    }
    Ok(())
}
