//! Tokenizer and coordinate evaluator for the path mini-language.

use crate::errors::ProbeError;

/// One tokenized path command: a single-letter code plus the exact argument
/// substrings it consumed. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathCommand {
    pub command: char,
    pub args: Vec<String>,
}

/// Absolute coordinate in the icon's local plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Fixed argument count per command code. Curve commands are accepted here
/// so their arguments are skipped correctly; the evaluator does not
/// implement their math.
fn arg_count(command: char) -> Result<usize, ProbeError> {
    match command {
        'L' | 'l' | 'M' | 'm' | 'T' | 't' => Ok(2),
        'H' | 'h' | 'V' | 'v' => Ok(1),
        'C' | 'c' => Ok(6),
        'Q' | 'q' | 'S' | 's' => Ok(4),
        'A' | 'a' => Ok(7),
        'Z' | 'z' => Ok(0),
        other => Err(ProbeError::UnsupportedCommand(other)),
    }
}

/// Leading numeric token: optionally signed, optionally fractional, no
/// exponent forms.
fn number_token(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    let mut idx = 0;
    if bytes.first() == Some(&b'-') {
        idx = 1;
    }
    let int_start = idx;
    while bytes.get(idx).is_some_and(|b| b.is_ascii_digit()) {
        idx += 1;
    }
    if bytes.get(idx) == Some(&b'.') {
        let frac_start = idx + 1;
        let mut end = frac_start;
        while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
            end += 1;
        }
        if end == frac_start {
            return None;
        }
        return Some(&input[..end]);
    }
    if idx == int_start {
        return None;
    }
    Some(&input[..idx])
}

/// Tokenize path data into commands. A bare argument group with no leading
/// letter repeats the previous command code (the grammar's implicit-repeat
/// rule).
pub fn tokenize(data: &str) -> Result<Vec<PathCommand>, ProbeError> {
    let mut rest = data;
    let mut current: Option<char> = None;
    let mut commands = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let head = rest.chars().next().unwrap_or_default();
        let explicit = head.is_ascii_alphabetic();
        if explicit {
            current = Some(head);
            rest = &rest[head.len_utf8()..];
        }
        let command = current.ok_or_else(|| ProbeError::near(rest))?;
        let wanted = arg_count(command)?;
        // A zero-argument command cannot repeat implicitly: the repeat rule
        // would consume no input and never terminate.
        if !explicit && wanted == 0 {
            return Err(ProbeError::near(rest));
        }
        let mut args = Vec::with_capacity(wanted);
        while args.len() < wanted {
            rest = rest.trim_start();
            let token = number_token(rest).ok_or_else(|| ProbeError::near(rest))?;
            args.push(token.to_string());
            rest = &rest[token.len()..];
        }
        commands.push(PathCommand { command, args });
    }

    Ok(commands)
}

fn parse_float(token: &str) -> Result<f64, ProbeError> {
    token.parse::<f64>().map_err(|_| ProbeError::Parse {
        near: token.to_string(),
    })
}

/// Evaluate tokenized commands against a running cursor and a remembered
/// subpath start, yielding one absolute point per evaluated command in
/// command order. Curve commands contribute no point; callers tolerate the
/// gap.
pub fn absolute_points(commands: &[PathCommand]) -> Result<Vec<Point>, ProbeError> {
    let mut points = Vec::with_capacity(commands.len());
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let (mut start_x, mut start_y) = (0.0_f64, 0.0_f64);

    for cmd in commands {
        let arg = |idx: usize| parse_float(&cmd.args[idx]);
        match cmd.command {
            'h' => x += arg(0)?,
            'H' => x = arg(0)?,
            'v' => y += arg(0)?,
            'V' => y = arg(0)?,
            'l' => {
                x += arg(0)?;
                y += arg(1)?;
            }
            'L' => {
                x = arg(0)?;
                y = arg(1)?;
            }
            'm' => {
                x += arg(0)?;
                y += arg(1)?;
                start_x = x;
                start_y = y;
            }
            'M' => {
                x = arg(0)?;
                y = arg(1)?;
                start_x = x;
                start_y = y;
            }
            'z' | 'Z' => {
                x = start_x;
                y = start_y;
            }
            'c' | 'C' | 'q' | 'Q' | 's' | 'S' | 't' | 'T' | 'a' | 'A' => continue,
            other => return Err(ProbeError::UnsupportedCommand(other)),
        }
        points.push(Point { x, y });
    }

    Ok(points)
}

/// Tokenize and evaluate in one step.
pub fn absolute_coordinates(data: &str) -> Result<Vec<Point>, ProbeError> {
    absolute_points(&tokenize(data)?)
}
