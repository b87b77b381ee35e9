//! Flat learner scripts
//!
//! One call per line, no control flow: enough to drive the engine from the
//! CLI or a test with the same statements learners type. Real interpreters
//! call the `Engine` command surface directly instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown statement `{text}`")]
    Unknown { line: usize, text: String },
    #[error("line {line}: bad argument `{arg}` to {name}()")]
    BadArgument {
        line: usize,
        name: String,
        arg: String,
    },
}

/// A single script statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement {
    MoveRight(f32),
    MoveLeft(f32),
    Jump,
    Collect,
    /// Seconds. `sleep(ms)` is converted on parse.
    Wait(f32),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    statements: Vec<Statement>,
}

impl Script {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut statements = Vec::new();
        for (i, raw) in source.lines().enumerate() {
            if let Some(statement) = parse_line(i + 1, raw)? {
                statements.push(statement);
            }
        }
        Ok(Self { statements })
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Hint text pasted into the editor starts with "Try:" and is not code
fn is_hint_prefix(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(chars.next(), Some('T' | 't'))
        && chars.next() == Some('r')
        && chars.next() == Some('y')
        && matches!(chars.next(), Some('.' | ':'))
}

fn parse_line(line: usize, raw: &str) -> Result<Option<Statement>, ScriptError> {
    let code = raw.split('#').next().unwrap_or_default().trim();
    if code.is_empty() || is_hint_prefix(code) {
        return Ok(None);
    }

    let unknown = || ScriptError::Unknown {
        line,
        text: code.to_string(),
    };
    let (name, rest) = code.split_once('(').ok_or_else(unknown)?;
    let arg = rest.strip_suffix(')').ok_or_else(unknown)?.trim();
    let name = name.trim();

    let number = |default: Option<f32>| -> Result<f32, ScriptError> {
        if arg.is_empty() {
            if let Some(value) = default {
                return Ok(value);
            }
        }
        arg.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| ScriptError::BadArgument {
                line,
                name: name.to_string(),
                arg: arg.to_string(),
            })
    };
    let no_args = |statement: Statement| {
        if arg.is_empty() {
            Ok(statement)
        } else {
            Err(ScriptError::BadArgument {
                line,
                name: name.to_string(),
                arg: arg.to_string(),
            })
        }
    };

    let statement = match name {
        "move_right" => Statement::MoveRight(number(Some(1.0))?),
        "move_left" => Statement::MoveLeft(number(Some(1.0))?),
        "jump" => no_args(Statement::Jump)?,
        "collect" => no_args(Statement::Collect)?,
        "wait" => Statement::Wait(number(None)?),
        "sleep" => Statement::Wait(number(None)? / 1000.0),
        _ => return Err(unknown()),
    };
    Ok(Some(statement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_statement() {
        let script = Script::parse(
            "move_right(5)\nmove_left()\njump()\ncollect()\nwait(0.5)\nsleep(250)\nmove_right( 2.5 )",
        )
        .unwrap();
        assert_eq!(
            script.statements(),
            &[
                Statement::MoveRight(5.0),
                Statement::MoveLeft(1.0),
                Statement::Jump,
                Statement::Collect,
                Statement::Wait(0.5),
                Statement::Wait(0.25),
                Statement::MoveRight(2.5),
            ]
        );
    }

    #[test]
    fn test_comments_blanks_and_hints_skipped() {
        let script = Script::parse("# header\n\nTry: move_right(20)\ntry. jump()\n  jump()  # go\n").unwrap();
        assert_eq!(script.statements(), &[Statement::Jump]);
    }

    #[test]
    fn test_unknown_statement_reports_line() {
        let err = Script::parse("jump()\nfly(3)").unwrap_err();
        assert_eq!(
            err,
            ScriptError::Unknown {
                line: 2,
                text: "fly(3)".to_string()
            }
        );
        assert!(matches!(Script::parse("move_right 5"), Err(ScriptError::Unknown { line: 1, .. })));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            Script::parse("wait()"),
            Err(ScriptError::BadArgument { line: 1, .. })
        ));
        assert!(matches!(
            Script::parse("move_right(far)"),
            Err(ScriptError::BadArgument { .. })
        ));
        assert!(matches!(Script::parse("jump(2)"), Err(ScriptError::BadArgument { .. })));
        assert!(matches!(Script::parse("wait(-1)"), Err(ScriptError::BadArgument { .. })));
    }
}
