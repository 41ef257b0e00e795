//! Resolving how to launch a tool server.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Interpreters used for script-based servers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Interpreters {
    pub python: String,
    pub node: String,
}

impl Default for Interpreters {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            node: "node".to_string(),
        }
    }
}

/// A program plus arguments that starts an MCP server on stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ServerCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the launch command for a server path.
    ///
    /// `.py` scripts run under the Python interpreter and `.js` scripts under
    /// Node; anything else is executed directly. `extra_args` follow the
    /// script path.
    pub fn for_server(path: &Path, interpreters: &Interpreters, extra_args: &[String]) -> Self {
        let script = path.to_string_lossy().into_owned();
        let interpreter = match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Some(&interpreters.python),
            Some("js") => Some(&interpreters.node),
            _ => None,
        };

        match interpreter {
            Some(interpreter) => Self::new(
                interpreter.clone(),
                std::iter::once(script).chain(extra_args.iter().cloned()),
            ),
            None => Self::new(script, extra_args.iter().cloned()),
        }
    }
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
