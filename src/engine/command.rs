//! Command lines handed to the workflow engine

use std::fmt;

/// A fully built engine invocation: executable plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    /// Engine executable (e.g., "nextflow", "/opt/bin/nextflow")
    pub program: String,

    /// Arguments in order
    pub args: Vec<String>,
}

impl EngineCommand {
    /// Start a `<program> run <script>` invocation
    pub fn run(program: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["run".to_string(), script.into()],
        }
    }

    /// Append the tools selection flag
    ///
    /// The flag is always present. Configured tools follow it as a single
    /// comma-joined value; with no tools configured the flag stays bare.
    pub fn with_tools(mut self, tools: &[String]) -> Self {
        self.args.push("--tools".to_string());
        if !tools.is_empty() {
            self.args.push(tools.join(","));
        }
        self
    }

    /// Append a `--flag value` pair
    pub fn with_option(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(format!("--{}", flag));
        self.args.push(value.into());
        self
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
