//! Presence probes for external tools

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

/// An external tool the pipeline depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Display name used in diagnostics
    pub name: String,

    /// Executable to probe
    pub program: String,

    /// Argument that makes the executable print its version and exit
    pub version_arg: String,
}

impl Tool {
    pub fn nextflow(program: impl Into<String>) -> Self {
        Self {
            name: "Nextflow".to_string(),
            program: program.into(),
            version_arg: "-version".to_string(),
        }
    }

    pub fn singularity(program: impl Into<String>) -> Self {
        Self {
            name: "Singularity".to_string(),
            program: program.into(),
            version_arg: "--version".to_string(),
        }
    }
}

/// Result of probing a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Present { version: Option<String> },
    Missing,
}

impl ToolStatus {
    pub fn is_present(&self) -> bool {
        matches!(self, ToolStatus::Present { .. })
    }
}

/// Trait for tool detection - allows for different implementations
#[async_trait]
pub trait ToolProbe: Send + Sync {
    async fn probe(&self, tool: &Tool) -> ToolStatus;
}

/// Probe that runs the tool's version command
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

#[async_trait]
impl ToolProbe for CommandProbe {
    async fn probe(&self, tool: &Tool) -> ToolStatus {
        let output = match Command::new(&tool.program)
            .arg(&tool.version_arg)
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!("{} could not be launched: {}", tool.program, e);
                return ToolStatus::Missing;
            }
        };

        if !output.status.success() {
            debug!(
                "{} {} exited with {:?}",
                tool.program, tool.version_arg, output.status.code()
            );
            return ToolStatus::Missing;
        }

        // Nextflow prints its banner on stdout, some singularity builds use stderr
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let version = parse_version(&text);
        debug!("{} found, version {:?}", tool.name, version);
        ToolStatus::Present { version }
    }
}

/// Extract the first dotted version number from tool output
pub fn parse_version(text: &str) -> Option<String> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let regex = VERSION.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+)+").expect("version pattern is valid")
    });
    regex.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nextflow_banner() {
        let banner = "\n      N E X T F L O W\n      version 23.10.1 build 5891\n      created 12-01-2024 22:01 UTC\n";
        assert_eq!(parse_version(banner), Some("23.10.1".to_string()));
    }

    #[test]
    fn test_parse_singularity_version() {
        assert_eq!(
            parse_version("singularity-ce version 3.11.4-jammy"),
            Some("3.11.4".to_string())
        );
    }

    #[test]
    fn test_parse_no_version() {
        assert_eq!(parse_version("command not understood"), None);
    }

    #[tokio::test]
    async fn test_probe_missing_program() {
        let tool = Tool::nextflow("definitely-not-a-real-nextflow");
        assert_eq!(CommandProbe.probe(&tool).await, ToolStatus::Missing);
    }
}
