//! Runner settings from YAML and the per-run pipeline configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Sarek entry point
pub const DEFAULT_PIPELINE: &str = "SciLifeLab/Sarek/main.nf";

/// Default Sarek annotation entry point
pub const DEFAULT_ANNOTATE_PIPELINE: &str = "SciLifeLab/Sarek/annotate.nf";

/// Settings loaded from an optional YAML file
///
/// Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Nextflow executable
    pub nextflow: String,

    /// Singularity executable
    pub singularity: String,

    /// Pipeline script run by the mapping stage
    pub pipeline: String,

    /// Pipeline script run by the annotation stage
    pub annotate_pipeline: String,

    /// Values for the `--tools` flag
    pub tools: Vec<String>,

    /// Directory the engine writes results to
    pub outdir: PathBuf,

    /// Per-stage timeout in seconds (unset = wait indefinitely)
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nextflow: "nextflow".to_string(),
            singularity: "singularity".to_string(),
            pipeline: DEFAULT_PIPELINE.to_string(),
            annotate_pipeline: DEFAULT_ANNOTATE_PIPELINE.to_string(),
            tools: Vec::new(),
            outdir: PathBuf::from("results"),
            timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from a file, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map
        let settings: Settings = if yaml.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(yaml).context("Invalid settings YAML")?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.nextflow.trim().is_empty() {
            anyhow::bail!("'nextflow' executable must not be empty");
        }
        if self.singularity.trim().is_empty() {
            anyhow::bail!("'singularity' executable must not be empty");
        }
        if self.pipeline.trim().is_empty() {
            anyhow::bail!("'pipeline' script must not be empty");
        }
        if self.annotate_pipeline.trim().is_empty() {
            anyhow::bail!("'annotate_pipeline' script must not be empty");
        }
        if self.outdir.as_os_str().is_empty() {
            anyhow::bail!("'outdir' must not be empty");
        }

        for tool in &self.tools {
            if tool.is_empty() || tool.contains(',') || tool.contains(char::is_whitespace) {
                anyhow::bail!("Invalid tool name: '{}'", tool);
            }
        }

        if self.timeout_secs == Some(0) {
            anyhow::bail!("'timeout_secs' must be greater than zero");
        }

        Ok(())
    }
}

/// Parse a comma-separated tools list from the command line
pub fn parse_tools(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration owned by one pipeline runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    input_sheet_path: PathBuf,
    mapped_files_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input_sheet_path: impl Into<PathBuf>) -> Self {
        Self {
            input_sheet_path: input_sheet_path.into(),
            mapped_files_path: None,
        }
    }

    /// Sample manifest fed to the engine
    pub fn input_sheet_path(&self) -> &Path {
        &self.input_sheet_path
    }

    /// Mapping output, set once mapping has succeeded
    pub fn mapped_files_path(&self) -> Option<&Path> {
        self.mapped_files_path.as_deref()
    }

    /// Record the mapping output. There is no way to unset it again.
    pub(crate) fn record_mapped_files(&mut self, path: PathBuf) {
        self.mapped_files_path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pipeline, DEFAULT_PIPELINE);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
nextflow: /opt/nextflow/bin/nextflow
tools: [HaplotypeCaller, Strelka]
outdir: /data/run1
timeout_secs: 3600
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.nextflow, "/opt/nextflow/bin/nextflow");
        assert_eq!(settings.tools, vec!["HaplotypeCaller", "Strelka"]);
        assert_eq!(settings.outdir, PathBuf::from("/data/run1"));
        assert_eq!(settings.timeout_secs, Some(3600));
        assert_eq!(settings.singularity, "singularity");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Settings::from_yaml("pipelin: typo.nf").is_err());
    }

    #[test]
    fn test_invalid_tool_name_rejected() {
        let result = Settings::from_yaml("tools: ['HaplotypeCaller,Strelka']");
        assert!(result.unwrap_err().to_string().contains("Invalid tool name"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Settings::from_yaml("timeout_secs: 0").is_err());
    }

    #[test]
    fn test_empty_executable_rejected() {
        assert!(Settings::from_yaml("nextflow: ''").is_err());
    }

    #[test]
    fn test_parse_tools() {
        assert_eq!(parse_tools("MuTect2, Strelka,,"), vec!["MuTect2", "Strelka"]);
        assert!(parse_tools("").is_empty());
    }

    #[test]
    fn test_new_config_has_no_mapped_files() {
        let config = PipelineConfig::new("samples.tsv");
        assert_eq!(config.input_sheet_path(), Path::new("samples.tsv"));
        assert!(config.mapped_files_path().is_none());
    }
}
