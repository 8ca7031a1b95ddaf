// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Prompt extraction from embedded image metadata
//!
//! The default implementation shells out to ExifTool, which prints the
//! generation-data tag as a JSON object. Failures are returned to the
//! caller, which records them and treats the file as having no prompt.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::{OrgError, Result};

/// Source of the text field used for matching and word counting
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Name of this extractor
    fn name(&self) -> &'static str;

    /// Fetch the prompt for a file.
    ///
    /// `Ok(None)` means the file carries no prompt (or vanished). `Err` means
    /// the metadata could not be read at all.
    async fn fetch(&self, path: &Path) -> Result<Option<String>>;
}

/// Extractor backed by the external `exiftool` executable
pub struct ExifToolExtractor {
    program: String,
    tag: String,
    field: String,
    timeout: Duration,
}

impl ExifToolExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            program: config.program.clone(),
            tag: config.tag.clone(),
            field: config.field.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Run the tool and return its raw stdout
    async fn run_tool(&self, path: &Path) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .args(["-s3", "-u"])
            .arg(format!("-{}", self.tag))
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                OrgError::Extraction(format!("{} timed out after {:?}", self.program, self.timeout))
            })?
            .map_err(|e| OrgError::Extraction(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OrgError::Extraction(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MetadataExtractor for ExifToolExtractor {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    async fn fetch(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            debug!("File vanished before extraction: {:?}", path);
            return Ok(None);
        }

        let stdout = self.run_tool(path).await?;
        parse_prompt_field(&String::from_utf8_lossy(&stdout), &self.field)
    }
}

/// Pull a string field out of the tool's JSON output.
///
/// Blank output means the tag is absent and is not an error. A missing or
/// non-string field also yields `None`.
pub fn parse_prompt_field(raw: &str, field: &str) -> Result<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let json: serde_json::Value = serde_json::from_str(raw)?;
    Ok(json
        .get(field)
        .and_then(|v| v.as_str())
        .map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_field() {
        let raw = r#"{"prompt": "a cat on a sofa", "seed": 42}"#;
        assert_eq!(
            parse_prompt_field(raw, "prompt").unwrap().as_deref(),
            Some("a cat on a sofa")
        );
    }

    #[test]
    fn test_parse_blank_output_is_absent() {
        assert_eq!(parse_prompt_field("", "prompt").unwrap(), None);
        assert_eq!(parse_prompt_field("  \n", "prompt").unwrap(), None);
    }

    #[test]
    fn test_parse_missing_or_non_string_field() {
        assert_eq!(parse_prompt_field(r#"{"seed": 1}"#, "prompt").unwrap(), None);
        assert_eq!(parse_prompt_field(r#"{"prompt": 7}"#, "prompt").unwrap(), None);
        assert_eq!(parse_prompt_field("[1, 2]", "prompt").unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_output_is_error() {
        let err = parse_prompt_field("Warning: [minor] bad tag", "prompt").unwrap_err();
        assert!(matches!(err, OrgError::Json(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_missing_program_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"png").unwrap();

        let extractor = ExifToolExtractor::new(&ExtractorConfig {
            program: "orgpng-no-such-tool".to_string(),
            ..ExtractorConfig::default()
        });
        let err = extractor.fetch(&file).await.unwrap_err();
        assert!(matches!(err, OrgError::Extraction(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_vanished_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = ExifToolExtractor::new(&ExtractorConfig::default());
        assert_eq!(extractor.fetch(&dir.path().join("gone.png")).await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_tool_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"png").unwrap();

        let script = dir.path().join("slow-tool");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = ExifToolExtractor {
            program: script.to_string_lossy().into_owned(),
            tag: "Generation_data".to_string(),
            field: "prompt".to_string(),
            timeout: Duration::from_millis(100),
        };
        let err = extractor.run_tool(&file).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_output_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"png").unwrap();

        let script = dir.path().join("fake-exiftool");
        std::fs::write(&script, "#!/bin/sh\necho '{\"prompt\": \"misty forest\"}'\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = ExifToolExtractor::new(&ExtractorConfig {
            program: script.to_string_lossy().into_owned(),
            ..ExtractorConfig::default()
        });
        assert_eq!(
            extractor.fetch(&file).await.unwrap().as_deref(),
            Some("misty forest")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unparseable_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"png").unwrap();

        let script = dir.path().join("chatty-exiftool");
        std::fs::write(&script, "#!/bin/sh\necho 'Warning: not json'\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = ExifToolExtractor::new(&ExtractorConfig {
            program: script.to_string_lossy().into_owned(),
            ..ExtractorConfig::default()
        });
        let err = extractor.fetch(&file).await.unwrap_err();
        assert!(matches!(err, OrgError::Json(_)));
    }
}
