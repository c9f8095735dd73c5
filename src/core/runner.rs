use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::config::RunConfig;
use crate::core::artifacts;
use crate::core::planner::{InputSource, ToolInvocationSpec};
use crate::core::surface;
use crate::error::PipelineError;
use crate::utils;

/// Verifies a set of required binaries up front, before any child process is
/// spawned or network activity happens.
pub fn require_tools(tool_names: &[&str]) -> Result<(), PipelineError> {
    for name in tool_names {
        locate(name)?;
    }
    Ok(())
}

fn locate(tool: &str) -> Result<PathBuf, PipelineError> {
    utils::locate_tool(tool).ok_or_else(|| PipelineError::DependencyMissing {
        tool: tool.to_string(),
    })
}

/// Runs one planned tool invocation to completion: resolves the binary
/// lazily, feeds the spec's input source to the child's stdin, collects
/// stdout as trimmed non-empty lines and appends stderr to
/// `<logDir>/<tool>.stderr.log`. Blocks until the child exits; no partial
/// results are streamed.
pub async fn execute(spec: &ToolInvocationSpec, config: &RunConfig) -> anyhow::Result<Vec<String>> {
    let binary = locate(spec.tool)?;
    let input_lines = resolve_input_lines(&spec.input, config)?;

    debug!("spawning {}", spec.render());

    let stderr_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_dir.join(format!("{}.stderr.log", spec.tool)))
        .with_context(|| format!("failed to open stderr log for {}", spec.tool))?;

    let mut child = Command::new(&binary)
        .args(&spec.args)
        .stdin(if input_lines.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::from(stderr_log))
        .spawn()
        .with_context(|| format!("failed to start {}", spec.tool))?;

    if let Some(lines) = input_lines {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to open stdin of {}", spec.tool))?;
        // Writer runs on its own task so a chatty child can't deadlock us.
        tokio::spawn(async move {
            for line in lines {
                if stdin.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if stdin.write_all(b"\n").await.is_err() {
                    break;
                }
            }
            // stdin drops here, closing the pipe.
        });
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("failed to capture stdout of {}", spec.tool))?;
    let reader = BufReader::new(stdout);
    let mut lines = reader.lines();
    let mut collected = Vec::new();

    while let Ok(Some(raw_line)) = lines.next_line().await {
        let line = raw_line.trim();
        if !line.is_empty() {
            collected.push(line.to_string());
        }
    }

    let status = child.wait().await?;
    debug!("{} exited with {} ({} line(s) captured)", spec.tool, status, collected.len());

    Ok(collected)
}

fn resolve_input_lines(
    input: &InputSource,
    config: &RunConfig,
) -> anyhow::Result<Option<Vec<String>>> {
    let lines = match input {
        InputSource::None => return Ok(None),
        InputSource::File(path) => utils::read_lines(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        InputSource::ArtifactUrls(artifact) => {
            artifacts::read_lines(&config.output_dir, *artifact)
                .iter()
                .map(|l| artifacts::url_column(l).to_string())
                .filter(|l| !l.is_empty())
                .collect()
        }
        InputSource::ArtifactHosts(artifact) => {
            surface::derive_hosts(&artifacts::read_lines(&config.output_dir, *artifact))
        }
    };
    Ok(Some(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, EnvSnapshot};
    use crate::core::artifacts::Artifact;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> RunConfig {
        let env = EnvSnapshot {
            project_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..EnvSnapshot::default()
        };
        let cli = CliOverrides {
            single: true,
            ..CliOverrides::default()
        };
        RunConfig::resolve(&env, &cli).unwrap()
    }

    #[test]
    fn missing_binary_is_a_dependency_error() {
        let err = require_tools(&["harrier-test-no-such-binary-a8f3"]).unwrap_err();
        assert!(matches!(err, PipelineError::DependencyMissing { .. }));
    }

    #[tokio::test]
    async fn execute_refuses_to_spawn_an_absent_tool() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let spec = ToolInvocationSpec {
            tool: "harrier-test-no-such-binary-a8f3",
            args: vec![],
            input: InputSource::None,
            output: Artifact::Live,
        };
        let err = execute(&spec, &config).await.unwrap_err();
        assert!(err.downcast_ref::<PipelineError>().is_some());
    }

    #[test]
    fn artifact_url_input_takes_the_url_column() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(&config.output_dir).unwrap();
        artifacts::write_lines(
            &config.output_dir,
            Artifact::Live,
            &["https://a.example [200] [A]".into(), "https://b.example [404]".into()],
        )
        .unwrap();

        let lines = resolve_input_lines(&InputSource::ArtifactUrls(Artifact::Live), &config)
            .unwrap()
            .unwrap();
        assert_eq!(lines, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn artifact_host_input_derives_deduplicated_hosts() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(&config.output_dir).unwrap();
        artifacts::write_lines(
            &config.output_dir,
            Artifact::Live,
            &["https://a.example/x [200]".into(), "http://a.example [301]".into()],
        )
        .unwrap();

        let lines = resolve_input_lines(&InputSource::ArtifactHosts(Artifact::Live), &config)
            .unwrap()
            .unwrap();
        assert_eq!(lines, vec!["a.example"]);
    }
}
