use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::Command;

/// Run a command to completion, failing on a non-zero exit.
///
/// Output is captured rather than inherited so that `systemctl enable` chatter
/// does not interleave with the progress line. On failure the trimmed stderr
/// becomes part of the error.
pub fn run<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().collect();
    let args_str: Vec<_> = args.iter().map(|s| s.as_ref().to_string_lossy()).collect();

    tracing::debug!("> {} {}", program, args_str.join(" "));

    let output = Command::new(program)
        .args(&args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            anyhow::bail!("{} failed with exit code {:?}", program, output.status.code());
        }
        anyhow::bail!(
            "{} failed with exit code {:?}: {}",
            program,
            output.status.code(),
            stderr
        );
    }

    Ok(())
}
