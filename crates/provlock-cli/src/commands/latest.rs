use miette::{miette, IntoDiagnostic, Result};
use provlock_core::{Config, GitLabConfig, GitLabRelease, LatestRelease};
use tracing::debug;

/// Print the latest released version of a GitLab project.
pub fn run(config: &Config, source: &str) -> Result<()> {
    let gitlab = GitLabConfig {
        base_url: config.gitlab_base_url.clone(),
        token: config.gitlab_token.clone(),
    };
    let release = GitLabRelease::new(source, &gitlab).map_err(|e| miette!("{e}"))?;

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let version = runtime
        .block_on(release.latest())
        .map_err(|e| miette!("{e}"))?;

    debug!(source, %version, "resolved latest release");
    println!("{version}");
    Ok(())
}
