use miette::{miette, IntoDiagnostic, Result};
use provlock_core::config::MIRROR_DIR_ENV;
use provlock_core::{Config, LockIndex, MirrorDownloader, ProviderVersion};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Resolve and print the checksums of one provider version.
pub fn run(
    config: &Config,
    address: &str,
    version: &str,
    platforms: &[String],
    json: bool,
) -> Result<()> {
    let mirror_dir = config.mirror_dir.clone().ok_or_else(|| {
        miette!("no provider mirror configured (use --mirror or set {MIRROR_DIR_ENV})")
    })?;
    debug!(mirror = %mirror_dir.display(), host = %config.registry_host, "using provider mirror");

    let index = LockIndex::new(Arc::new(MirrorDownloader::new(
        mirror_dir,
        config.registry_host.clone(),
    )));
    let cancel = CancellationToken::new();

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let result = runtime.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        index.resolve(address, version, platforms, &cancel).await
    });

    let pv = result.map_err(|e| miette!(code = e.code(), "{e}"))?;
    debug!(address, version, platforms = pv.platforms().len(), "resolved provider checksums");

    if json {
        println!("{}", serde_json::to_string_pretty(&pv).into_diagnostic()?);
    } else {
        print!("{}", render(&pv));
    }
    Ok(())
}

fn render(pv: &ProviderVersion) -> String {
    let mut out = format!("{} {}\n", pv.address(), pv.version());
    out.push_str("h1:\n");
    for platform in pv.platforms() {
        if let Some(digest) = pv.h1_hashes().get(platform) {
            out.push_str(&format!("  {platform:<16} {digest}\n"));
        }
    }
    out.push_str("zh:\n");
    for (platform, digest) in pv.zh_hashes() {
        out.push_str(&format!("  {platform:<16} {digest}\n"));
    }
    out
}
