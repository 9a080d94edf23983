use anyhow::Result;
use clap::Parser;
use dashie_rs::cli::Args;
use dashie_rs::generator::workflow::launch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let company = args.company.clone();
    let config = args.into_config()?;

    init_logging(config.verbose);

    config.validate()?;
    launch(&config, &company).await?;
    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先，`-v` 时默认为 debug
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "dashie_rs=debug"
    } else {
        "dashie_rs=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();
}
