use anyhow::Result;
use bucketfinder::{config, Args, ScanEngine};
use clap::Parser;
use log::info;

const BANNER: &str = r#"
  ___          _       _   ___ _         _
 | _ )_  _ __ | |_____| |_| __(_)_ _  __| |___ _ _
 | _ \ || / _|| / / -_)  _| _|| | ' \/ _` / -_) '_|
 |___/\_,_\__||_\_\___|\__|_| |_|_||_\__,_\___|_|

        S3 bucket discovery by name mutation
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else if args.silent {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if !args.silent && !args.list {
        eprintln!("{}", BANNER);
    }

    let scan_config = config::load_config(&args)?;
    let keywords = config::load_keywords(&args)?;
    let spec = config::load_mutation_spec(keywords, &args)?;
    let engine = ScanEngine::new(scan_config, spec);

    if args.list {
        let (candidates, _) = engine.candidates();
        for candidate in candidates {
            println!("{}", candidate);
        }
        return Ok(());
    }

    let stats = engine.run().await.map_err(|e| anyhow::anyhow!("Scan failed: {}", e))?;

    info!(
        "Scan completed: {} probed, {} open, {} protected, {} not found, {} inconclusive in {:.2}s",
        stats.probed,
        stats.open,
        stats.protected,
        stats.not_found,
        stats.inconclusive,
        stats.duration.as_secs_f64()
    );

    Ok(())
}
