use ad_library_scrape::utils::report_filename;
use ad_library_scrape::{AdRecord, ScrapeSession, ScraperConfig, WebDriverLauncher};
use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ScraperConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ScraperConfig::default(),
    }
    .with_env_overrides();

    if let Some(url) = args.webdriver_url {
        config.webdriver_url = url;
    }
    if args.headed {
        config.headless = false;
    }

    ::log::info!("Using WebDriver at {}", config.webdriver_url);

    let launcher = WebDriverLauncher::new(&config);
    let session = match ScrapeSession::new(launcher, config) {
        Ok(session) => session,
        Err(e) => {
            ::log::error!("Invalid extraction rules: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start_time = std::time::Instant::now();
    let report = match session
        .report(&args.keyword, usize::from(args.max_results))
        .await
    {
        Ok(report) => report,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for ad in &report.ads {
        log_ad(ad);
    }

    let output = args
        .output
        .unwrap_or_else(|| report_filename(&report.keyword).into());
    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            ::log::error!("Failed to serialize report: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::write(&output, json) {
        ::log::error!("Failed to write {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }

    ::log::info!(
        "Saved {} ads to {} in {:.2} seconds",
        report.total,
        output.display(),
        start_time.elapsed().as_secs_f64()
    );
    ExitCode::SUCCESS
}

fn log_ad(ad: &AdRecord) {
    ::log::info!(
        "#{} {} (library id {}, running since {})",
        ad.sequence,
        ad.page_name,
        ad.library_id,
        ad.start_date
    );
    ::log::debug!("{} images, text: {}", ad.image_urls.len(), ad.promo_text);
}
