use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ad-library-scrape")]
#[command(about = "Collects active ads matching a keyword from the public ads library")]
#[command(version)]
pub struct Args {
    /// Search keyword (brand, domain or free text)
    pub keyword: String,

    /// Maximum number of ads to return
    #[arg(short = 'n', long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..=100))]
    pub max_results: u16,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the JSON report (defaults to ads_<keyword>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// WebDriver server URL, overrides config and WEBDRIVER_URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ad-library-scrape", "nike"]).unwrap();
        assert_eq!(args.keyword, "nike");
        assert_eq!(args.max_results, 30);
        assert!(args.config.is_none());
        assert!(!args.headed);
    }

    #[test]
    fn test_max_results_range() {
        assert!(Args::try_parse_from(["ad-library-scrape", "nike", "-n", "100"]).is_ok());
        assert!(Args::try_parse_from(["ad-library-scrape", "nike", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["ad-library-scrape", "nike", "--max-results", "101"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "ad-library-scrape",
            "bulevartienda.com",
            "--webdriver-url",
            "http://localhost:9515",
            "--headed",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert_eq!(args.webdriver_url.as_deref(), Some("http://localhost:9515"));
        assert!(args.headed);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }
}
