use std::path::PathBuf;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/financial_data.csv";
pub const DEFAULT_PAGE_SIZE: usize = 15;

const DATA_ENV: &str = "SALES_DASH_DATA";
const PAGE_SIZE_ENV: &str = "SALES_DASH_PAGE_SIZE";

/// Startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// Whether `data_path` was given explicitly (CLI or env) rather than defaulted.
    pub explicit_path: bool,
    /// Rows per page in the data explorer.
    pub page_size: usize,
}

impl AppConfig {
    /// Resolve from the process: `.env`, then CLI argument, then environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(
            std::env::args().nth(1),
            std::env::var(DATA_ENV).ok(),
            std::env::var(PAGE_SIZE_ENV).ok(),
        )
    }

    /// Precedence: CLI argument over `SALES_DASH_DATA` over the default path.
    pub fn resolve(arg: Option<String>, env_path: Option<String>, env_page_size: Option<String>) -> Self {
        let explicit = arg.or(env_path).filter(|p| !p.trim().is_empty());
        let page_size = env_page_size
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        AppConfig {
            explicit_path: explicit.is_some(),
            data_path: explicit.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            page_size,
        }
    }
}
