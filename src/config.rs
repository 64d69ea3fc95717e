use clap::Parser;

pub const DEFAULT_LISTING_URL: &str = "https://api.hh.ru/vacancies";

/// Employers loaded when none are given: VICTORY group, Tensor, Kontur, Cian,
/// SberTech, Yandex, T-Bank, VTB, Cybertech, Sber.
pub const DEFAULT_EMPLOYER_IDS: [&str; 10] = [
    "4306244", "67611", "41862", "1429999", "906557", "1740", "78638", "4181", "10246537", "3529",
];

#[derive(Parser, Debug, Clone)]
#[command(name = "vacancydb", about = "Employer vacancy loader and analyzer")]
pub struct Config {
    /// Postgres server URL (host, port and credentials; the path is ignored)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Name of the database holding the company and vacancy tables
    #[arg(long, env = "DATABASE_NAME", default_value = "hh_database")]
    pub database_name: String,

    /// Listing endpoint to load vacancies from
    #[arg(long, env = "LISTING_URL", default_value = DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Employer identifiers to load (repeat the flag or comma-separate in the env)
    #[arg(
        long = "employer-id",
        env = "EMPLOYER_IDS",
        value_delimiter = ',',
        default_values_t = DEFAULT_EMPLOYER_IDS.map(String::from)
    )]
    pub employer_ids: Vec<String>,

    /// Vacancies requested per page
    #[arg(long, env = "PER_PAGE", default_value = "100")]
    pub per_page: u32,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load vacancies, then open the interactive menu (default)
    Run,
    /// Load vacancies into a freshly created schema and exit
    Ingest,
    /// List companies with their vacancy counts
    Companies,
    /// List all vacancies
    Vacancies,
    /// Show the average salary and the vacancies paying above it
    AboveAverage,
    /// List vacancies whose title or description mention a keyword
    Search { keyword: String },
    /// Open the interactive menu over already loaded data
    Menu,
    /// Serve the queries as a JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
}

impl Config {
    /// Resolve the command, defaulting to Run if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
