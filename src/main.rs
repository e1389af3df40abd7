use std::{
    env,
    error::Error,
    fs::File,
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
};

use clap::Parser;
use jiff::{civil::Date, Zoned};
use log::info;
use pvfetch::solarman::{stats::write_csv, SolarmanClient};

/// Solarman data downloader app
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Solarman account username
    #[arg(short, long)]
    username: String,

    /// Start date in format YYYY-MM-DD, e.g. 2020-01-25
    #[arg(short, long)]
    start_date: Date,

    /// End date in format YYYY-MM-DD, e.g. 2020-01-25, default=today
    #[arg(short, long)]
    end_date: Option<Date>,

    /// Output filename (csv), default=stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Take the password from the SOLARMAN_PASSWORD variable when set, otherwise
/// read one line from stdin.  Prompt on stderr only when stdin is a terminal
/// so that piping the password in stays quiet.
fn read_password(username: &str) -> Result<String, Box<dyn Error>> {
    if let Ok(password) = env::var("SOLARMAN_PASSWORD") {
        return Ok(password);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Solarman password for user {}: ", username);
        io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    dotenvy::dotenv().ok();

    let end_date = match args.end_date {
        Some(date) => date,
        None => Zoned::now().date(),
    };
    if end_date < args.start_date {
        return Err(format!(
            "end date {} is before start date {}",
            end_date, args.start_date
        )
        .into());
    }

    let password = read_password(&args.username)?;
    let client = SolarmanClient::prod();
    let records = client
        .download_generation(&args.username, &password, args.start_date, end_date)
        .await?;

    match &args.output {
        Some(path) => {
            write_csv(&records, File::create(path)?)?;
            info!("wrote {} daily records to {}", records.len(), path.display());
        }
        // logging goes to stderr, so stdout carries only the csv
        None => write_csv(&records, io::stdout())?,
    }

    Ok(())
}
