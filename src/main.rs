use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{
    Error,
    bail,
};
use its_influx::{
    app,
    config::{
        self,
        Config,
        InfluxConfig,
        Input,
    },
    sink::InfluxSink,
    source::TsharkSource,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.into_config()?;

    let sink = InfluxSink::new(&config.influx);
    sink.ensure_database(config.purge).await?;

    match &config.input {
        Input::File(path) => {
            println!("Reading capture: {}", path.display());

            let mut source = TsharkSource::open_file(path)?;
            let stats = app::ingest_file(&mut source, &sink, &config.location).await;

            println!(
                "Reading capture finished. Packets written: {}, errors: {}",
                stats.success, stats.error
            );
        }
        Input::Live(interface) => {
            println!("Monitoring interface: {interface}");

            match TsharkSource::open_live(interface) {
                Ok(mut source) => {
                    app::ingest_live(&mut source, &sink, &config.location, interface).await;
                }
                Err(error) if error.is_permission_denied() => {
                    println!(
                        "Insufficient permissions to capture on interface {interface}. Try again with sudo."
                    );
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    Ok(())
}

/// Read ITS-G5 V2X traffic and push it to InfluxDB.
#[derive(Debug, Parser)]
struct Args {
    /// Input capture file
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Interface to monitor
    #[clap(short, long)]
    interface: Option<String>,

    /// Name of this station
    #[clap(short, long)]
    location: String,

    /// Purge the database before starting
    #[clap(short = 'x', long)]
    purge_db: bool,

    /// InfluxDB username
    #[clap(short = 'u', long, env = "INFLUXDB_USER", default_value = config::DEFAULT_USERNAME)]
    db_user: String,

    /// InfluxDB password
    #[clap(short = 'p', long, env = "INFLUXDB_PASSWORD", default_value = config::DEFAULT_PASSWORD)]
    db_password: String,

    /// InfluxDB database name
    #[clap(short = 't', long, env = "INFLUXDB_DATABASE", default_value = config::DEFAULT_DATABASE)]
    db_table: String,

    /// InfluxDB server URL
    #[clap(long, env = "INFLUXDB_URL", default_value = config::DEFAULT_URL)]
    db_url: String,
}

impl Args {
    fn into_config(self) -> Result<Config, Error> {
        let input = match (self.file, self.interface) {
            (Some(file), None) => Input::File(file),
            (None, Some(interface)) => Input::Live(interface),
            (Some(_), Some(_)) => {
                bail!("Specify either --file or --interface, not both at the same time.")
            }
            (None, None) => {
                bail!(
                    "No input specified. Provide a capture file (--file) or an interface to monitor (--interface), see --help."
                )
            }
        };

        Ok(Config {
            input,
            location: self.location,
            purge: self.purge_db,
            influx: InfluxConfig {
                url: self.db_url,
                username: self.db_user,
                password: self.db_password,
                database: self.db_table,
            },
        })
    }
}
