//! Melian CLI Client
//!
//! Command-line interface for querying a Melian server.

use clap::{Args, Parser, Subcommand};
use melian::schema::SchemaDocument;
use melian::{Client, ClientConfig, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Melian CLI
#[derive(Parser, Debug)]
#[command(name = "melian-cli")]
#[command(about = "CLI for the Melian row cache")]
#[command(version)]
struct Cli {
    /// Server DSN (unix:///path or tcp://host:port); defaults to $MELIAN_DSN
    #[arg(short, long)]
    dsn: Option<String>,

    /// Compact schema spec instead of asking the server
    #[arg(long, conflicts_with = "schema_file")]
    schema_spec: Option<String>,

    /// JSON schema file instead of asking the server
    #[arg(long)]
    schema_file: Option<String>,

    /// Socket read/write timeout in milliseconds
    #[arg(short, long, default_value = "1000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the schema the client loaded
    ///
    /// Without --schema-spec or --schema-file this is what the server
    /// described at connect time.
    Describe {
        /// Print the compact spec instead of JSON
        #[arg(long)]
        spec: bool,

        /// Ask the server again instead of printing the loaded schema
        #[arg(long)]
        live: bool,
    },

    /// Print the wire ids of a table index
    Resolve {
        /// Table name
        table: String,

        /// Index (column) name
        index: String,
    },

    /// Fetch one row
    Fetch {
        /// Table name
        table: String,

        /// Index (column) name
        index: String,

        #[command(flatten)]
        key: KeyArg,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct KeyArg {
    /// Integer key
    #[arg(long)]
    int: Option<i64>,

    /// String key
    #[arg(long)]
    string: Option<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,melian=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let mut builder = ClientConfig::builder_from_env()
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .connect_timeout_ms(args.timeout_ms);
    if let Some(dsn) = &args.dsn {
        builder = builder.dsn(dsn);
    }
    if let Some(spec) = &args.schema_spec {
        builder = builder.schema_spec(spec);
    }
    if let Some(path) = &args.schema_file {
        builder = builder.schema_file(path);
    }
    let config = builder.build();

    tracing::debug!("Connecting to {}", config.dsn);
    let mut client = Client::connect(config)?;

    match args.command {
        Commands::Describe { spec, live } => {
            let described;
            let schema = if live {
                described = client.describe_schema()?;
                &described
            } else {
                client.schema()
            };
            if spec {
                println!("{}", schema);
            } else {
                println!("{}", SchemaDocument::from(schema).to_json_pretty()?);
            }
        }
        Commands::Resolve { table, index } => {
            let (table_id, index_id) = client.resolve_index(&table, &index)?;
            println!("table_id={} index_id={}", table_id, index_id);
        }
        Commands::Fetch { table, index, key } => {
            let row = match (key.int, key.string) {
                (Some(value), _) => client.fetch_by_int(&table, &index, value)?,
                (None, Some(value)) => client.fetch_by_string(&table, &index, value)?,
                (None, None) => unreachable!("clap requires one key argument"),
            };
            match row {
                Some(row) => println!("{}", row.to_json_pretty()?),
                None => println!("(not found)"),
            }
        }
    }

    client.close();
    Ok(())
}
