mod catalog;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "novita-cli")]
#[command(about = "Novita catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the SQL that creates the products table and its policies
    Schema {
        /// Table name to generate the DDL for
        #[arg(long, default_value = "produtos")]
        table: String,
    },
    /// Check that the configured backend answers and report the row count
    Check,
    /// List products from the backend, or the sample catalog when unconfigured
    List {
        /// Category slug (e.g. chuteira)
        #[arg(long)]
        categoria: Option<String>,
        /// Exact brand name
        #[arg(long)]
        marca: Option<String>,
        /// Free-text search over name, brand and category
        #[arg(long)]
        busca: Option<String>,
    },
    /// Insert the sample catalog into the backend using the service role key
    Seed {
        /// Print what would be inserted without writing to the backend
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Schema { table } = &cli.command {
        if !novita_core::is_plain_table_name(table) {
            anyhow::bail!("'{table}' is not a plain table name");
        }
        print!("{}", novita_backend::products_table_ddl(table));
        return Ok(());
    }

    let config = novita_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Schema { .. } => {}
        Commands::Check => catalog::run_check(&config).await?,
        Commands::List {
            categoria,
            marca,
            busca,
        } => {
            let filter = novita_core::CatalogFilter {
                categoria,
                marca,
                busca,
            };
            catalog::run_list(&config, filter).await?;
        }
        Commands::Seed { dry_run } => catalog::run_seed(&config, dry_run).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
