use clap::Parser;

use super::*;

#[test]
fn parses_schema_command() {
    let cli = Cli::try_parse_from(["novita-cli", "schema"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Schema { ref table } if table == "produtos"));
}

#[test]
fn schema_accepts_table_override() {
    let cli = Cli::try_parse_from(["novita-cli", "schema", "--table", "catalogo"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Schema { ref table } if table == "catalogo"));
}

#[test]
fn parses_list_filters() {
    let cli = Cli::try_parse_from([
        "novita-cli",
        "list",
        "--categoria",
        "chuteira",
        "--marca",
        "Adidas",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::List {
            categoria: Some(ref c),
            marca: Some(ref m),
            busca: None,
        } if c == "chuteira" && m == "Adidas"
    ));
}

#[test]
fn seed_defaults_to_writing() {
    let cli = Cli::try_parse_from(["novita-cli", "seed"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Seed { dry_run: false }));
}

#[test]
fn seed_dry_run_flag() {
    let cli =
        Cli::try_parse_from(["novita-cli", "seed", "--dry-run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Seed { dry_run: true }));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["novita-cli"]).is_err());
}
