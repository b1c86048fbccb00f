use super::*;

use std::path::PathBuf;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["catalog-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["catalog-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn db_clear_defaults_to_unconfirmed() {
    let cli = Cli::try_parse_from(["catalog-cli", "db", "clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Clear { yes: false }
        })
    ));

    let cli = Cli::try_parse_from(["catalog-cli", "db", "clear", "--yes"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Clear { yes: true }
        })
    ));
}

#[tokio::test]
async fn db_clear_without_yes_is_refused_before_connecting() {
    let err = run_db(DbCommands::Clear { yes: false })
        .await
        .expect_err("clear without --yes must fail");
    assert!(err.to_string().contains("--yes"));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["catalog-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn sync_nb_products_defaults() {
    let cli = Cli::try_parse_from(["catalog-cli", "sync", "nb-products"]).unwrap();
    match cli.command {
        Some(Commands::Sync {
            command: SyncCommands::NbProducts { dry_run, error_log },
        }) => {
            assert!(!dry_run);
            assert_eq!(error_log, PathBuf::from("errores-sync.log"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn sync_nb_products_dry_run_with_error_log() {
    let cli = Cli::try_parse_from([
        "catalog-cli",
        "sync",
        "nb-products",
        "--dry-run",
        "--error-log",
        "/tmp/nb.log",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::NbProducts { dry_run: true, ref error_log }
        }) if error_log == &PathBuf::from("/tmp/nb.log")
    ));
}

#[test]
fn sync_nb_prices_parses() {
    let cli = Cli::try_parse_from(["catalog-cli", "sync", "nb-prices"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::NbPrices { .. }
        })
    ));
}

#[test]
fn sync_elit_products_dry_run() {
    let cli = Cli::try_parse_from(["catalog-cli", "sync", "elit-products", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::ElitProducts { dry_run: true }
        })
    ));
}

#[test]
fn sync_sheets_accept_limit() {
    let cli = Cli::try_parse_from(["catalog-cli", "sync", "nb-sheets", "--limit", "50"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::NbSheets { limit: Some(50) }
        })
    ));

    let cli = Cli::try_parse_from(["catalog-cli", "sync", "elit-sheets"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::ElitSheets { limit: None }
        })
    ));
}

#[test]
fn sync_seed_commands_parse() {
    for (arg, expected) in [
        ("nb-brands", "NbBrands"),
        ("nb-categories", "NbCategories"),
        ("category-slugs", "CategorySlugs"),
    ] {
        let cli = Cli::try_parse_from(["catalog-cli", "sync", arg]).unwrap();
        let Some(Commands::Sync { command }) = cli.command else {
            panic!("expected sync command for {arg}");
        };
        assert_eq!(format!("{command:?}"), expected);
    }
}

#[test]
fn distecna_parse_requires_files() {
    assert!(Cli::try_parse_from(["catalog-cli", "distecna", "parse"]).is_err());
}

#[test]
fn distecna_parse_default_output() {
    let cli =
        Cli::try_parse_from(["catalog-cli", "distecna", "parse", "p1.html", "p2.html"]).unwrap();
    match cli.command {
        Some(Commands::Distecna {
            command: DistecnaCommands::Parse { files, output },
        }) => {
            assert_eq!(files.len(), 2);
            assert_eq!(output, PathBuf::from("productos-distecna.json"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn verify_images_defaults() {
    let cli = Cli::try_parse_from(["catalog-cli", "verify-images"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::VerifyImages {
            supplier: None,
            concurrency: 12
        })
    ));
}

#[test]
fn verify_images_with_supplier_and_concurrency() {
    let cli = Cli::try_parse_from([
        "catalog-cli",
        "verify-images",
        "--supplier",
        "elit",
        "--concurrency",
        "4",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::VerifyImages {
            supplier: Some(ref s),
            concurrency: 4
        }) if s == "elit"
    ));
}

#[test]
fn cart_quote_requires_cart_path() {
    assert!(Cli::try_parse_from(["catalog-cli", "cart", "quote"]).is_err());

    let cli = Cli::try_parse_from([
        "catalog-cli",
        "cart",
        "quote",
        "--cart",
        "cart.json",
        "--payment",
        "transferencia",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cart {
            command: CartCommands::Quote { payment: Some(ref p), .. }
        }) if p == "transferencia"
    ));
}
