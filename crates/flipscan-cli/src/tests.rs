use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["flipscan", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["flipscan", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["flipscan"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn search_defaults_to_stdin_with_expansion() {
    let cli = Cli::try_parse_from([
        "flipscan",
        "search",
        "--source",
        "walmart",
        "--query",
        "wireless headphones",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref source,
            ref query,
            input: None,
            no_expand: false,
        }) if source == "walmart" && query == "wireless headphones"
    ));
}

#[test]
fn search_accepts_input_file_and_no_expand() {
    let cli = Cli::try_parse_from([
        "flipscan",
        "search",
        "--source",
        "target",
        "--query",
        "lamp",
        "--input",
        "listings.json",
        "--no-expand",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            input: Some(ref path),
            no_expand: true,
            ..
        }) if path == &PathBuf::from("listings.json")
    ));
}

#[test]
fn search_requires_source() {
    let result = Cli::try_parse_from(["flipscan", "search", "--query", "lamp"]);
    assert!(result.is_err());
}

#[test]
fn score_requires_input() {
    let result = Cli::try_parse_from(["flipscan", "score"]);
    assert!(result.is_err());
}

#[test]
fn score_with_reference_prices() {
    let cli = Cli::try_parse_from([
        "flipscan",
        "score",
        "--input",
        "listings.json",
        "--reference-prices",
        "prices.json",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Score {
            reference_prices: Some(ref path),
            ..
        }) if path == &PathBuf::from("prices.json")
    ));
}

#[test]
fn history_limit_defaults_to_ten() {
    let cli = Cli::try_parse_from(["flipscan", "history", "--identifier", "W1"]).unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::History { ref identifier, limit: 10 }) if identifier == "W1"
    ));
}

#[test]
fn parse_listings_normalizes_retriever_shapes() {
    let document = r#"[
        {"asin": "B00TEST", "title": " Wireless Headphones ", "retailer": "Walmart",
         "price": "$24.99", "originalPrice": 59.99},
        {"title": "Desk Lamp", "sourceName": "target", "price": 15}
    ]"#;

    let listings = input::parse_listings(document).unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].identifier, "B00TEST");
    assert_eq!(listings[0].title, "Wireless Headphones");
    assert!((listings[0].price - 24.99).abs() < 1e-9);
    assert!(listings[0].is_clearance());
    assert!(listings[1].identifier.starts_with("TARGET_"));
    assert_eq!(listings[1].stock_status, "Unknown");
}

#[test]
fn parse_listings_rejects_non_array() {
    assert!(input::parse_listings(r#"{"title": "x"}"#).is_err());
}

#[test]
fn filter_by_source_ignores_case() {
    let listings = input::parse_listings(
        r#"[
            {"id": "1", "title": "A", "retailer": "Walmart"},
            {"id": "2", "title": "B", "retailer": "target"},
            {"id": "3", "title": "C", "retailer": "WALMART"}
        ]"#,
    )
    .unwrap();

    let kept = input::filter_by_source(listings, "walmart");

    let ids: Vec<&str> = kept.iter().map(|l| l.identifier.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn reference_prices_default_to_empty_without_path() {
    let prices = input::load_reference_prices(None).unwrap();
    assert!(prices.is_empty());
}

#[test]
fn history_limit_accepts_positive_value() {
    let cli = Cli::try_parse_from(["flipscan", "history", "--identifier", "W1", "--limit", "25"])
        .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::History { limit: 25, .. })
    ));
}

#[test]
fn history_limit_rejects_zero_and_negative() {
    for limit in ["0", "-1"] {
        let result =
            Cli::try_parse_from(["flipscan", "history", "--identifier", "W1", "--limit", limit]);
        assert!(result.is_err(), "limit {limit} should be rejected");
    }
}

#[test]
fn score_with_counterparts() {
    let cli = Cli::try_parse_from([
        "flipscan",
        "score",
        "--input",
        "listings.json",
        "--counterparts",
        "amazon.json",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Score {
            counterparts: Some(ref path),
            reference_prices: None,
            ..
        }) if path == &PathBuf::from("amazon.json")
    ));
}

#[test]
fn explicit_reference_prices_override_counterpart_prices() {
    let listings = input::parse_listings(
        r#"[
            {"id": "W1", "title": "Wireless Headphones", "retailer": "walmart", "price": 24.99},
            {"id": "W2", "title": "Desk Lamp", "retailer": "walmart", "price": 15}
        ]"#,
    )
    .unwrap();
    let counterparts = input::parse_listings(
        r#"[
            {"asin": "A1", "title": "Wireless Headphones", "retailer": "amazon", "price": 40},
            {"asin": "A2", "title": "Desk Lamp", "retailer": "amazon", "price": 30}
        ]"#,
    )
    .unwrap();
    let explicit = std::collections::HashMap::from([("W2".to_string(), 22.0)]);

    let prices = commands::merge_reference_prices(
        &listings,
        Some(&counterparts),
        explicit,
        &flipscan_core::CounterpartConfig::default(),
    );

    assert!((prices["W1"] - 40.0).abs() < 1e-9);
    assert!((prices["W2"] - 22.0).abs() < 1e-9);
}

#[test]
fn merge_without_counterparts_keeps_explicit_prices_only() {
    let listings =
        input::parse_listings(r#"[{"id": "W1", "title": "Lamp", "price": 10}]"#).unwrap();

    let prices = commands::merge_reference_prices(
        &listings,
        None,
        std::collections::HashMap::new(),
        &flipscan_core::CounterpartConfig::default(),
    );

    assert!(prices.is_empty());
}
