use clap::Parser;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        logging: LoggingOverrides {
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.catalog.default_page_size.get(), 12);
    assert_eq!(settings.catalog.simulated_latency, Duration::ZERO);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.duration_seconds, 300);
    assert!(settings.remote.base_url.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        logging: LoggingOverrides {
            log_json: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_page_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.catalog.default_page_size = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "catalog.default_page_size",
            ..
        }
    ));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero port");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn unparsable_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn invalid_remote_url_is_rejected_and_blank_is_ignored() {
    let mut raw = RawSettings::default();
    raw.remote.base_url = Some("not a url".to_string());
    let err = Settings::from_raw(raw).expect_err("bad url");
    assert!(matches!(err, LoadError::Invalid { key: "remote.base_url", .. }));

    let mut raw = RawSettings::default();
    raw.remote.base_url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("blank url ignored");
    assert!(settings.remote.base_url.is_none());
}

#[test]
fn client_overrides_reach_cache_and_remote() {
    let mut raw = RawSettings::default();
    raw.cache.duration_seconds = Some(60);

    let overrides = ClientOverrides {
        remote_base_url: Some("http://shop.example".to_string()),
        cache_enabled: Some(false),
        cache_duration_seconds: Some(5),
        ..Default::default()
    };
    raw.apply_client_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.duration_seconds, 5);
    assert_eq!(
        settings.remote.base_url.as_ref().map(Url::as_str),
        Some("http://shop.example/")
    );
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["vetrina"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "vetrina",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--server-port",
        "8080",
        "--catalog-simulated-latency-ms",
        "250",
        "--log-json",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(serve.overrides.catalog.simulated_latency_ms, Some(250));
            assert_eq!(serve.overrides.logging.log_json, Some(true));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_browse_arguments() {
    let args = CliArgs::parse_from([
        "vetrina",
        "browse",
        "--page",
        "2",
        "--min-rating",
        "4",
        "--ordering",
        "-price",
        "--cache-duration-seconds",
        "30",
    ]);

    match args.command.expect("browse command") {
        Command::Browse(browse) => {
            assert_eq!(browse.page.as_deref(), Some("2"));
            assert_eq!(browse.min_rating.as_deref(), Some("4"));
            assert_eq!(browse.ordering.as_deref(), Some("-price"));
            assert_eq!(browse.overrides.cache_duration_seconds, Some(30));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_rating_arguments() {
    let args = CliArgs::parse_from([
        "vetrina",
        "rating",
        "7",
        "--remote-base-url",
        "http://shop.example",
    ]);

    match args.command.expect("rating command") {
        Command::Rating(rating) => {
            assert_eq!(rating.id, 7);
            assert_eq!(
                rating.overrides.remote_base_url.as_deref(),
                Some("http://shop.example")
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
