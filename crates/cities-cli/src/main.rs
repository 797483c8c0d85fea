// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, bail};
use cities_app::AppState;
use config::Config;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `cities --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())
        .with_context(|| format!("set up logging at {} -- set [log].path", log_path.display()))?;

    let base_url = config.api_base_url();
    let client = cities_api::Client::new(
        &base_url,
        &config.api_key(),
        &config.api_host(),
        config.api_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout or {}",
            options.config_path.display(),
            config::ENV_API_BASE_URL
        )
    })?;
    if config.api_key().is_empty() {
        log::warn!(
            "no API key configured; set [api].key or {} or requests will be rejected",
            config::ENV_API_KEY
        );
    }
    log::info!("starting against {base_url} (host {})", client.api_host());

    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::with_limit(config.default_limit());
    let mut runtime = ApiRuntime::new(client);
    cities_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

impl CliOptions {
    fn with_config_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            print_config_path: false,
            print_example: false,
            check_only: false,
            show_help: false,
        }
    }
}

/// Accepts `--config <path>` and `--config=<path>`; a following flag is not
/// taken as the path.
fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions::with_config_path(default_config_path);
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if let Some(inline) = arg.strip_prefix("--config=") {
            options.config_path = config_path_value(Some(inline))?;
            continue;
        }
        match arg {
            "--config" => {
                let next = args.next();
                options.config_path = config_path_value(next.as_ref().map(AsRef::as_ref))?;
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            other => bail!("unrecognized option {other:?} (see `cities --help`)"),
        }
    }

    Ok(options)
}

fn config_path_value(value: Option<&str>) -> Result<PathBuf> {
    match value {
        Some(path) if !path.is_empty() && !path.starts_with("--") => Ok(PathBuf::from(path)),
        _ => bail!("--config needs a file path, e.g. --config ~/cities.toml"),
    }
}

fn print_help() {
    println!("cities -- browse the cities API from the terminal");
    println!("  --config <path>          Use a specific config file (also --config=<path>)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config, logging, and HTTP client setup");
    println!("  --help                   Show this help");
    println!();
    println!(
        "Environment: API_BASE_URL, API_KEY, API_HOST override [api]; RUST_LOG overrides [log].level"
    );
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    const FALLBACK: &str = "/etc/cities/config.toml";

    fn parse(args: &[&str]) -> Result<CliOptions> {
        parse_cli_args(args.iter().copied(), PathBuf::from(FALLBACK))
    }

    #[test]
    fn no_arguments_launches_ui_with_fallback_config() -> Result<()> {
        assert_eq!(
            parse(&[])?,
            CliOptions::with_config_path(PathBuf::from(FALLBACK))
        );
        Ok(())
    }

    #[test]
    fn check_with_config_validates_that_file() -> Result<()> {
        let options = parse(&["--check", "--config", "staging.toml"])?;
        assert!(options.check_only);
        assert_eq!(options.config_path, PathBuf::from("staging.toml"));
        assert!(!options.print_config_path && !options.print_example && !options.show_help);
        Ok(())
    }

    #[test]
    fn inline_config_value_is_accepted_and_last_one_wins() -> Result<()> {
        let options = parse(&["--config", "first.toml", "--config=second.toml"])?;
        assert_eq!(options.config_path, PathBuf::from("second.toml"));
        Ok(())
    }

    #[test]
    fn config_without_a_path_is_rejected() {
        let cases: [&[&str]; 3] = [&["--config"], &["--config="], &["--config", "--check"]];
        for args in cases {
            let error = parse(args).expect_err("config path is required");
            assert!(
                error.to_string().contains("--config needs a file path"),
                "{args:?}: {error}"
            );
        }
    }

    #[test]
    fn unrecognized_option_points_at_help() {
        let error = parse(&["--limit", "7"]).expect_err("--limit is not a cities option");
        let message = error.to_string();
        assert!(message.contains("\"--limit\""), "{message}");
        assert!(message.contains("cities --help"), "{message}");
    }

    #[test]
    fn print_flags_and_short_help_combine() -> Result<()> {
        let options = parse(&["--print-example-config", "-h", "--print-config-path"])?;
        assert!(options.print_example);
        assert!(options.print_config_path);
        assert!(options.show_help);
        assert!(!options.check_only);
        Ok(())
    }
}
