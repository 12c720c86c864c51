//! CLI argument parsing and command dispatch.
//!
//! Commands run through `execute_with` so no global config file or
//! `SETTREE_*` variable of the host leaks into the results.

use std::fs;

use clap::Parser;
use config::Map;
use rstest::rstest;
use tempfile::TempDir;

use settree::cli::{execute_with, Cli, Commands};
use settree::config::Settings;
use settree::exitcode;
use settree::util::testing;

fn cli(args: &[&str]) -> Cli {
    testing::init_test_setup();
    Cli::try_parse_from(std::iter::once("settree").chain(args.iter().copied()))
        .expect("valid arguments")
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_applies_them() {
    let cli = cli(&["render", "1,2", "--auto-wrap", "--delimiter", ";", "-dd"]);

    assert!(cli.auto_wrap);
    assert_eq!(cli.delimiter.as_deref(), Some(";"));
    assert_eq!(cli.debug, 2);
    assert!(matches!(cli.command, Some(Commands::Render { ref expressions }) if expressions == &["1,2"]));
}

fn run(cli: &Cli) -> Result<(), settree::cli::CliError> {
    execute_with(cli, || Ok(Settings::default()))
}

#[test]
fn given_render_without_expressions_when_parsing_then_rejected() {
    assert!(Cli::try_parse_from(["settree", "render"]).is_err());
}

#[rstest]
#[case(&["--auto-wrap", "render", "3,1", "{2,{}}"])]
#[case(&["tree", "{1,{2,{3}}}"])]
#[case(&["info", "{1,,2}"])]
#[case(&["compare", "{1}", "{1,2}"])]
#[case(&["at", "{1,{2}}", "1"])]
#[case(&["config", "template"])]
fn given_valid_input_when_executing_then_succeeds(#[case] args: &[&str]) {
    let result = run(&cli(args));

    assert!(result.is_ok(), "{args:?}: {:?}", result.err());
}

#[rstest]
#[case(&["render", "1,2"], exitcode::DATAERR)]
#[case(&["render", "{1,{2}"], exitcode::DATAERR)]
#[case(&["at", "{1,{2}}", "2"], exitcode::USAGE)]
#[case(&["--delimiter", "{", "render", "{1}"], exitcode::CONFIG)]
fn given_invalid_input_when_executing_then_maps_exit_code(
    #[case] args: &[&str],
    #[case] expected: i32,
) {
    let err = run(&cli(args)).unwrap_err();

    assert_eq!(err.exit_code(), expected, "{args:?}: {err}");
}

#[test]
fn given_config_file_when_executing_then_its_delimiter_applies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settree.toml");
    fs::write(&path, "field_terminator = \";\"\n").unwrap();
    let path_arg = path.to_string_lossy().to_string();
    let with_file = cli(&["--config", &path_arg, "at", "{2;1}", "1"]);
    let without_file = cli(&["at", "{2;1}", "1"]);

    let result = execute_with(&with_file, || {
        Settings::load_from(None, with_file.config.as_deref(), Some(Map::new()))
    });
    let err = run(&without_file).unwrap_err();

    assert!(result.is_ok(), "{:?}", result.err());
    // with ',' the set holds the single text element "2;1"
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_env_layer_when_executing_then_it_overrides_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settree.toml");
    fs::write(&path, "field_terminator = \";\"\n").unwrap();
    let path_arg = path.to_string_lossy().to_string();
    let parsed = cli(&["--config", &path_arg, "config", "show"]);
    let env: Map<String, String> = [("SETTREE_FIELD_TERMINATOR", "|")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let settings = Settings::load_from(None, parsed.config.as_deref(), Some(env.clone()))
        .expect("load settings");
    let result = execute_with(&parsed, || {
        Settings::load_from(None, parsed.config.as_deref(), Some(env.clone()))
    });

    assert_eq!(settings.field_terminator, "|");
    assert!(result.is_ok(), "{:?}", result.err());
}

#[test]
fn given_failing_settings_when_running_template_then_settings_not_loaded() {
    let cli = cli(&["config", "template"]);

    let result = execute_with(&cli, || {
        Err(settree::ApplicationError::config("must not be loaded"))
    });

    assert!(result.is_ok());
}
