//! Command dispatch

use std::io::{self, Read};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, Configuration, SetParser};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Atom, IndexedView, Member, SetTree, ToTermTree};

pub fn execute(cli: &Cli) -> CliResult<()> {
    execute_with(cli, || Settings::load(cli.config.as_deref()))
}

/// Runs `cli` against the settings produced by `load`.
///
/// Command-line flags are applied on top. Commands that need no settings
/// never call `load`.
pub fn execute_with<F>(cli: &Cli, load: F) -> CliResult<()>
where
    F: Fn() -> ApplicationResult<Settings>,
{
    match &cli.command {
        Some(Commands::Render { expressions }) => {
            cmd_render(&build_parser(cli, &load)?, expressions)
        }
        Some(Commands::Tree { expression }) => cmd_tree(&build_parser(cli, &load)?, expression),
        Some(Commands::Info { expression }) => cmd_info(&build_parser(cli, &load)?, expression),
        Some(Commands::Compare { left, right }) => {
            cmd_compare(&build_parser(cli, &load)?, left, right)
        }
        Some(Commands::At { expression, index }) => {
            cmd_at(&build_parser(cli, &load)?, expression, *index)
        }
        Some(Commands::Config { command }) => cmd_config(cli, &load, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "settree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Loaded settings with command-line flags on top.
#[instrument(level = "debug", skip_all)]
fn load_settings<F>(cli: &Cli, load: &F) -> CliResult<Settings>
where
    F: Fn() -> ApplicationResult<Settings>,
{
    let mut settings = load()?;
    if let Some(delimiter) = &cli.delimiter {
        settings.field_terminator = delimiter.clone();
    }
    if let Some(delimiter) = &cli.row_delimiter {
        settings.row_terminator = delimiter.clone();
    }
    settings.ignore_empty_fields |= cli.ignore_empty;
    settings.auto_wrap_braces |= cli.auto_wrap;
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn build_parser<F>(cli: &Cli, load: &F) -> CliResult<SetParser<Atom>>
where
    F: Fn() -> ApplicationResult<Settings>,
{
    let config: Configuration = load_settings(cli, load)?.to_configuration()?;
    Ok(SetParser::new(config))
}

fn parse_one(parser: &SetParser<Atom>, expression: &str) -> CliResult<SetTree<Atom>> {
    Ok(parser.parse(expression)?)
}

#[instrument(level = "debug", skip(parser))]
fn cmd_render(parser: &SetParser<Atom>, expressions: &[String]) -> CliResult<()> {
    for expression in expressions {
        if expression == "-" {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| CliError::io("read stdin", e))?;
            for tree in parser.parse_rows(&input)? {
                output::info(&parser.render(&tree));
            }
        } else {
            let tree = parse_one(parser, expression)?;
            output::info(&parser.render(&tree));
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(parser))]
fn cmd_tree(parser: &SetParser<Atom>, expression: &str) -> CliResult<()> {
    let tree = parse_one(parser, expression)?;
    output::info(&tree.to_term_tree(parser.configuration().field_terminator()));
    Ok(())
}

#[instrument(level = "debug", skip(parser))]
fn cmd_info(parser: &SetParser<Atom>, expression: &str) -> CliResult<()> {
    let tree = parse_one(parser, expression)?;
    let info = tree.info();
    output::header(&parser.render(&tree));
    output::field("elements", &tree.element_count());
    output::field("subsets", &tree.subset_count());
    output::field("empty", &info.is_empty);
    output::field("null elements", &info.has_null_elements);
    output::field("null element count", &info.null_element_count);
    if info.has_null_elements && parser.configuration().ignore_empty_fields() {
        output::warning("empty elements were dropped from the output");
    }
    Ok(())
}

#[instrument(level = "debug", skip(parser))]
fn cmd_compare(parser: &SetParser<Atom>, left: &str, right: &str) -> CliResult<()> {
    let left = parse_one(parser, left)?;
    let right = parse_one(parser, right)?;
    let verdict = match left.compare(&right) {
        std::cmp::Ordering::Less => "before",
        std::cmp::Ordering::Equal => "equal",
        std::cmp::Ordering::Greater => "after",
    };
    output::info(&verdict);
    Ok(())
}

#[instrument(level = "debug", skip(parser))]
fn cmd_at(parser: &SetParser<Atom>, expression: &str, index: usize) -> CliResult<()> {
    let mut tree = parse_one(parser, expression)?;
    let view = IndexedView::new(&mut tree);
    match view.at(index).map_err(ApplicationError::from)? {
        Member::Element(element) => output::field("element", element),
        Member::Subset(subset) => output::field("subset", &parser.render(subset)),
    }
    Ok(())
}

fn cmd_config<F>(cli: &Cli, load: &F, command: &ConfigCommands) -> CliResult<()>
where
    F: Fn() -> ApplicationResult<Settings>,
{
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, load)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::InvalidArgs(
                    "no home directory to place a config file in".to_string(),
                ))
            }
        },
    }
    Ok(())
}
