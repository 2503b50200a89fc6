//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{DocumentService, NormalizeReport};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{config_file_in, global_config_path, local_config_path, NormalizeConfig, Settings};
use crate::domain::TreeNodeConvert;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::xml::XmlDocument;

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        output::info(&Cli::command().render_help());
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    if let Some(file) = command.document() {
        if !file.is_file() {
            return Err(CliError::InvalidArgs(format!("not a file: {}", file.display())));
        }
    }

    let settings = load_settings(cli, command)?;
    let container = ServiceContainer::new(settings);
    let service = &container.document_service;

    match command {
        Commands::Outline { file, sorted } => cmd_outline(service, file, *sorted),
        Commands::Normalize {
            file,
            output,
            no_sort,
            descending,
            keep_empty,
            no_split,
        } => {
            let defaults = container.settings.normalize;
            let options = NormalizeConfig {
                sort_children: defaults.sort_children && !no_sort,
                descending: defaults.descending || *descending,
                remove_empty: defaults.remove_empty && !keep_empty,
                split_extensions: defaults.split_extensions && !no_split,
            };
            cmd_normalize(service, file, output.as_deref(), options)
        }
        Commands::Sort {
            file,
            output,
            descending,
        } => cmd_sort(service, file, output.as_deref(), *descending),
        Commands::Config { command } => cmd_config(cli, command, &container.settings),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli, command: &Commands) -> CliResult<Settings> {
    let global = match &cli.config_dir {
        Some(dir) => Some(config_file_in(dir)),
        None => global_config_path(),
    };
    let document_dir = command.document().and_then(|file| file.parent());
    debug!("load_settings: global={:?}, local dir={:?}", global, document_dir);
    Ok(Settings::load_with(global.as_deref(), document_dir)?)
}

#[instrument(skip(service))]
fn cmd_outline(service: &DocumentService, file: &Path, sorted: bool) -> CliResult<()> {
    let tree = service.outline(file, sorted)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(service))]
fn cmd_normalize(
    service: &DocumentService,
    file: &Path,
    out: Option<&Path>,
    options: NormalizeConfig,
) -> CliResult<()> {
    let mut loaded = service.load(file)?;
    let report = service.normalize(&mut loaded.doc, options)?;
    emit(service, &loaded.doc, out)?;
    print_report(&report);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_sort(service: &DocumentService, file: &Path, out: Option<&Path>, descending: bool) -> CliResult<()> {
    let mut loaded = service.load(file)?;
    service.sort(&mut loaded.doc, descending)?;
    emit(service, &loaded.doc, out)
}

/// Write the document to `out`, or to stdout when no output file is given.
fn emit(service: &DocumentService, doc: &XmlDocument, out: Option<&Path>) -> CliResult<()> {
    match out {
        Some(path) => {
            service.save(doc, path)?;
            output::success(&format!("Written {}", path.display()));
        }
        None => {
            let rendered = service.render(doc)?;
            io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|e| InfraError::io("write document to stdout", e))?;
        }
    }
    Ok(())
}

fn print_report(report: &NormalizeReport) {
    if report.sorted {
        output::detail("collections sorted");
    }
    output::detail(&format!("{} empty nodes removed", report.nodes_removed));
    output::detail(&format!("{} extension lists split", report.extensions_split));
}

fn cmd_config(cli: &Cli, command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show { .. } => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            let global = match &cli.config_dir {
                Some(dir) => Some(config_file_in(dir)),
                None => global_config_path(),
            };
            match global {
                Some(path) => output::path_entry("global", &path),
                None => output::detail("global: no config directory available"),
            }
            output::path_entry("local", &local_config_path(Path::new(".")));
            output::detail("env: TSLKIT__* variables");
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
