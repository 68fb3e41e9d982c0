//! Command dispatch: maps parsed arguments onto application services

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, QueryCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Dimension, DimensionStats, Item};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `skillmix --help`".into(),
        ));
    };

    if let Commands::Completion { shell } = command {
        print_completions(*shell);
        return Ok(());
    }

    let settings = Settings::load(cli.data_dir.as_deref())?;
    debug!("data_dir: {}", settings.data_dir.display());
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Validate { files } => cmd_validate(&container, files),
        Commands::Stats { path } => cmd_stats(&container, path.as_deref()),
        Commands::Tree { file, depth } => cmd_tree(&container, file, *depth),
        Commands::Query { file, command } => cmd_query(&container, file, command),
        Commands::Build {
            request,
            output: out,
        } => cmd_build(&container, request, out.as_deref()),
        Commands::Combine {
            selection,
            count,
            limit,
            all,
        } => cmd_combine(&container, selection, *count, *limit, *all),
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(level = "debug", skip(container))]
fn cmd_validate(container: &ServiceContainer, files: &[std::path::PathBuf]) -> CliResult<()> {
    let mut first_error: Option<ApplicationError> = None;
    let mut failed = 0;

    for file in files {
        match container.catalog.load_file(file) {
            Ok(dim) => output::success(&format!(
                "{} ({}, {} items)",
                file.display(),
                dim.dimension_type(),
                dim.len()
            )),
            Err(e) => {
                output::failure(&format!("{}: {}", file.display(), e));
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => {
            output::warning(&format!("{} of {} files invalid", failed, files.len()));
            Err(e.into())
        }
        None => Ok(()),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_stats(container: &ServiceContainer, path: Option<&Path>) -> CliResult<()> {
    let path = path.unwrap_or(container.settings.data_dir.as_path());

    if container.fs.is_dir(path) {
        let catalog = container.catalog.load_dir(path)?;
        if catalog.is_empty() {
            output::warning(&format!("no dimensions in {}", path.display()));
        }
        for (file, dim) in catalog.entries() {
            print_stats(dim, file);
        }
    } else {
        let dim = container.catalog.load_file(path)?;
        print_stats(&dim, path);
    }
    Ok(())
}

fn print_stats(dim: &Dimension, file: &Path) {
    let stats = DimensionStats::compute(dim);
    output::header(&format!("{} ({})", stats.dimension, file.display()));
    output::detail(&format!("total items: {}", stats.total_items));
    for (depth, count) in &stats.items_by_depth {
        output::detail(&format!(
            "depth {} ({}): {}",
            depth,
            dim.hierarchy().level_label(*depth),
            count
        ));
    }
    output::detail(&format!("leaf nodes: {}", stats.leaf_nodes));
    output::detail(&format!("max children: {}", stats.max_children));
    output::detail(&format!(
        "avg children per parent: {:.2}",
        stats.average_children_per_parent
    ));
    if stats.declared_max_depth != stats.observed_max_depth {
        output::warning(&format!(
            "{}: declared max_depth {} but items reach depth {}",
            stats.dimension, stats.declared_max_depth, stats.observed_max_depth
        ));
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, file: &Path, depth: Option<usize>) -> CliResult<()> {
    let dim = container.catalog.load_file(file)?;
    let max_depth = depth.unwrap_or(usize::MAX);
    let leaves: Vec<_> = dim
        .items_at_depth(0)
        .into_iter()
        .map(|root| item_tree(&dim, root, max_depth))
        .collect();
    let tree = Tree::new(dim.dimension_type().to_string()).with_leaves(leaves);
    output::info(&tree);
    Ok(())
}

fn item_tree(dim: &Dimension, item: &Item, max_depth: usize) -> Tree<String> {
    let leaves: Vec<_> = if item.depth < max_depth {
        dim.children(&item.id)
            .into_iter()
            .map(|child| item_tree(dim, child, max_depth))
            .collect()
    } else {
        Vec::new()
    };
    Tree::new(item.name.clone()).with_leaves(leaves)
}

#[instrument(level = "debug", skip(container))]
fn cmd_query(container: &ServiceContainer, file: &Path, command: &QueryCommands) -> CliResult<()> {
    let dim = container.catalog.load_file(file)?;
    let found = match command {
        QueryCommands::At { depth } => dim.items_at_depth(*depth),
        QueryCommands::Upto { depth } => dim.items_up_to_depth(*depth),
        QueryCommands::From { depth } => dim.items_from_depth(*depth),
        QueryCommands::Children { parent_id, depth } => dim.children_at_depth(parent_id, *depth),
        QueryCommands::Descendants { parent_id } => dim.all_descendants(parent_id),
        QueryCommands::Ancestors { item_id } => dim.ancestors(item_id),
        QueryCommands::Expand { item_id, depth } => dim.expand_to_depth(item_id, *depth),
    };
    debug!("query matched {} items", found.len());
    for item in found {
        output::info(&item.id);
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_build(container: &ServiceContainer, request: &Path, out: Option<&Path>) -> CliResult<()> {
    let dim = container.build.build_file(request)?;
    let pretty = container.settings.output.pretty;
    match out {
        Some(path) => {
            container.catalog.save_file(path, &dim, pretty)?;
            output::action(
                "Built",
                &format!("{} ({} items) -> {}", dim.dimension_type(), dim.len(), path.display()),
            );
        }
        None => {
            let json = dim.to_json_string(pretty).map_err(ApplicationError::from)?;
            output::info(&json);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_combine(
    container: &ServiceContainer,
    selection: &Path,
    count: bool,
    limit: Option<usize>,
    all: bool,
) -> CliResult<()> {
    let requests = container.scenario.load_selection(selection)?;
    let catalog = container.catalog.load_dir(&container.settings.data_dir)?;
    let summary = container.scenario.summarize(&catalog, &requests)?;

    if count {
        output::header("Selections");
        for (tag, n) in &summary.selections {
            output::detail(&format!("{tag}: {n}"));
        }
        match summary.total {
            Some(total) => output::action("Combinations", &total),
            None => output::warning("combination count overflows"),
        }
        return Ok(());
    }

    let limit = if all {
        None
    } else {
        Some(limit.unwrap_or(container.settings.combine.preview_limit))
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = container
        .scenario
        .write_json_lines(&catalog, &requests, limit, &mut out)?;
    out.flush()
        .map_err(|e| InfraError::io("flush stdout", e))?;

    if let Some(total) = summary.total {
        if written < total {
            output::warning(&format!("showing {written} of {total} combinations"));
        }
    }
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => print_config_path("global", &path),
                None => output::warning("no global config directory on this platform"),
            }
            print_config_path("local", &local_config_path(&container.settings.data_dir));
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
    }
    Ok(())
}

fn print_config_path(label: &str, path: &Path) {
    if path.exists() {
        output::success(&format!("{label}: {}", path.display()));
    } else {
        output::detail(&format!("{label}: {} (not found)", path.display()));
    }
}
