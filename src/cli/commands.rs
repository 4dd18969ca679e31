use std::io;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::PayrollService;
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::earnings::DateFilter;
use crate::domain::entities::{Employee, EmployeePayrollRun, Group};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
    let config_dir = cli.config_dir.clone().unwrap_or_else(|| cwd.clone());

    let command = match &cli.command {
        Some(command) => command,
        None => {
            return Err(CliError::Usage(
                "no command given, see `hris-forest --help`".to_string(),
            ))
        }
    };

    match command {
        Commands::Completion { shell } => {
            _completion(*shell);
            Ok(())
        }
        Commands::Config { command } => _config(command, &config_dir),
        Commands::Groups {
            file,
            types,
            output: target,
        } => {
            let container = load_container(&config_dir)?;
            _groups(&container, file, types, target.as_deref())
        }
        Commands::Employees {
            file,
            output: target,
        } => {
            let container = load_container(&config_dir)?;
            _employees(&container, file, target.as_deref())
        }
        Commands::Earnings {
            file,
            employee,
            start,
            end,
            check_date,
            labels,
            categories,
            json,
            output: target,
        } => {
            let container = load_container(&config_dir)?;
            let request = EarningsRequest {
                employee: employee.as_deref(),
                start: *start,
                end: *end,
                date_filter: check_date.then_some(DateFilter::CheckDate),
                labels: labels.as_deref(),
                categories: categories.as_deref(),
                json: *json,
            };
            _earnings(&container, file, &request, &cwd, target.as_deref())
        }
    }
}

fn load_container(config_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(config_dir))?;
    debug!(?settings, "effective settings");
    Ok(ServiceContainer::new(settings))
}

/// Write to `target` if given, otherwise to stdout.
fn emit(fs: &dyn FileSystem, content: &str, target: Option<&Path>) -> CliResult<()> {
    match target {
        Some(path) => {
            fs.ensure_parent(path)
                .with_path_context("create output directory", path)?;
            fs.write(path, content)
                .with_path_context("write output", path)?;
            output::success(&format!("Wrote {}", path.display()));
        }
        None => output::plain(content),
    }
    Ok(())
}

#[instrument(skip(container))]
fn _groups(
    container: &ServiceContainer,
    file: &Path,
    types: &[String],
    target: Option<&Path>,
) -> CliResult<()> {
    let groups: Vec<Group> = container.records.load(file)?;
    let service = container.hierarchy_service();
    let partitions = service.group_forests(&groups, types)?;
    if partitions.is_empty() && !types.is_empty() {
        output::warning(&format!("no groups of type {}", types.join(", ")));
    }
    emit(
        container.fs.as_ref(),
        &service.render_groups(&partitions),
        target,
    )
}

#[instrument(skip(container))]
fn _employees(container: &ServiceContainer, file: &Path, target: Option<&Path>) -> CliResult<()> {
    let employees: Vec<Employee> = container.records.load(file)?;
    let service = container.hierarchy_service();
    let forest = service.employee_forest(&employees)?;
    emit(
        container.fs.as_ref(),
        &service.render_employees(&forest),
        target,
    )
}

#[derive(Debug)]
struct EarningsRequest<'a> {
    employee: Option<&'a str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    date_filter: Option<DateFilter>,
    labels: Option<&'a Path>,
    categories: Option<&'a Path>,
    json: bool,
}

#[instrument(skip(container))]
fn _earnings(
    container: &ServiceContainer,
    file: &Path,
    request: &EarningsRequest<'_>,
    cwd: &Path,
    target: Option<&Path>,
) -> CliResult<()> {
    let runs: Vec<EmployeePayrollRun> = container.records.load(file)?;
    let service =
        container.payroll_service(request.labels, request.categories, request.date_filter, cwd)?;
    let window = PayrollService::resolve_window(request.start, request.end, Utc::now().date_naive())?;
    debug!(filter = ?service.date_filter(), "summarizing earnings");

    let summary = service.summarize(&runs, window, request.employee);
    if summary.current.run_count == 0 && summary.prior.run_count == 0 {
        output::warning("no payroll runs fall into either fiscal year");
    }

    let rendered = if request.json {
        PayrollService::to_json(&summary)? + "\n"
    } else {
        PayrollService::render_text(&summary)
    };
    emit(container.fs.as_ref(), &rendered, target)
}

#[instrument]
fn _config(command: &ConfigCommands, config_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(config_dir))?;
            output::plain(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", describe(&path))),
                None => output::detail("global: (no config directory available)"),
            }
            output::detail(&format!(
                "local:  {}",
                describe(&local_config_path(config_dir))
            ));
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(config_dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .with_path_context("create config directory", &path)?;
            fs.write(&path, &Settings::template())
                .with_path_context("write config template", &path)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
