use std::num::NonZeroUsize;

use clap::{error::ErrorKind, CommandFactory, Parser};
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::args::{CliArgs, Command, PasswordArgs, RelayArgs, TableArgs};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::dataset::{self, ItemSource};
use crate::output::{self, console, OutputFormat};
use crate::password;
use crate::relay::replay::ReplayClient;
use crate::relay::transport::ConnectOptions;
use crate::relay::{PageEvent, RealtimeEventRelay};
use crate::table::collection::{self, PaginatedCollection, DEFAULT_PAGE_SIZE};
use crate::table::controls::{ControlLabels, DEFAULT_WINDOW_SIZE};
use crate::table::FieldFilter;

#[derive(Debug, Clone, PartialEq)]
enum Selection {
    All,
    Search { query: String, fields: Vec<String> },
    Filter(String),
}

#[derive(Debug, Clone)]
struct TableRun {
    input: String,
    selection: Selection,
    page_size: NonZeroUsize,
    page: usize,
    window_size: usize,
    columns: Vec<String>,
    labels: ControlLabels,
    output: Option<String>,
    output_format: OutputFormat,
}

#[derive(Debug, Clone)]
struct PasswordRun {
    password: Option<String>,
    output_format: OutputFormat,
}

#[derive(Debug, Clone)]
struct RelayRun {
    input: String,
    join: Option<Value>,
    options: ConnectOptions,
}

#[derive(Debug, Clone)]
enum RunCommand {
    Table(TableRun),
    Password(PasswordRun),
    Relay(RelayRun),
}

#[derive(Debug, Clone)]
struct RunConfig {
    no_color: bool,
    verbose: u8,
    command: RunCommand,
}

fn resolve_format(
    flag: Option<&str>,
    cfg: Option<&str>,
    output_path: Option<&str>,
) -> Result<OutputFormat, String> {
    if let Some(raw) = flag {
        return OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"));
    }
    if let Some(format) = output_path.and_then(output::infer_format_from_path) {
        return Ok(format);
    }
    match cfg {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output_format '{raw}' in config")),
        None => Ok(OutputFormat::Text),
    }
}

/// Shop ids are sent as JSON numbers when they look like one.
fn parse_shop_id(raw: &str) -> Value {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(raw.to_string()),
    }
}

fn build_table_run(args: TableArgs, cfg: &ConfigFile) -> Result<TableRun, String> {
    let page_size = match args.page_size.as_deref() {
        Some(raw) => collection::parse_page_size(raw)
            .map_err(|e| format!("invalid --page-size '{raw}': {e}"))?,
        None => match cfg.page_size {
            Some(n) => NonZeroUsize::new(n)
                .ok_or_else(|| "invalid page_size in config, expected positive integer".to_string())?,
            None => DEFAULT_PAGE_SIZE,
        },
    };
    let page = match args.page.as_deref() {
        Some(raw) => crate::utils::parse_page_number(raw)
            .map_err(|e| format!("invalid --page '{raw}': {e}"))?,
        None => 1,
    };
    let window_size = args
        .window_size
        .or(cfg.window_size)
        .unwrap_or(DEFAULT_WINDOW_SIZE);
    if window_size == 0 {
        return Err("invalid window_size in config, expected positive integer".to_string());
    }

    let search_fields = match args.fields.as_deref() {
        Some(raw) => crate::utils::parse_field_list_csv(raw)
            .map_err(|e| format!("invalid --fields '{raw}': {e}"))?,
        None => cfg.search_fields.clone().unwrap_or_default(),
    };
    let columns = match args.columns.as_deref() {
        Some(raw) => crate::utils::parse_field_list_csv(raw)
            .map_err(|e| format!("invalid --columns '{raw}': {e}"))?,
        None => cfg.columns.clone().unwrap_or_default(),
    };

    let selection = match (args.search, args.filter) {
        (Some(query), None) => {
            if search_fields.is_empty() && !query.is_empty() {
                return Err(
                    "--search needs --fields (or search_fields in the config file)".to_string(),
                );
            }
            Selection::Search {
                query,
                fields: search_fields,
            }
        }
        (None, Some(filter)) => Selection::Filter(filter),
        (None, None) => Selection::All,
        (Some(_), Some(_)) => {
            return Err("--search and --filter cannot be combined".to_string());
        }
    };

    let output_format = resolve_format(
        args.format.as_deref(),
        cfg.output_format.as_deref(),
        args.output.as_deref(),
    )?;

    Ok(TableRun {
        input: args.input,
        selection,
        page_size,
        page,
        window_size,
        columns,
        labels: cfg.labels.clone().unwrap_or_default(),
        output: args.output,
        output_format,
    })
}

fn build_password_run(args: PasswordArgs, cfg: &ConfigFile) -> Result<PasswordRun, String> {
    let output_format = resolve_format(args.format.as_deref(), cfg.output_format.as_deref(), None)?;
    Ok(PasswordRun {
        password: args.password,
        output_format,
    })
}

fn build_relay_run(args: RelayArgs, cfg: &ConfigFile) -> RelayRun {
    RelayRun {
        input: args.input,
        join: args.join.as_deref().map(parse_shop_id),
        options: cfg
            .reconnect
            .as_ref()
            .map(|r| r.to_options())
            .unwrap_or_default(),
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let command = match args.command {
        Command::Table(table) => RunCommand::Table(build_table_run(table, &cfg)?),
        Command::Password(pw) => RunCommand::Password(build_password_run(pw, &cfg)?),
        Command::Relay(relay) => RunCommand::Relay(build_relay_run(relay, &cfg)),
    };

    Ok(RunConfig {
        no_color,
        verbose: args.verbose,
        command,
    })
}

async fn write_output(path: Option<&str>, rendered: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => {
            let path = config::expand_tilde_string(path);
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .await
                .map_err(|e| format!("failed to open output file '{path}': {e}"))?;
            outfile
                .write_all(rendered)
                .await
                .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
            console::info(&format!("wrote {path}"));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
        }
    }
    Ok(())
}

fn select_page(run: &TableRun, items: Vec<Value>) -> Result<PaginatedCollection<Value>, String> {
    let mut collection = PaginatedCollection::new(items);
    collection.set_page_size(run.page_size);
    match &run.selection {
        Selection::All => {}
        Selection::Search { query, fields } => collection.search(query, fields),
        Selection::Filter(raw) => {
            let filter = FieldFilter::parse(raw).map_err(|e| format!("invalid --filter: {e}"))?;
            collection.filter(|item| filter.matches(item));
        }
    }
    if run.page != 1 && !collection.go_to_page(run.page) {
        console::warn(&format!(
            "page {} is out of range ({} pages), showing page 1",
            run.page,
            collection.total_pages()
        ));
    }
    Ok(collection)
}

async fn run_table(run: TableRun) -> Result<(), String> {
    let items = dataset::load_items(&ItemSource::FilePath(run.input.clone()))
        .await
        .map_err(|e| e.to_string())?;
    console::debug(&format!("loaded {} items from {}", items.len(), run.input));

    let collection = select_page(&run, items)?;
    if console::verbosity() > 0 {
        console::kv_line("Items", &collection.len().to_string());
        console::kv_line("Matching", &collection.filtered_len().to_string());
        console::kv_line("Page size", &collection.page_size().to_string());
    }

    let page = output::build_page(&collection, &run.columns, run.window_size, &run.labels);
    let rendered = match run.output_format {
        OutputFormat::Text => output::render_text(&page),
        OutputFormat::Json => output::render_json(&page),
        OutputFormat::Html => output::render_html(&page),
    };
    write_output(run.output.as_deref(), &rendered).await
}

fn render_verdict(verdict: &password::Verdict, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => output::render_verdict_text(verdict),
        OutputFormat::Json => {
            let mut line = serde_json::to_string(verdict).unwrap_or_else(|_| "{}".to_string());
            line.push('\n');
            line
        }
        OutputFormat::Html => password::meter::render_meter(verdict),
    }
}

async fn run_password(run: PasswordRun) -> Result<(), String> {
    if let Some(pw) = run.password.as_deref() {
        let verdict = password::evaluate(pw);
        return write_output(None, render_verdict(&verdict, run.output_format).as_bytes()).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read stdin: {e}"))?
    {
        let verdict = password::evaluate(&line);
        write_output(None, render_verdict(&verdict, run.output_format).as_bytes()).await?;
    }
    Ok(())
}

async fn print_page_events(
    mut page_events: mpsc::UnboundedReceiver<PageEvent>,
) -> Result<usize, String> {
    let mut relayed = 0usize;
    let mut stdout = tokio::io::stdout();
    while let Some(page_event) = page_events.recv().await {
        let mut line = serde_json::to_string(&page_event)
            .map_err(|e| format!("failed to encode page event: {e}"))?;
        line.push('\n');
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| format!("failed to write to stdout: {e}"))?;
        relayed += 1;
    }
    stdout
        .flush()
        .await
        .map_err(|e| format!("failed to write to stdout: {e}"))?;
    Ok(relayed)
}

async fn run_relay(run: RelayRun) -> Result<(), String> {
    let path = config::expand_tilde_string(&run.input);
    let client = ReplayClient::from_path(&path)
        .await
        .map_err(|e| e.to_string())?;

    let mut relay = RealtimeEventRelay::new(client, run.options);
    let printer = tokio::spawn(print_page_events(relay.subscribe()));
    let transport = relay.start().map_err(|e| e.to_string())?;
    if let Some(shop_id) = run.join.as_ref() {
        relay.join_shop(shop_id).map_err(|e| e.to_string())?;
    }

    relay.run(transport).await;

    if let Some(shop_id) = run.join.as_ref() {
        relay.leave_shop(shop_id).map_err(|e| e.to_string())?;
    }
    let reconnects = relay.client().reconnects();
    let pending = relay.reconnect_attempts();
    // closes the subscriber stream so the printer finishes
    drop(relay);

    let relayed = printer
        .await
        .map_err(|e| format!("page event printer failed: {e}"))??;
    console::info(&format!(
        "relayed {relayed} page events ({reconnects} server reconnects, {pending} pending connection errors)"
    ));
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        console::disable_color();
    }
    console::set_verbosity(run.verbose);

    match run.command {
        RunCommand::Table(table) => run_table(table).await,
        RunCommand::Password(pw) => run_password(pw).await,
        RunCommand::Relay(relay) => run_relay(relay).await,
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{e}");
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
