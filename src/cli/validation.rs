use crate::cli::args::{CliArgs, Command};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    match &args.command {
        Command::Table(table) => {
            if let Some(raw) = table.page_size.as_deref() {
                crate::table::collection::parse_page_size(raw)
                    .map_err(|e| format!("invalid --page-size '{raw}': {e}"))?;
            }
            if let Some(raw) = table.page.as_deref() {
                crate::utils::parse_page_number(raw)
                    .map_err(|e| format!("invalid --page '{raw}': {e}"))?;
            }
            if let Some(window) = table.window_size {
                if window == 0 {
                    return Err("invalid --window, expected positive integer".to_string());
                }
            }
            if let Some(raw) = table.fields.as_deref() {
                crate::utils::parse_field_list_csv(raw)
                    .map_err(|e| format!("invalid --fields '{raw}': {e}"))?;
            }
            if let Some(raw) = table.columns.as_deref() {
                crate::utils::parse_field_list_csv(raw)
                    .map_err(|e| format!("invalid --columns '{raw}': {e}"))?;
            }
            if table.search.is_some() && table.filter.is_some() {
                return Err("--search and --filter cannot be combined".to_string());
            }
            if let Some(raw) = table.filter.as_deref() {
                crate::table::FieldFilter::parse(raw)
                    .map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
            }
            if let Some(raw) = table.format.as_deref() {
                crate::output::OutputFormat::parse(raw)
                    .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?;
            }
        }
        Command::Password(password) => {
            if let Some(raw) = password.format.as_deref() {
                crate::output::OutputFormat::parse(raw)
                    .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?;
            }
        }
        Command::Relay(relay) => {
            if relay.input.trim().is_empty() {
                return Err("--input must name a recording file".to_string());
            }
        }
    }
    Ok(())
}
