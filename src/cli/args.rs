use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "storeview",
    version,
    about = "storefront back-office table, password and push-event tool",
    long_about = "Storeview pages, searches and filters item lists, scores passwords and relays storefront push events.\n\nExamples:\n  storeview table -i orders.json --search alice --fields customer.name,order_number\n  storeview table -i products.yml --filter status=^active$ --format html -o products.html\n  storeview password 'Abcdefgh1!'\n  storeview relay -i session.jsonl --join 4\n\nTip: Use --config to persist page size, columns and labels between runs."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        visible_alias = "cfg",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.storeview/config.yml)."
    )]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Page, search and filter a list of items.
    Table(TableArgs),
    /// Score password strength.
    Password(PasswordArgs),
    /// Replay recorded push events and print the page events they produce.
    Relay(RelayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    #[arg(
        short = 'i',
        long = "input",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Items file (.json, .jsonl or .yml)."
    )]
    pub input: String,

    #[arg(
        short = 'q',
        long = "search",
        value_name = "QUERY",
        help_heading = "Search",
        help = "Case-insensitive text to look for in --fields."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'f',
        long = "fields",
        visible_alias = "search-fields",
        value_name = "PATHS",
        help_heading = "Search",
        help = "Comma-separated field paths searched by --search (e.g. name,customer.name)."
    )]
    pub fields: Option<String>,

    #[arg(
        short = 'F',
        long = "filter",
        value_name = "PATH=REGEX",
        help_heading = "Search",
        help = "Keep items whose field matches the regex (replaces --search)."
    )]
    pub filter: Option<String>,

    #[arg(
        short = 's',
        long = "page-size",
        visible_alias = "per-page",
        value_name = "N",
        help_heading = "Paging",
        help = "Items per page."
    )]
    pub page_size: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Paging",
        help = "Page to show (1-based)."
    )]
    pub page: Option<String>,

    #[arg(
        short = 'w',
        long = "window",
        visible_alias = "max-buttons",
        value_name = "N",
        help_heading = "Paging",
        help = "Numbered page buttons shown around the current page."
    )]
    pub window_size: Option<usize>,

    #[arg(
        short = 'c',
        long = "columns",
        value_name = "PATHS",
        help_heading = "Output",
        help = "Comma-separated field paths shown as table columns."
    )]
    pub columns: Option<String>,

    #[arg(
        short = 'A',
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json or html)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the page to a file instead of stdout."
    )]
    pub output: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PasswordArgs {
    #[arg(
        value_name = "PASSWORD",
        help = "Password to score (reads one password per stdin line when omitted)."
    )]
    pub password: Option<String>,

    #[arg(
        short = 'A',
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json or html)."
    )]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    #[arg(
        short = 'i',
        long = "input",
        visible_alias = "events",
        value_name = "FILE",
        help_heading = "Input",
        help = "Recorded transport events, one JSON object per line."
    )]
    pub input: String,

    #[arg(
        short = 'j',
        long = "join",
        value_name = "SHOP_ID",
        help_heading = "Input",
        help = "Join this shop's channel after connecting."
    )]
    pub join: Option<String>,
}
