use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vpcview",
    version,
    about = "VPC and subnet inventory viewer",
    long_about = "vpcview fetches a VPC and subnet inventory document from an HTTP endpoint and renders it as HTML tables.\n\nThe endpoint is taken from --url, then the config file, then the INVENTORY_API_URL environment variable.\n\nExamples:\n  vpcview -u https://api.example.com/inventory\n  vpcview -u https://api.example.com/inventory -o inventory.html\n  INVENTORY_API_URL=https://api.example.com/inventory vpcview --interactive\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered inventory to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'F',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: html, fragment, json (inferred from --output when omitted)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Inventory endpoint URL."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.vpcview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if missing) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Route the inventory request through this proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "ua",
        visible_alias = "user-agent",
        value_name = "UA",
        help_heading = "HTTP",
        help = "User-Agent header sent with the request."
    )]
    pub user_agent: Option<String>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Mode",
        help = "Fetch on every Enter press until 'q' or end of input."
    )]
    pub interactive: bool,

    #[arg(
        long = "seq",
        visible_alias = "sequencing",
        value_name = "POLICY",
        help_heading = "Mode",
        help = "How overlapping fetches are shown: last-resolved (default) or latest-request."
    )]
    pub sequencing: Option<String>,
}
