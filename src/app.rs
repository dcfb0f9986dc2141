use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{ClientOptions, InventoryClient, DEFAULT_USER_AGENT};
use crate::config::{self, ConfigFile};
use crate::display::{Dashboard, DisplayContent, SequencingPolicy, Update, LOADING_TEXT};
use crate::output::{self, OutputFormat};

fn print_banner() {
    const BANNER: &str = r#"
                         _
   __   ___ __   ___ __ _(_) _____      __
   \ \ / / '_ \ / __|\ \ / / |/ _ \ \ /\ / /
    \ V /| |_) | (__  \ V /| |  __/\ V  V /
     \_/ | .__/ \___|  \_/ |_|\___| \_/\_/
         |_|
       v0.1.0 - VPC & subnet inventory viewer
    "#;
    eprint!("{}", BANNER);
    eprintln!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,vpcview={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    url: String,
    output: Option<String>,
    format: OutputFormat,
    proxy: Option<String>,
    user_agent: String,
    sequencing: SequencingPolicy,
    no_color: bool,
    interactive: bool,
    verbose: u8,
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    env_url: Option<String>,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let url = config::resolve_url(args.url, cfg.url, env_url);

    let output = args
        .output
        .or(cfg.output)
        .filter(|p| !p.trim().is_empty())
        .map(|p| config::expand_tilde_string(p.trim()));

    let format_raw = args.format.or(cfg.output_format);
    let format = match format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html, fragment, or json"))?,
        None => match output.as_deref() {
            Some(path) => output::infer_format_from_path(path).unwrap_or(OutputFormat::Html),
            None => OutputFormat::Fragment,
        },
    };

    let sequencing = match args.sequencing.or(cfg.sequencing) {
        Some(raw) => SequencingPolicy::parse(&raw).ok_or_else(|| {
            format!("invalid sequencing '{raw}', expected last-resolved or latest-request")
        })?,
        None => SequencingPolicy::default(),
    };

    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let user_agent = args
        .user_agent
        .or(cfg.user_agent)
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Ok(RunConfig {
        url,
        output,
        format,
        proxy,
        user_agent,
        sequencing,
        no_color,
        interactive: args.interactive,
        verbose: args.verbose,
    })
}

/// Writes the region to the output file, replacing its contents, or to `out`
/// when no file is configured.
async fn emit<W>(run: &RunConfig, content: &DisplayContent, out: &mut W) -> Result<(), String>
where
    W: AsyncWrite + Unpin,
{
    let rendered = output::render(content, run.format);
    match run.output.as_deref() {
        Some(path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
        }
        None => {
            out.write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            out.flush()
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
        }
    }
    Ok(())
}

fn report_update(update: Update, content: &DisplayContent) {
    match update {
        Update::Shown { generation } => match content {
            DisplayContent::Message(text) => eprintln!(
                "{}{}{} {} {}",
                "[".bold().white(),
                "ERR".bold().red(),
                "]".bold().white(),
                format!("#{generation}").bold().white(),
                text.bold().red()
            ),
            _ => eprintln!(
                "{}{}{} {} {}",
                "[".bold().white(),
                "OK".bold().green(),
                "]".bold().white(),
                format!("#{generation}").bold().white(),
                "inventory rendered".bold().white()
            ),
        },
        Update::Stale { generation } => eprintln!(
            "{}{}{} {} {}",
            "[".bold().white(),
            "SKIP".bold().yellow(),
            "]".bold().white(),
            format!("#{generation}").bold().white(),
            "superseded by a newer fetch".bold().white()
        ),
        Update::Lost { generation } => eprintln!(
            "{}{}{} {} {}",
            "[".bold().white(),
            "ERR".bold().red(),
            "]".bold().white(),
            format!("#{generation}").bold().white(),
            "fetch task ended without a response".bold().red()
        ),
    }
}

async fn run_once(run: &RunConfig, mut dashboard: Dashboard) -> Result<(), String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?,
    );
    pb.set_message(LOADING_TEXT);

    dashboard.trigger();
    let updates = dashboard.settle().await;
    pb.finish_and_clear();

    for update in updates {
        report_update(update, dashboard.region());
    }
    emit(run, dashboard.region(), &mut tokio::io::stdout()).await
}

/// Each input line triggers a fetch; `q` or end of input stops triggering,
/// and the loop then drains whatever is still in flight.
async fn run_interactive<R, W>(
    run: &RunConfig,
    dashboard: &mut Dashboard,
    input: R,
    out: &mut W,
) -> Result<(), String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut accepting = true;
    loop {
        let in_flight = dashboard.in_flight() > 0;
        if !accepting && !in_flight {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if accepting => {
                match line {
                    Ok(Some(line)) if line.trim().eq_ignore_ascii_case("q") => accepting = false,
                    Ok(Some(_)) => {
                        let generation = dashboard.trigger();
                        eprintln!(
                            "{}{}{} {} {}",
                            "[".bold().white(),
                            "*".bold().blue(),
                            "]".bold().white(),
                            format!("#{generation}").bold().white(),
                            LOADING_TEXT.bold().white()
                        );
                        emit(run, dashboard.region(), out).await?;
                    }
                    Ok(None) => accepting = false,
                    Err(e) => return Err(format!("failed to read input: {e}")),
                }
            }
            update = dashboard.next_update(), if in_flight => {
                if let Some(update) = update {
                    report_update(update, dashboard.region());
                    if let Update::Shown { .. } | Update::Lost { .. } = update {
                        emit(run, dashboard.region(), out).await?;
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    print_banner();
    format_kv_line("Endpoint", format_opt_value(&run.url, "(unset)"));
    format_kv_line(
        "Output",
        &format!(
            "{} ({})",
            run.output.as_deref().unwrap_or("stdout"),
            run.format.label()
        ),
    );
    format_kv_line(
        "Mode",
        &format!(
            "{} sequencing={}",
            if run.interactive { "interactive" } else { "once" },
            run.sequencing.label()
        ),
    );
    if let Some(proxy) = run.proxy.as_deref() {
        format_kv_line("Proxy", proxy);
    }
    eprintln!();

    let client = InventoryClient::new(ClientOptions {
        url: run.url.clone(),
        proxy: run.proxy.clone(),
        user_agent: run.user_agent.clone(),
    })
    .map_err(|e| e.to_string())?;
    let mut dashboard = Dashboard::new(client, run.sequencing);

    let now = Instant::now();
    if run.interactive {
        eprintln!(
            "{}",
            ":: press Enter to fetch the inventory, 'q' to quit ::"
                .bold()
                .white()
        );
        let stdin = BufReader::new(tokio::io::stdin());
        run_interactive(&run, &mut dashboard, stdin, &mut tokio::io::stdout()).await?;
    } else {
        run_once(&run, dashboard).await?;
    }

    eprintln!();
    eprintln!(
        ":: Completed :: took {}ms ::",
        now.elapsed().as_millis()
    );
    Ok(())
}

fn init_config(args: &CliArgs) -> Result<(), String> {
    let path = match args.config.as_deref() {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "could not determine home directory for config".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        println!("wrote default config to {}", path.display());
    } else {
        println!("config already exists at {}", path.display());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", e.render());
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

    if args.init_config {
        validation::validate(&args)?;
        return init_config(&args);
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg, config::url_from_env())?;
    if run.no_color {
        colored::control::set_override(false);
    }
    init_tracing(run.verbose);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
