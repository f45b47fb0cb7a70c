use crate::config::Config;
use crate::entry::EntryDraft;
use crate::ledger::Ledger;

use clap::{arg, ArgMatches, Command};
use eyre::WrapErr;
use log::{error, info, warn};

mod aggregate;
mod config;
mod dashboard;
mod entry;
mod error;
mod format;
mod ledger;
mod period;
mod store;
mod tui;

const REPORTS: [(&str, &str); 8] = [
    ("summary", "Show invested amount, current value and portfolio health"),
    ("growth", "Show cumulative invested amount and current value per month"),
    ("profit", "Show the profit attributed to each month"),
    ("allocation", "Show how the invested amount is split across funds"),
    ("returns", "Compare the returns of every fund"),
    ("yearly", "Show invested amount and profit per year"),
    ("table", "Show the fund by month investment table"),
    ("json", "Print every dashboard view-model as JSON"),
];

fn file_arg() -> clap::Arg {
    arg!(<FILE> "JSON file with your entries")
        .required(false)
        .default_value("")
}

fn cli() -> Command {
    let mut cmd = Command::new("sip_tracker")
        .about("Track periodic fund investments and how they grow")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"));

    for (name, about) in REPORTS {
        cmd = cmd.subcommand(Command::new(name).about(about).arg(file_arg()));
    }

    cmd.subcommand(
        Command::new("add")
            .about("Record a new entry")
            .arg(arg!(--fund <NAME> "Fund name").required(true))
            .arg(arg!(--invested <AMOUNT> "Amount invested this month").required(true))
            .arg(arg!(--current <AMOUNT> "Total current value of the fund").required(true))
            .arg(arg!(--year <YEAR> "Year of the entry").required(true))
            .arg(arg!(--month <MONTH> "Month of the entry (Jan..Dec)").required(true))
            .arg(file_arg()),
    )
    .subcommand(
        Command::new("export")
            .about("Write all entries to a JSON file for backup")
            .arg(arg!(-o --output <PATH> "Destination file").required(false))
            .arg(file_arg()),
    )
    .subcommand(
        Command::new("tui")
            .about("Open the interactive dashboard")
            .arg(
                arg!(--tab <TAB> "Tab to open first (overview, growth, funds, details)")
                    .required(false),
            )
            .arg(file_arg()),
    )
}

fn file_from(matches: &ArgMatches) -> Option<String> {
    matches
        .try_get_one::<String>("FILE")
        .ok()
        .flatten()
        .filter(|f| !f.is_empty())
        .cloned()
}

fn draft_from(matches: &ArgMatches) -> EntryDraft {
    let field = |name: &str| {
        matches
            .get_one::<String>(name)
            .cloned()
            .unwrap_or_default()
    };
    EntryDraft {
        fund_name: field("fund"),
        invested: field("invested"),
        current: field("current"),
        year: field("year"),
        month: field("month"),
    }
}

async fn run(name: &str, matches: &ArgMatches, cfg: &Config) -> eyre::Result<()> {
    let file = file_from(matches);
    let store = cfg
        .open_store(file.as_deref())
        .wrap_err("Failed to open the entry store")?;

    let (mut ledger, load_error) = Ledger::load_or_empty(&store).await;
    if let Some(e) = &load_error {
        eprintln!("Error loading entries: {e}");
    }

    let settings = cfg.settings();
    let currency = cfg.currency.as_str();

    match name {
        "add" => {
            if load_error.is_some() {
                eyre::bail!("Refusing to add an entry while the store cannot be read");
            }
            let entry = ledger.add(&store, &draft_from(matches)).await?;
            println!(
                "Added {} for {}: invested {}, current {}",
                entry.period(),
                entry.get_fund_name(),
                format::format_currency(entry.get_invested(), currency),
                format::format_currency(entry.get_current(), currency),
            );
        }
        "export" => {
            let output = matches
                .get_one::<String>("output")
                .cloned()
                .unwrap_or_else(|| cfg.export_file.clone());
            store::write_json(std::path::Path::new(&output), ledger.entries())
                .await
                .wrap_err_with(|| format!("Failed to export to {output}"))?;
            info!("Exported {} entries to {output}", ledger.entries().len());
            println!("Exported {} entries to {output}", ledger.entries().len());
        }
        "tui" => {
            let tab = matches
                .get_one::<String>("tab")
                .and_then(|t| tui::Tab::from_name(t));
            let startup_error = load_error.map(|e| e.to_string());
            tui::run_tui(ledger, store, cfg.clone(), tab, startup_error).await?;
        }
        report => {
            let dashboard = ledger.dashboard(&settings);
            match report {
                "summary" => dashboard.print_summary(currency),
                "growth" => dashboard.print_growth(currency),
                "profit" => dashboard.print_profit(currency),
                "allocation" => {
                    dashboard.draw_pie_chart();
                    dashboard.print_allocation(currency);
                }
                "returns" => dashboard.print_returns(currency),
                "yearly" => dashboard.print_yearly(currency),
                "table" => dashboard.print_table(currency),
                "json" => println!("{}", dashboard.to_json()?),
                _ => (),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    env_logger::init();

    let cfg = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {e}");
        Config::default()
    });

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("config", _)) => {
            let path = Config::path().wrap_err("Failed to locate the config file")?;
            println!("Your config file is located here: \n{}", path.display());
        }
        Some((name, sub_matches)) => {
            if let Err(e) = run(name, sub_matches, &cfg).await {
                error!("{name} failed: {e:#}");
                return Err(e);
            }
        }
        None => cli().print_help()?,
    }
    Ok(())
}
