use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::{Path, PathBuf};
use tap_ledger::config::{ClockConfig, LedgerConfig};
use tap_ledger::snapshot::ProxySnapshot;
use tap_ledger::{Identity, LedgerAdmin, PriceFeed, PriceLedgerProxy, PriceQuery, Revision};
use tracing_subscriber::EnvFilter;

type Ledger = PriceLedgerProxy<ClockConfig>;

fn cli() -> Command {
    let day_args = |cmd: Command, prefix: &'static str| {
        let (m, d): (&'static str, &'static str) = match prefix {
            "from" => ("from-month", "from-day"),
            "to" => ("to-month", "to-day"),
            _ => ("month", "day"),
        };
        cmd.arg(
            Arg::new(m)
                .required(true)
                .value_parser(value_parser!(u32))
                .help("Month, 1-12"),
        )
        .arg(
            Arg::new(d)
                .required(true)
                .value_parser(value_parser!(u32))
                .help("Day of month"),
        )
    };

    Command::new("tap-ledger")
        .version(tap_ledger::VERSION)
        .about("Daily price ledger behind an upgradeable fixed identity")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Snapshot file, overrides the config"),
        )
        .arg(
            Arg::new("caller")
                .long("caller")
                .global(true)
                .help("Submitting identity: 0x-hex or a label hashed into one"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .value_parser(value_parser!(chrono::NaiveDate))
                .help("Pin the clock to this UTC date (YYYY-MM-DD)"),
        )
        .subcommand(
            Command::new("init")
                .about("Record the owner and install V1")
                .arg(Arg::new("owner").long("owner").help("Owner identity, defaults to the caller")),
        )
        .subcommand(day_args(Command::new("set").about("Set a day's price"), "").arg(
            Arg::new("price")
                .required(true)
                .value_parser(value_parser!(u64))
                .help("Price"),
        ))
        .subcommand(day_args(Command::new("get").about("Read a day's price"), ""))
        .subcommand(day_args(
            day_args(
                Command::new("avg").about("Floor average from one day through another"),
                "from",
            ),
            "to",
        ))
        .subcommand(
            Command::new("upgrade")
                .about("Install a later revision")
                .arg(
                    Arg::new("revision")
                        .required(true)
                        .value_parser(value_parser!(Revision))
                        .help("v2 or v3"),
                ),
        )
        .subcommand(
            Command::new("status").about("Show owner, revision and layout").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Print the raw snapshot"),
            ),
        )
        .subcommand(Command::new("verify-log").about("Check the event chain"))
}

/// `0x`-prefixed text must be a well-formed address; anything else is a label
fn parse_identity(text: &str) -> Result<Identity> {
    if text.starts_with("0x") {
        text.parse()
            .with_context(|| format!("malformed identity {text}"))
    } else {
        Ok(Identity::from_label(text))
    }
}

fn caller(args: &ArgMatches, config: &LedgerConfig) -> Result<Identity> {
    match args.get_one::<String>("caller") {
        Some(text) => parse_identity(text),
        None => config
            .owner
            .ok_or_else(|| anyhow!("no caller: pass --caller or set `owner` in the config")),
    }
}

fn day(args: &ArgMatches, name: &str) -> u32 {
    args.get_one::<u32>(name).copied().unwrap_or_default()
}

fn load(path: &Path, clock: ClockConfig) -> Result<Ledger> {
    if !path.exists() {
        tracing::debug!("no snapshot at {}, starting empty", path.display());
        return Ok(PriceLedgerProxy::with_clock(clock));
    }
    let snapshot = ProxySnapshot::load(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    Ok(PriceLedgerProxy::restore(snapshot, clock)?)
}

fn save(ledger: &Ledger, path: &Path) -> Result<()> {
    ledger
        .snapshot()
        .save(path)
        .with_context(|| format!("writing snapshot {}", path.display()))
}

/// Config file, then command-line overrides
fn resolve_config(matches: &ArgMatches) -> Result<LedgerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    if let Some(path) = matches.get_one::<PathBuf>("snapshot") {
        config.snapshot = path.clone();
    }
    if let Some(date) = matches.get_one::<chrono::NaiveDate>("today") {
        config.clock = ClockConfig::Fixed { date: *date };
    }
    Ok(config)
}

/// Apply one command to the snapshot named by `config`
fn execute(matches: &ArgMatches, config: &LedgerConfig, out: &mut impl Write) -> Result<()> {
    let mut ledger = load(&config.snapshot, config.clock)?;

    match matches.subcommand() {
        Some(("init", args)) => {
            let owner = match args.get_one::<String>("owner") {
                Some(o) => parse_identity(o)?,
                None => caller(args, config)?,
            };
            ledger.initialize(owner)?;
            save(&ledger, &config.snapshot)?;
            writeln!(out, "initialized, owner {owner}, revision {}", Revision::V1)?;
        }
        Some(("set", args)) => {
            let who = caller(args, config)?;
            let price = args.get_one::<u64>("price").copied().unwrap_or_default();
            let write = ledger.set_price(&who, day(args, "month"), day(args, "day"), price)?;
            save(&ledger, &config.snapshot)?;
            match write.previous {
                Some(prev) => writeln!(out, "{} = {} (was {prev})", write.key, write.price)?,
                None => writeln!(out, "{} = {}", write.key, write.price)?,
            }
        }
        Some(("get", args)) => {
            writeln!(out, "{}", ledger.get_price(day(args, "month"), day(args, "day"))?)?;
        }
        Some(("avg", args)) => {
            let avg = ledger.average_price_from_to(
                day(args, "from-month"),
                day(args, "from-day"),
                day(args, "to-month"),
                day(args, "to-day"),
            )?;
            writeln!(out, "{avg}")?;
        }
        Some(("upgrade", args)) => {
            let who = caller(args, config)?;
            let target = args
                .get_one::<Revision>("revision")
                .copied()
                .ok_or_else(|| anyhow!("missing revision"))?;
            let installed = ledger.upgrade(&who, target.module())?;
            save(&ledger, &config.snapshot)?;
            writeln!(out, "revision {installed} installed")?;
        }
        Some(("status", args)) => {
            if args.get_flag("json") {
                writeln!(out, "{}", ledger.snapshot().to_json()?)?;
                return Ok(());
            }
            writeln!(out, "API:      {}", ledger.api_version())?;
            match ledger.revision() {
                None => writeln!(out, "not initialized")?,
                Some(rev) => {
                    writeln!(out, "Revision: {rev}")?;
                    writeln!(out, "Owner:    {}", ledger.owner()?)?;
                    if let Some(layout) = ledger.layout() {
                        writeln!(
                            out,
                            "Layout:   {} v{} ({})",
                            layout.name,
                            layout.version,
                            layout.fingerprint().short()
                        )?;
                    }
                    writeln!(out, "Priced:   {} days", ledger.priced_days()?)?;
                    writeln!(out, "Events:   {}", ledger.events().len())?;
                }
            }
        }
        Some(("verify-log", _)) => {
            ledger.events().verify_integrity()?;
            writeln!(out, "event log VALID, {} events", ledger.events().len())?;
        }
        _ => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = resolve_config(&matches)?;
    execute(&matches, &config, &mut std::io::stdout().lock())
}
