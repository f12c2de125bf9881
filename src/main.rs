// Fri Feb 6 2026 - Alex

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use memsift::{
    Alignment, Config, MatchStore, NarrowPredicate, Needle, RangeBounds, RegionSet, RegionView,
    ScanEngine, ScanPredicate,
};
use regex::Regex;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "Search-and-narrow value scanner for live processes", long_about = None)]
struct Args {
    /// Target process id (must be stopped, e.g. under a debugger or SIGSTOP)
    #[arg(short, long)]
    pid: i32,

    /// Value to search for
    value: String,

    /// Initial comparison: eq, ne, lt, le, gt or ge
    #[arg(short = 'c', long, default_value = "eq")]
    compare: String,

    /// Upper bound; turns the initial comparison into a range scan
    #[arg(long)]
    upper: Option<String>,

    /// Range boundary handling: gt_lt, ge_lt, gt_le or ge_le
    #[arg(long, default_value = "ge_le")]
    bounds: String,

    /// Step one byte at a time instead of one native word
    #[arg(short, long)]
    unaligned: bool,

    /// Keep only regions whose pathname equals this
    #[arg(long)]
    filter_pathname: Option<String>,

    /// Keep only regions whose file basename equals this
    #[arg(long)]
    filter_basename: Option<String>,

    /// Keep only regions whose pathname matches this regular expression
    #[arg(long)]
    filter_regex: Option<String>,

    /// Invert the region filter
    #[arg(long)]
    invert: bool,

    /// Follow-up narrow passes, e.g. "decreased", "eq:40" or "range:10:20:ge_le"
    #[arg(long = "then")]
    then: Vec<String>,

    /// Optional JSON config file; command-line flags win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cap on printed matches
    #[arg(long, default_value_t = 100)]
    max_report: usize,

    #[arg(long)]
    no_progress: bool,

    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    config.pid = Some(args.pid);
    config.unaligned = config.unaligned || args.unaligned;
    config.invert_filter = config.invert_filter || args.invert;
    config.max_report = args.max_report;
    config.show_progress = config.show_progress && !args.no_progress;
    config.verbosity = config.verbosity.max(args.verbose as usize);

    if args.filter_pathname.is_some() {
        config.filter_pathname = args.filter_pathname.clone();
    }
    if args.filter_basename.is_some() {
        config.filter_basename = args.filter_basename.clone();
    }
    if args.filter_regex.is_some() {
        config.filter_regex = args.filter_regex.clone();
    }

    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

fn select_regions<'a>(set: &'a RegionSet, config: &Config) -> Result<RegionView<'a>> {
    let view = if let Some(name) = &config.filter_pathname {
        if config.invert_filter {
            set.filter_out_pathname(name)
        } else {
            set.filter_pathname(name)
        }
    } else if let Some(name) = &config.filter_basename {
        if config.invert_filter {
            set.filter_out_basename(name)
        } else {
            set.filter_basename(name)
        }
    } else if let Some(pattern) = &config.filter_regex {
        let regex = Regex::new(pattern).context("bad region filter pattern")?;
        if config.invert_filter {
            set.filter_out_regex(&regex)
        } else {
            set.filter_regex(&regex)
        }
    } else {
        set.view()
    };

    view.ok_or_else(|| anyhow!("no regions left after filtering"))
}

fn parse_scan_predicate(args: &Args) -> Result<ScanPredicate> {
    let needle = Needle::parse(&args.value)?;

    if let Some(upper) = &args.upper {
        let upper = Needle::parse(upper)?;
        let bounds: RangeBounds = args.bounds.parse()?;
        return Ok(ScanPredicate::Range(needle, upper, bounds));
    }

    Ok(match args.compare.as_str() {
        "eq" => ScanPredicate::Eq(needle),
        "ne" => ScanPredicate::Ne(needle),
        "lt" => ScanPredicate::Lt(needle),
        "le" => ScanPredicate::Le(needle),
        "gt" => ScanPredicate::Gt(needle),
        "ge" => ScanPredicate::Ge(needle),
        other => bail!("unknown comparison {:?}", other),
    })
}

fn parse_narrow_expr(expr: &str) -> Result<NarrowPredicate> {
    match expr {
        "changed" => return Ok(NarrowPredicate::Changed),
        "unchanged" => return Ok(NarrowPredicate::Unchanged),
        "increased" => return Ok(NarrowPredicate::Increased),
        "decreased" => return Ok(NarrowPredicate::Decreased),
        _ => {}
    }

    if let Some(rest) = expr.strip_prefix("range:") {
        let mut parts = rest.splitn(3, ':');
        let lower = parts.next().ok_or_else(|| anyhow!("range needs bounds"))?;
        let upper = parts.next().ok_or_else(|| anyhow!("range needs bounds"))?;
        let bounds = parts.next().unwrap_or("ge_le");
        return Ok(NarrowPredicate::Range(
            Needle::parse(lower)?,
            Needle::parse(upper)?,
            bounds.parse()?,
        ));
    }

    let (op, value) = expr
        .split_once(':')
        .ok_or_else(|| anyhow!("bad narrow expression {:?}", expr))?;
    let needle = Needle::parse(value)?;

    Ok(match op {
        "eq" => NarrowPredicate::Eq(needle),
        "ne" => NarrowPredicate::Ne(needle),
        "lt" => NarrowPredicate::Lt(needle),
        "le" => NarrowPredicate::Le(needle),
        "gt" => NarrowPredicate::Gt(needle),
        "ge" => NarrowPredicate::Ge(needle),
        other => bail!("unknown narrow op {:?}", other),
    })
}

fn format_value(entry: &memsift::MatchEntry) -> String {
    if entry.flags.is_float_only() {
        format!("{}", entry.value.f64())
    } else if entry.value.i64() < 0 {
        format!("{} (0x{:x})", entry.value.i64(), entry.value.u64())
    } else {
        format!("{} (0x{:x})", entry.value.u64(), entry.value.u64())
    }
}

fn print_matches(store: &MatchStore, limit: usize) {
    for (index, entry) in store.iter().enumerate() {
        if index >= limit {
            println!(
                "{}",
                format!("... and {} more", store.len() - limit).dimmed()
            );
            break;
        }
        println!(
            "{} {} {}",
            format!("[{}]", index + 1).cyan(),
            format!("0x{:012x}", entry.addr).yellow(),
            format_value(entry)
        );
    }
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    memsift::utils::logging::init_logger(memsift::utils::logging::level_from_verbosity(
        config.verbosity,
    ));

    let pid = args.pid;
    let narrows: Vec<NarrowPredicate> = args
        .then
        .iter()
        .map(|s| parse_narrow_expr(s))
        .collect::<Result<_>>()?;
    let predicate = parse_scan_predicate(&args)?;

    let set = RegionSet::load(pid).with_context(|| format!("reading map of pid {}", pid))?;
    let regions = select_regions(&set, &config)?;

    println!(
        "{} {} writable region(s) of pid {}",
        "[*]".blue(),
        regions.len(),
        pid
    );

    let progress = if config.show_progress {
        let bar = ProgressBar::new((narrows.len() + 1) as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let alignment = if config.unaligned {
        Alignment::Unaligned
    } else {
        Alignment::Aligned
    };
    let engine = ScanEngine::new(pid).with_alignment(alignment);

    if let Some(bar) = &progress {
        bar.set_message("scanning");
    }

    let mut store = MatchStore::new();
    engine.scan(&mut store, &regions, &predicate)?;

    if let Some(bar) = &progress {
        bar.inc(1);
    }
    println!("{} scan: {} candidate(s)", "[+]".green(), store.len());

    for (index, narrow) in narrows.iter().enumerate() {
        if let Some(bar) = &progress {
            bar.set_message(format!("narrow {}", index + 1));
        }

        engine.narrow(&mut store, narrow)?;

        if let Some(bar) = &progress {
            bar.inc(1);
        }
        println!(
            "{} narrow {}: {} candidate(s)",
            "[+]".green(),
            index + 1,
            store.len()
        );
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    print_matches(&store, config.max_report);
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("{} {:#}", "[!]".red(), err);
        std::process::exit(1);
    }
}
