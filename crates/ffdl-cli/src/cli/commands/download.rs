//! `ffdl download` – walk the listing, download videos, record outcomes.

use anyhow::{bail, Context, Result};
use ffdl_core::config::{throttle_from_secs, FfdlConfig, MAX_PAGE_SIZE};
use ffdl_core::filter::{parse_date_like, FilterSpec};
use ffdl_core::ledger::JsonlLedger;
use ffdl_core::orchestrator::{Orchestrator, RecordOutcome, RunOptions};
use ffdl_core::record::MeetingRecord;
use ffdl_core::resolver::EmbeddedLinkResolver;
use ffdl_core::source::{GraphqlClient, RecordSource, Throttle};
use ffdl_core::transfer::HttpTransfer;

use crate::cli::DownloadArgs;

pub fn run_download(cfg: &FfdlConfig, args: DownloadArgs) -> Result<()> {
    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);
    let Some(api_key) = api_key else {
        bail!("missing API key: pass --api-key or set FIREFLIES_API_KEY");
    };

    let filter = filter_from_args(&args)?;
    let page_size = page_size_from_args(cfg, &args);
    let throttle = args
        .throttle
        .map(throttle_from_secs)
        .unwrap_or_else(|| cfg.throttle());

    let client = GraphqlClient::new(&cfg.endpoint, api_key, page_size, cfg.timeouts());
    let source = RecordSource::new(client, filter, cfg.retry_policy());
    let ledger = JsonlLedger::open_in_dir(&args.out)?;
    if ledger.skipped_lines() > 0 {
        eprintln!(
            "warning: skipped {} unreadable line(s) in {}",
            ledger.skipped_lines(),
            ledger.path().display()
        );
    }
    let manifest = ledger.path().to_path_buf();
    let transfer = HttpTransfer::new(cfg.timeouts(), cfg.retry_policy());

    let options = RunOptions {
        out_dir: args.out.clone(),
        dry_run: args.dry_run,
        resume: !args.no_resume,
        overwrite: args.overwrite,
        limit: args.max_records,
    };
    let mut orchestrator = Orchestrator::new(
        source,
        Throttle::new(throttle),
        ledger,
        EmbeddedLinkResolver,
        transfer,
        options,
    )
    .with_observer(print_outcome);

    let summary = orchestrator.run()?;

    println!();
    println!("Done.");
    println!("Records seen:      {}", summary.seen);
    println!("Downloaded now:    {}", summary.downloaded);
    println!("Already complete:  {}", summary.exists);
    println!("Skipped (ledger):  {}", summary.skipped);
    println!("No video:          {}", summary.no_video_url);
    println!("Errors:            {}", summary.errors);
    if args.dry_run {
        println!("Would download:    {}", summary.would_download);
    } else {
        println!("Bytes transferred: {}", summary.bytes_transferred);
        println!("Manifest: {}", manifest.display());
    }
    Ok(())
}

fn print_outcome(record: &MeetingRecord, outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Skipped => {}
        RecordOutcome::Downloaded { path, bytes } => {
            println!("downloaded  {}  ({} bytes)", file_name(path), bytes)
        }
        RecordOutcome::Exists { path } => println!("exists      {}", file_name(path)),
        RecordOutcome::NoVideoUrl => println!("no video    {}  {}", record.id, record.title),
        RecordOutcome::Error { detail } => {
            eprintln!("ERROR downloading {}: {}", record.id, detail)
        }
        RecordOutcome::WouldDownload { path } => {
            println!("[DRY RUN] Would download: {}", file_name(path))
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn filter_from_args(args: &DownloadArgs) -> Result<FilterSpec> {
    let parse = |flag: &str, value: &Option<String>| {
        value
            .as_deref()
            .map(|v| parse_date_like(v).with_context(|| format!("--{}", flag)))
            .transpose()
    };
    let from = parse("from", &args.from)?;
    let to = parse("to", &args.to)?;
    if let (Some(f), Some(t)) = (from, to) {
        if f >= t {
            bail!("--from ({}) must be earlier than --to ({})", f, t);
        }
    }
    Ok(FilterSpec {
        from,
        to,
        channel_id: args
            .channel_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        mine: !args.not_mine,
    })
}

pub(crate) fn page_size_from_args(cfg: &FfdlConfig, args: &DownloadArgs) -> u32 {
    match args.limit {
        Some(n) => {
            if n > MAX_PAGE_SIZE {
                tracing::warn!(requested = n, "page size capped at {}", MAX_PAGE_SIZE);
            }
            n.clamp(1, MAX_PAGE_SIZE)
        }
        None => cfg.page_size(),
    }
}
