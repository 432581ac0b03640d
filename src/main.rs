#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::if_not_else, clippy::non_ascii_literal)]

use rangescan::address::parse_target_address;
use rangescan::input::{Config, Opts};
use rangescan::scanner::{ScanConfig, ScanReport, Scanner};
use rangescan::target::Target;
use rangescan::tui::progress_bar;
use rangescan::validate::parse_port_range;
use rangescan::{detail, output, warning};

use colored::Colorize;
use std::process::ExitCode;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

// Average value for Ubuntu
#[cfg(unix)]
const DEFAULT_FILE_DESCRIPTORS_LIMIT: u64 = 8000;
// Safest batch size based on experimentation
const AVERAGE_BATCH_SIZE: u16 = 3000;

#[macro_use]
extern crate log;

#[cfg(not(tarpaulin_include))]
/// Validates the arguments, resolves the host and runs one scan.
/// If you're looking for the actual scanning, check out the module Scanner
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warning!(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(tarpaulin_include))]
async fn run() -> anyhow::Result<()> {
    let mut opts: Opts = Opts::read();
    let config = Config::read(opts.config_path.clone())?;
    opts.merge(&config);

    debug!("Main() `opts` arguments are {opts:?}");

    let quiet = opts.greppable || opts.json;

    // Both arguments are checked before any packet leaves the machine.
    let range = parse_port_range(&opts.portrange)?;
    let ip = parse_target_address(&opts.ip, opts.resolver.as_deref()).await?;
    let target = Target::new(ip, range);

    if opts.ip != ip.to_string() {
        detail!(
            format!("Host {} resolved to {ip}", opts.ip),
            quiet,
            opts.accessible
        );
    }
    detail!(
        format!("Scanning {ip} on ports {range}"),
        quiet,
        opts.accessible
    );

    #[cfg(unix)]
    let batch_size: u16 = infer_batch_size(&opts, adjust_ulimit_size(&opts));

    #[cfg(not(unix))]
    let batch_size: u16 = AVERAGE_BATCH_SIZE;

    let scanner = Scanner::new(target, ScanConfig::from_opts(&opts, batch_size));
    debug!("Scanner finished building: {scanner:?}");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let progress = progress_bar(
        scanner.target().range().len(),
        quiet || opts.no_progress || opts.accessible,
    );
    let scan_start = Instant::now();
    let report = scanner.run(&progress, &cancel).await;
    progress.finish_and_clear();
    let report = report?;

    info!("Scan of {ip} took {:?}", scan_start.elapsed());

    print_report(&opts, &report)?;

    Ok(())
}

fn print_report(opts: &Opts, report: &ScanReport) -> anyhow::Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if opts.greppable {
        println!("{} -> [{}]", report.ip(), report.joined_ports());
        return Ok(());
    }

    if !report.is_complete() {
        warning!(
            format!(
                "Scan interrupted after {} of {} ports, results are partial.",
                report.probed(),
                report.range().len()
            ),
            false,
            opts.accessible
        );
    }

    let ports = if report.count() == 0 {
        "none".to_owned()
    } else {
        report.joined_ports()
    };
    let ports = if opts.accessible {
        ports
    } else {
        ports.purple().to_string()
    };

    output!(
        format!("Open ports: {ports} ({})", report.count()),
        false,
        opts.accessible
    );

    Ok(())
}

#[cfg(unix)]
fn adjust_ulimit_size(opts: &Opts) -> u64 {
    use rlimit::Resource;

    if let Some(limit) = opts.ulimit {
        if Resource::NOFILE.set(limit, limit).is_ok() {
            detail!(
                format!("Automatically increasing ulimit value to {limit}."),
                opts.greppable,
                opts.accessible
            );
        } else {
            warning!(
                "ERROR. Failed to set ulimit value.",
                opts.greppable,
                opts.accessible
            );
        }
    }

    match Resource::NOFILE.get() {
        Ok((soft, _)) => soft,
        Err(e) => {
            warn!("Could not read the file descriptor limit: {e}");
            DEFAULT_FILE_DESCRIPTORS_LIMIT
        }
    }
}

#[cfg(unix)]
fn infer_batch_size(opts: &Opts, ulimit: u64) -> u16 {
    let mut batch_size: u64 = opts.batch_size.into();

    // Adjust the batch size when the ulimit value is lower than the desired batch size
    if ulimit < batch_size {
        warning!("File limit is lower than default batch size. Consider upping with --ulimit. May cause harm to sensitive servers",
            opts.greppable, opts.accessible
        );

        // When the OS supports high file limits like 8000, but the user
        // selected a batch size higher than this we should reduce it to
        // a lower number.
        if ulimit < AVERAGE_BATCH_SIZE.into() {
            // ulimit is smaller than aveage batch size
            // user must have very small ulimit
            // decrease batch size to half of ulimit
            warning!("Your file limit is very small, which negatively impacts rangescan's speed. Up the Ulimit with '--ulimit 5000'. ", opts.greppable, opts.accessible);
            info!("Halving batch_size because ulimit is smaller than average batch size");
            batch_size = ulimit / 2;
        } else if ulimit > DEFAULT_FILE_DESCRIPTORS_LIMIT {
            info!("Batch size is now average batch size");
            batch_size = AVERAGE_BATCH_SIZE.into();
        } else {
            batch_size = ulimit - 100;
        }
    }
    // When the ulimit is higher than the batch size let the user know that the
    // batch size can be increased unless they specified the ulimit themselves.
    else if ulimit.saturating_add(2) > batch_size && (opts.ulimit.is_none()) {
        detail!(format!("File limit higher than batch size. Can increase speed by increasing batch size '-b {}'.", ulimit.saturating_sub(100)),
        opts.greppable, opts.accessible);
    }

    u16::try_from(batch_size).unwrap_or(u16::MAX).max(1)
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    use super::infer_batch_size;
    use rangescan::input::Opts;

    #[test]
    #[cfg(unix)]
    fn batch_size_lowered() {
        let opts = Opts {
            batch_size: 50_000,
            ..Default::default()
        };
        let batch_size = infer_batch_size(&opts, 120);

        assert!(batch_size < opts.batch_size);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_lowered_average_size() {
        let opts = Opts {
            batch_size: 50_000,
            ..Default::default()
        };
        let batch_size = infer_batch_size(&opts, 9_000);

        assert_eq!(batch_size, 3_000);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_equals_ulimit_lowered() {
        // because ulimit and batch size are same size, batch size is lowered
        // to ULIMIT - 100
        let opts = Opts {
            batch_size: 50_000,
            ..Default::default()
        };
        let batch_size = infer_batch_size(&opts, 5_000);

        assert_eq!(batch_size, 4_900);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_adjusted_2000() {
        // ulimit == batch_size
        let opts = Opts {
            batch_size: 50_000,
            ulimit: Some(2_000),
            ..Default::default()
        };
        let batch_size = infer_batch_size(&opts, 2_000);

        assert_eq!(batch_size, 1_000);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_kept_when_limit_is_high() {
        let opts = Opts {
            batch_size: 4_500,
            ..Default::default()
        };
        assert_eq!(infer_batch_size(&opts, 1_048_576), 4_500);
    }

    #[test]
    #[cfg(unix)]
    fn tiny_limit_never_yields_zero() {
        let opts = Opts {
            batch_size: 4_500,
            ..Default::default()
        };
        assert_eq!(infer_batch_size(&opts, 1), 1);
    }
}
