//! `publish` command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use contracts::{processor_fn, CancellationToken, Item};
use dispatcher::{due_timestamp, DispatcherBuilder};
use tracing::info;

use crate::cli::{Cli, PublishArgs};
use crate::settings_resolver;

/// Execute the `publish` command
pub async fn run_publish(cli: &Cli, args: &PublishArgs) -> Result<()> {
    let process_at = process_at(args, Utc::now())?;

    // Publishing never invokes the processor.
    let dispatcher = DispatcherBuilder::new(processor_fn(|_cancel, _item| async { Ok(()) }))
        .resolver(settings_resolver(cli)?)
        .build()
        .context("Failed to create dispatcher")?;

    dispatcher
        .publish(
            &CancellationToken::new(),
            Item::from(args.payload.clone()),
            process_at,
        )
        .await
        .context("Publish failed")?;

    info!(
        source = dispatcher.source_name(),
        process_at = %process_at.to_rfc3339(),
        due_at = due_timestamp(&process_at),
        "Item published"
    );
    Ok(())
}

/// Resolve the processing instant from `--at` or `--delay-secs`
fn process_at(args: &PublishArgs, now: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
    match &args.at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("Invalid --at instant: {at}")),
        None => {
            let delay = Duration::try_seconds(args.delay_secs)
                .with_context(|| format!("Invalid --delay-secs: {}", args.delay_secs))?;
            Ok((now + delay).fixed_offset())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn args(delay_secs: i64, at: Option<&str>) -> PublishArgs {
        PublishArgs {
            payload: "hello".to_string(),
            delay_secs,
            at: at.map(str::to_string),
        }
    }

    #[test]
    fn test_process_at_from_delay() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let at = process_at(&args(90, None), now).unwrap();
        assert_eq!(due_timestamp(&at), 1_700_000_090);
    }

    #[test]
    fn test_process_at_from_rfc3339() {
        let now = Utc::now();
        let at = process_at(&args(0, Some("2030-01-01T09:00:00+02:00")), now).unwrap();
        assert_eq!(
            due_timestamp(&at),
            Utc.with_ymd_and_hms(2030, 1, 1, 7, 0, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn test_process_at_invalid_rfc3339() {
        let err = process_at(&args(0, Some("tomorrow")), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }
}
