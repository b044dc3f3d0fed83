//! `rfetch get <source>...` – fetch sources into a directory.

use anyhow::{bail, Result};
use rfetch_core::config::RfetchConfig;
use rfetch_core::control::AbortToken;
use rfetch_core::fetch::{FetchError, FetchOutcome, FetchRequest, Fetcher};
use rfetch_core::retry::RetrySettings;
use rfetch_core::source::RemoteSource;
use rfetch_core::transport::{HttpOptions, SourceTransport};
use std::collections::HashSet;
use std::path::PathBuf;

/// Parsed arguments of `rfetch get`.
#[derive(Debug, Clone)]
pub struct GetArgs {
    pub sources: Vec<String>,
    pub output_dir: PathBuf,
    pub jobs: usize,
    pub restart: bool,
    pub size: Option<u64>,
    pub chunk_size: Option<usize>,
}

pub async fn run_get(cfg: &RfetchConfig, args: GetArgs) -> Result<()> {
    let requests = plan_requests(&args)?;
    let mut settings = cfg.retry_settings();
    if let Some(chunk_size) = args.chunk_size {
        settings = settings.with_chunk_size(chunk_size);
    }

    let abort = AbortToken::new();
    spawn_ctrl_c_listener(abort.clone());

    let total = requests.len();
    let results = fetch_all(requests, cfg.http_options(), settings, abort, args.jobs).await?;

    let mut failed = 0usize;
    for (request, result) in &results {
        match result {
            Ok(outcome) => println!("{}", describe_outcome(request, outcome)),
            Err(e) => {
                failed += 1;
                eprintln!("failed  {}: {}", request.source, e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} fetches failed", failed, total);
    }
    Ok(())
}

/// Turn CLI arguments into one request per source.
fn plan_requests(args: &GetArgs) -> Result<Vec<FetchRequest>> {
    if args.size.is_some() && args.sources.len() != 1 {
        bail!("--size can only be used with a single source");
    }
    let mut seen = HashSet::new();
    let mut requests = Vec::with_capacity(args.sources.len());
    for raw in &args.sources {
        let source = RemoteSource::parse(raw);
        let destination = args.output_dir.join(source.file_name());
        if !seen.insert(destination.clone()) {
            bail!(
                "more than one source would be written to {}",
                destination.display()
            );
        }
        let mut request = FetchRequest::new(source, destination).with_resume(!args.restart);
        if let Some(size) = args.size {
            request = request.with_expected_size(size);
        }
        requests.push(request);
    }
    Ok(requests)
}

/// Run up to `jobs` fetches at once on the blocking pool; results come back in input order.
async fn fetch_all(
    requests: Vec<FetchRequest>,
    http: HttpOptions,
    settings: RetrySettings,
    abort: AbortToken,
    jobs: usize,
) -> Result<Vec<(FetchRequest, Result<FetchOutcome, FetchError>)>> {
    let jobs = jobs.max(1);
    let mut pending = requests.into_iter().enumerate();
    let mut results = Vec::new();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < jobs {
            let Some((index, request)) = pending.next() else {
                break;
            };
            let abort = abort.clone();
            join_set.spawn_blocking(move || {
                let fetcher = Fetcher::new(SourceTransport::new(http), settings).with_abort(abort);
                let result = fetcher.fetch(&request);
                (index, request, result)
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (index, request, result) = res.map_err(|e| anyhow::anyhow!("fetch task join: {}", e))?;
        if let Err(e) = &result {
            tracing::warn!(source = %request.source, error = %e, "fetch failed");
        }
        results.push((index, request, result));
    }

    results.sort_by_key(|(index, _, _)| *index);
    Ok(results
        .into_iter()
        .map(|(_, request, result)| (request, result))
        .collect())
}

fn spawn_ctrl_c_listener(abort: AbortToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, aborting fetches");
            eprintln!("interrupted; partial files are kept for resume");
            abort.abort();
        }
    });
}

fn describe_outcome(request: &FetchRequest, outcome: &FetchOutcome) -> String {
    let mut line = format!(
        "done    {} ({} bytes",
        request.destination.display(),
        outcome.bytes_total
    );
    if outcome.resumed_from > 0 {
        line.push_str(&format!(", resumed at {}", outcome.resumed_from));
    }
    if outcome.retries > 0 {
        line.push_str(&format!(
            ", {} retries, {} reopens",
            outcome.retries, outcome.reopens
        ));
    }
    line.push(')');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args(sources: &[&str], dir: &std::path::Path) -> GetArgs {
        GetArgs {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            output_dir: dir.to_path_buf(),
            jobs: 2,
            restart: false,
            size: None,
            chunk_size: None,
        }
    }

    fn fast_settings() -> RetrySettings {
        RetrySettings::new(
            4096,
            512,
            Duration::from_millis(1),
            Duration::from_millis(5),
        )
    }

    #[test]
    fn plan_names_destinations_after_sources() {
        let dir = tempfile::tempdir().unwrap();
        let requests = plan_requests(&args(
            &["https://example.com/pub/a.iso", "/srv/data/b.tar"],
            dir.path(),
        ))
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].destination, dir.path().join("a.iso"));
        assert_eq!(requests[1].destination, dir.path().join("b.tar"));
        assert!(requests.iter().all(|r| r.resume));
    }

    #[test]
    fn plan_rejects_size_with_many_sources() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(&["https://example.com/a", "https://example.com/b"], dir.path());
        a.size = Some(10);
        assert!(plan_requests(&a).is_err());
    }

    #[test]
    fn plan_rejects_colliding_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(
            &["https://one.example/x.bin", "https://two.example/x.bin"],
            dir.path(),
        );
        let err = plan_requests(&a).unwrap_err();
        assert!(err.to_string().contains("x.bin"));
    }

    #[test]
    fn plan_restart_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(&["https://example.com/a"], dir.path());
        a.restart = true;
        a.size = Some(1234);
        let requests = plan_requests(&a).unwrap();
        assert!(!requests[0].resume);
        assert_eq!(requests[0].expected_size, Some(1234));
    }

    #[test]
    fn describe_mentions_retries_only_when_present() {
        let request = FetchRequest::new(RemoteSource::parse("https://example.com/a"), "/tmp/a");
        let clean = FetchOutcome {
            bytes_total: 10,
            bytes_fetched: 10,
            ..FetchOutcome::default()
        };
        assert_eq!(describe_outcome(&request, &clean), "done    /tmp/a (10 bytes)");
        let bumpy = FetchOutcome {
            retries: 3,
            reopens: 1,
            resumed_from: 4,
            ..clean
        };
        assert_eq!(
            describe_outcome(&request, &bumpy),
            "done    /tmp/a (10 bytes, resumed at 4, 3 retries, 1 reopens)"
        );
    }

    #[tokio::test]
    async fn fetch_all_copies_local_sources_in_order() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut sources = Vec::new();
        for (name, len) in [("one.bin", 10_000usize), ("two.bin", 1), ("three.bin", 9_999)] {
            let path = src.path().join(name);
            std::fs::write(&path, vec![7u8; len]).unwrap();
            sources.push(path.to_string_lossy().into_owned());
        }
        let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
        let requests = plan_requests(&args(&refs, out.path())).unwrap();

        let results = fetch_all(
            requests,
            HttpOptions::default(),
            fast_settings(),
            AbortToken::new(),
            2,
        )
        .await
        .unwrap();

        let sizes: Vec<u64> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().bytes_total)
            .collect();
        assert_eq!(sizes, vec![10_000, 1, 9_999]);
        assert_eq!(std::fs::read(out.path().join("two.bin")).unwrap(), vec![7u8]);
    }

    #[tokio::test]
    async fn fetch_all_reports_aborted_fetches() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let path = src.path().join("a.bin");
        std::fs::write(&path, b"abc").unwrap();
        let requests = plan_requests(&args(&[path.to_str().unwrap()], out.path())).unwrap();

        let abort = AbortToken::new();
        abort.abort();
        let results = fetch_all(requests, HttpOptions::default(), fast_settings(), abort, 1)
            .await
            .unwrap();

        assert!(matches!(results[0].1, Err(FetchError::Aborted)));
        assert!(!out.path().join("a.bin").exists());
    }
}
