use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use listkit_core::{PageController, UrlSink};
use listkit_model::{FetchError, PageSchema, RequestScope, SortDirection, SortSpec};
use listkit_observe::{LogConfig, log_init};
use listkit_sources::MemorySource;

#[derive(Debug, Clone)]
struct Experiment {
    name: String,
    status: String,
    archived: bool,
    created_at: i64,
}

fn experiment(name: &str, status: &str, archived: bool, created_at: i64) -> Experiment {
    Experiment {
        name: name.to_string(),
        status: status.to_string(),
        archived,
        created_at,
    }
}

/// Stands in for the browser's history API: logs instead of navigating.
struct LogSink;

impl UrlSink for LogSink {
    fn replace_query(&self, query: &str) {
        info!(%query, "url rewritten in place");
    }
}

async fn wait_settled(controller: &PageController<Experiment>) {
    while controller.snapshot().phase.is_loading() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn print_page(controller: &PageController<Experiment>, label: &str) {
    let snapshot = controller.snapshot();
    let names: Vec<&str> = snapshot
        .phase
        .page()
        .map(|p| p.items.iter().map(|e| e.name.as_str()).collect())
        .unwrap_or_default();
    info!(
        total = ?snapshot.total_count,
        can_advance = snapshot.can_advance,
        page_index = snapshot.cursor.page_index,
        ?names,
        "{label}"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    log_init(&LogConfig::from_env())?;
    info!("logger initialized");

    // 2) Schema for the experiments list page
    let schema = PageSchema::new(SortSpec::descending("createdAt"))
        .with_choice("status", &["RUNNING", "STOPPED"])?
        .with_text("keyword")?
        .with_flag("archived")?
        .with_sortable("name")
        .with_page_size(5, 50);
    info!("experiment schema ready");

    // 3) A seeded in-memory backend
    let source = MemorySource::new(vec![
        experiment("ablation-sweep", "RUNNING", false, 18),
        experiment("baseline-copy", "STOPPED", true, 3),
        experiment("batch-norm-probe", "RUNNING", false, 15),
        experiment("cold-start-audit", "STOPPED", false, 9),
        experiment("dropout-grid", "RUNNING", false, 21),
        experiment("early-stop-check", "RUNNING", false, 6),
        experiment("feature-hash-trial", "STOPPED", false, 12),
        experiment("grad-clip-scan", "RUNNING", false, 24),
        experiment("held-out-rerun", "STOPPED", true, 1),
        experiment("input-jitter-run", "RUNNING", false, 27),
        experiment("kernel-width-pass", "RUNNING", false, 30),
        experiment("label-smooth-test", "STOPPED", false, 33),
    ])
    .with_matcher(|e: &Experiment, filters| {
        let status_ok = filters
            .get("status")
            .and_then(|v| v.as_text())
            .is_none_or(|s| e.status == s);
        let keyword_ok = filters
            .get("keyword")
            .and_then(|v| v.as_text())
            .is_none_or(|k| e.name.contains(k));
        let archived_ok = filters
            .get("archived")
            .and_then(|v| v.as_flag())
            .is_none_or(|a| e.archived == a);
        status_ok && keyword_ok && archived_ok
    })
    .with_field_order(|a, b, field| match field {
        "name" => a.name.cmp(&b.name),
        "createdAt" => a.created_at.cmp(&b.created_at),
        _ => Ordering::Equal,
    })
    .with_latency(Duration::from_millis(25));
    let source = Arc::new(source);
    info!(experiments = source.len(), "memory source seeded");

    // 4) Controller mounted from a shared link
    let controller = PageController::new(
        schema,
        source.clone(),
        Arc::new(LogSink),
        RequestScope::new()
            .with_environment("env-demo")
            .with_organization("org-demo"),
    );
    controller.mount("?status=RUNNING&sort=name&dir=ASC");
    wait_settled(&controller).await;
    print_page(&controller, "mounted from url");

    // 5) Walk forward through the running experiments
    controller.next_page();
    wait_settled(&controller).await;
    print_page(&controller, "second page");
    info!(query = %controller.query_string(), "shareable link for this page");

    // 6) Changing a filter snaps back to the first page
    controller.set_filter("status", "STOPPED");
    wait_settled(&controller).await;
    print_page(&controller, "stopped experiments");

    // 7) Typing in the search box; keystrokes collapse into one request
    controller.set_filter_debounced("keyword", "l");
    controller.set_filter_debounced("keyword", "la");
    controller.set_filter_debounced("keyword", "label");
    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_settled(&controller).await;
    print_page(&controller, "keyword search");

    // 8) A failing refresh keeps the data on screen
    source.fail_next(FetchError::Network("connection reset by peer".into()));
    controller.retry();
    wait_settled(&controller).await;
    let snapshot = controller.snapshot();
    info!(
        error = ?snapshot.phase.error(),
        kept = ?snapshot.last_good.as_ref().map(|p| p.len()),
        "refresh failed, last page retained"
    );
    controller.retry();
    wait_settled(&controller).await;
    print_page(&controller, "retry recovered");

    // 9) Sorting and a clean reset
    controller.set_sort("createdAt", SortDirection::Desc);
    wait_settled(&controller).await;
    print_page(&controller, "newest first");

    controller.reset();
    wait_settled(&controller).await;
    print_page(&controller, "back to defaults");

    controller.dismiss();
    info!("view dismissed");

    Ok(())
}
