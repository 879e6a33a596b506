//! Example consumer: drives a dictionary console page through admin-crud-sdk.
//!
//! A mock dictionary backend (POST page-list, string counts, business code 1) is served
//! in-process, so the demo needs nothing else running.
//!
//! Run from repo root: `cargo run -p example-consumer`

mod mock;

use admin_crud_sdk::{
    load_config_from_path, ClientConfig, ConfirmGate, ConfirmPrompt, CrudEngine, CrudState, HttpTransport, NoticeLog,
    Record, RestAdapter, Stores,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Logs each prompt and accepts it.
struct LoggingGate;

#[async_trait]
impl ConfirmGate for LoggingGate {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        tracing::info!(title = %prompt.title, "{}", prompt.description);
        true
    }
}

fn report(step: &str, state: &CrudState) {
    let names: Vec<&str> = state
        .items
        .iter()
        .filter_map(|r| r.get("dictName").and_then(|v| v.as_str()))
        .collect();
    tracing::info!(
        step,
        page = state.page,
        size = state.page_size,
        total = state.total,
        selected = state.selection.len(),
        error = ?state.error,
        "{:?}",
        names
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = ClientConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(client.mode.env_filter().add_directive("example_consumer=info".parse()?))
        .init();

    let base_url = mock::spawn().await?;
    let client = client.with_base_url(base_url);
    let stores = Stores::open_from_config(&client)?;

    let config_path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/dict.json");
    let config = Arc::new(load_config_from_path(config_path).await?);
    let transport = HttpTransport::new(&client)?.with_session(stores.session.clone());
    let adapter = Arc::new(RestAdapter::from_config(transport, &config)?);
    let notices = Arc::new(NoticeLog::new());
    let engine = CrudEngine::new(config.clone(), adapter, Arc::new(LoggingGate))
        .with_notifier(notices.clone())
        .with_page_size(stores.preferences.table_page_size().unwrap_or_default());

    engine.refresh().await;
    report("mount", &engine.snapshot());

    engine
        .search(serde_json::from_value(json!({ "dictName": "sys", "status": "all" }))?)
        .await;
    report("search", &engine.snapshot());
    engine.reset().await;

    engine.change_page(2, 5).await;
    report("page 2", &engine.snapshot());

    engine.open_create();
    let mut form: Record = config.edit_defaults();
    form.insert("dictName".into(), json!("Order channel"));
    form.insert("dictType".into(), json!("biz_order_channel"));
    form.insert("serviceName".into(), json!("order"));
    let created = engine.submit(form).await?;
    tracing::info!(id = ?created.get("dictId"), "created");

    // Fails validation: uppercase type and missing service.
    engine.open_create();
    let mut bad: Record = config.edit_defaults();
    bad.insert("dictName".into(), json!("Broken"));
    bad.insert("dictType".into(), json!("Not Valid"));
    if let Err(e) = engine.submit(bad).await {
        tracing::info!(error = %e, "rejected before sending");
    }
    engine.cancel_edit();

    if let Some(first) = engine.snapshot().items.first().cloned() {
        engine.open_edit(first.clone());
        let mut form = config.form_values(&first);
        form.insert("remark".into(), json!("edited from the demo"));
        engine.submit(form).await?;
        report("after edit", &engine.snapshot());

        let outcome = engine.delete_one(&first).await;
        tracing::info!(?outcome, "delete one");
    }

    engine.change_page_size(20).await;
    stores.preferences.set_table_page_size(20)?;
    report("page size 20", &engine.snapshot());

    engine
        .search(serde_json::from_value(json!({ "serviceName": "order" }))?)
        .await;
    engine.select_all(true);
    let selected = engine.snapshot().selection.rows;
    let outcome = engine.delete_many(&selected).await;
    tracing::info!(?outcome, "batch delete");
    report("after batch delete", &engine.snapshot());

    for notice in notices.drain() {
        tracing::info!(level = ?notice.level, at = %notice.at, "notice: {}", notice.message);
    }

    engine.unmount();
    stores.close()?;
    Ok(())
}
