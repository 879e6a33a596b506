//! In-memory dictionary backend speaking the `{ data, code, msg }` envelope with code 1.

use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Db {
    rows: Vec<Map<String, Value>>,
    next_id: u64,
}

type Shared = Arc<Mutex<Db>>;

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "code": 1, "serviceCode": "200", "msg": "success", "data": data }))
}

fn fail(msg: &str) -> Json<Value> {
    Json(json!({ "code": 0, "msg": msg, "data": null }))
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn seed() -> Db {
    let entries = [
        ("User gender", "sys_user_sex", "system", "1", 0),
        ("Menu status", "sys_show_hide", "system", "1", 0),
        ("Switch status", "sys_normal_disable", "system", "1", 0),
        ("Job status", "sys_job_status", "monitor", "1", 0),
        ("Job group", "sys_job_group", "monitor", "1", 0),
        ("Yes or no", "sys_yes_no", "system", "1", 0),
        ("Notice type", "sys_notice_type", "notice", "1", 0),
        ("Notice status", "sys_notice_status", "notice", "0", 0),
        ("Operation type", "sys_oper_type", "system", "1", 0),
        ("Login status", "sys_common_status", "system", "1", 0),
        ("Order source", "biz_order_source", "order", "1", 1),
        ("Payment method", "biz_pay_method", "order", "1", 1),
    ];
    let mut db = Db::default();
    for (name, kind, service, status, data_type) in entries {
        db.next_id += 1;
        let row = json!({
            "dictId": format!("d-{}", db.next_id),
            "dictName": name,
            "dictType": kind,
            "serviceName": service,
            "status": status,
            "dataType": data_type,
            "createUserNickName": "admin",
            "createTime": now(),
            "remark": null
        });
        if let Value::Object(row) = row {
            db.rows.push(row);
        }
    }
    db
}

fn text_matches(row: &Map<String, Value>, params: &Map<String, Value>, key: &str) -> bool {
    match params.get(key).and_then(Value::as_str) {
        Some(want) => row
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|have| have.contains(want)),
        None => true,
    }
}

async fn page_list(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let params = body.get("params").and_then(Value::as_object).cloned().unwrap_or_default();
    let current = body.get("current").and_then(Value::as_u64).unwrap_or(1).max(1);
    let size = body.get("size").and_then(Value::as_u64).unwrap_or(10).max(1);
    let Ok(db) = db.lock() else {
        return fail("database unavailable");
    };
    let matched: Vec<&Map<String, Value>> = db
        .rows
        .iter()
        .filter(|r| ["dictName", "dictType", "serviceName"].iter().all(|k| text_matches(r, &params, k)))
        .filter(|r| match params.get("status") {
            Some(want) => r.get("status") == Some(want),
            None => true,
        })
        .collect();
    let total = matched.len() as u64;
    let records: Vec<Value> = matched
        .into_iter()
        .skip(((current - 1) * size) as usize)
        .take(size as usize)
        .map(|r| Value::Object(r.clone()))
        .collect();
    tracing::info!(current, size, total, "mock pageList");
    ok(json!({
        "records": records,
        "total": total.to_string(),
        "size": size.to_string(),
        "current": current.to_string(),
        "pages": total.div_ceil(size).to_string()
    }))
}

async fn create(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let Value::Object(mut row) = body else {
        return fail("body must be an object");
    };
    let Ok(mut db) = db.lock() else {
        return fail("database unavailable");
    };
    let kind = row.get("dictType").cloned();
    if db.rows.iter().any(|r| r.get("dictType") == kind.as_ref()) {
        return fail("dict type already exists");
    }
    db.next_id += 1;
    let id = format!("d-{}", db.next_id);
    row.insert("dictId".into(), json!(id));
    row.insert("createUserNickName".into(), json!("admin"));
    row.insert("createTime".into(), json!(now()));
    db.rows.push(row);
    ok(json!(id))
}

async fn update(State(db): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let Ok(mut db) = db.lock() else {
        return fail("database unavailable");
    };
    let key = Value::String(id);
    let Some(row) = db.rows.iter_mut().find(|r| r.get("dictId") == Some(&key)) else {
        return fail("dictionary not found");
    };
    if let Value::Object(changes) = body {
        row.extend(changes);
    }
    row.insert("updateTime".into(), json!(now()));
    ok(Value::Null)
}

async fn remove(State(db): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let Ok(mut db) = db.lock() else {
        return fail("database unavailable");
    };
    let before = db.rows.len();
    let key = Value::String(id);
    db.rows.retain(|r| r.get("dictId") != Some(&key));
    ok(json!(db.rows.len() < before))
}

/// Serve the mock on an ephemeral port; returns its base URL.
pub async fn spawn() -> Result<String, std::io::Error> {
    let db: Shared = Arc::new(Mutex::new(seed()));
    let app = Router::new()
        .route("/basic-public-app/web/system/sysDictType/pageList", post(page_list))
        .route("/dict", post(create))
        .route("/dict/:id", put(update).delete(remove))
        .with_state(db);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "mock backend stopped");
        }
    });
    tracing::info!("mock dictionary backend on http://{}", addr);
    Ok(format!("http://{}", addr))
}
