//! Live-API smoke driver: exercises the real Link server the same way the
//! app does, without needing the Tauri shell. Intended for release checks
//! against a staging deployment.
//!
//! Usage:
//!   smoke [--base-url URL] [--email E --password P] [--json]
//! Credentials may also come from LINK_SMOKE_EMAIL / LINK_SMOKE_PASSWORD.

use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use link_response_lib::app::api::activities::{ActivityPageFetcher, PAGE_LIMIT};
use link_response_lib::app::api::client::LinkClient;
use link_response_lib::app::api::paging::ActivityPager;
use link_response_lib::app::config::{load_config, ApiSettings};
use link_response_lib::app::models::LoginUser;

#[derive(Debug, Clone)]
struct Args {
    base_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    json: bool,
}

#[derive(Serialize)]
struct SmokeSummary {
    tool: &'static str,
    status: &'static str,
    trace_id: String,
    base_url: String,
    checks: Vec<SmokeCheck>,
}

#[derive(Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: &'static str, // pass|fail|skip
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut base_url = std::env::var("LINK_API_BASE_URL").ok();
    let mut email = std::env::var("LINK_SMOKE_EMAIL").ok();
    let mut password = std::env::var("LINK_SMOKE_PASSWORD").ok();
    let mut json = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--base-url" => {
                base_url = Some(it.next().ok_or("--base-url requires a value")?);
            }
            "--email" => {
                email = Some(it.next().ok_or("--email requires a value")?);
            }
            "--password" => {
                password = Some(it.next().ok_or("--password requires a value")?);
            }
            "--json" => json = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(Args {
        base_url,
        email,
        password,
        json,
    })
}

fn check<T>(
    checks: &mut Vec<SmokeCheck>,
    name: &'static str,
    started: Instant,
    outcome: Result<T, String>,
) -> Option<T> {
    let duration_ms = started.elapsed().as_millis();
    match outcome {
        Ok(value) => {
            checks.push(SmokeCheck {
                name,
                status: "pass",
                duration_ms,
                error: None,
            });
            Some(value)
        }
        Err(error) => {
            checks.push(SmokeCheck {
                name,
                status: "fail",
                duration_ms,
                error: Some(error),
            });
            None
        }
    }
}

fn skip(checks: &mut Vec<SmokeCheck>, name: &'static str) {
    checks.push(SmokeCheck {
        name,
        status: "skip",
        duration_ms: 0,
        error: None,
    });
}

async fn first_page_check(client: &LinkClient, user: &LoginUser) -> Result<(), String> {
    let mut pager = ActivityPager::new();
    let request = pager.request_next_page().ok_or("pager refused page 1")?;
    let page = client
        .fetch_page(user.id, &request)
        .await
        .map_err(|failure| failure.to_string())?;
    let total = page.total_items;
    let count = page.items.len();
    if count as u32 > PAGE_LIMIT {
        return Err(format!("server returned {count} items for limit {PAGE_LIMIT}"));
    }
    pager
        .apply_success(&request, page)
        .ok_or("completion was treated as stale")?;
    let expected_more = (count as u32) < total;
    if pager.has_more() != expected_more {
        return Err(format!(
            "has_more is {} for {count}/{total} items",
            pager.has_more()
        ));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("smoke: {err}");
            std::process::exit(2);
        }
    };
    let trace_id = Uuid::new_v4().to_string();
    let mut checks = Vec::new();

    let started = Instant::now();
    let config = check(
        &mut checks,
        "config",
        started,
        load_config().map_err(|err| err.to_string()),
    );

    let mut settings = config.map(|c| c.api).unwrap_or_default();
    if let Some(base_url) = &args.base_url {
        settings = ApiSettings {
            base_url: base_url.clone(),
            ..settings
        };
    }

    let started = Instant::now();
    let client = check(
        &mut checks,
        "client",
        started,
        LinkClient::from_settings(&settings).map_err(|failure| failure.to_string()),
    );

    if let Some(client) = &client {
        let started = Instant::now();
        check(
            &mut checks,
            "reachability",
            started,
            client
                .base_stations()
                .await
                .map(|stations| stations.len())
                .map_err(|failure| failure.to_string()),
        );

        match (&args.email, &args.password) {
            (Some(email), Some(password)) => {
                let started = Instant::now();
                let user = check(
                    &mut checks,
                    "login",
                    started,
                    client
                        .login(email, password)
                        .await
                        .map(|(_, user)| user)
                        .map_err(|failure| failure.to_string()),
                );

                if let Some(user) = user {
                    let started = Instant::now();
                    check(
                        &mut checks,
                        "first_page",
                        started,
                        first_page_check(client, &user).await,
                    );
                } else {
                    skip(&mut checks, "first_page");
                }
            }
            _ => {
                skip(&mut checks, "login");
                skip(&mut checks, "first_page");
            }
        }
    } else {
        skip(&mut checks, "reachability");
        skip(&mut checks, "login");
        skip(&mut checks, "first_page");
    }

    let failed = checks.iter().any(|c| c.status == "fail");
    let summary = SmokeSummary {
        tool: "link-response-smoke",
        status: if failed { "fail" } else { "pass" },
        trace_id,
        base_url: settings.base_url,
        checks,
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("summary serializes")
        );
    } else {
        println!("smoke {} ({})", summary.status, summary.base_url);
        for check in &summary.checks {
            match &check.error {
                Some(error) => println!(
                    "  {:<12} {:<4} {:>5}ms  {error}",
                    check.name, check.status, check.duration_ms
                ),
                None => println!(
                    "  {:<12} {:<4} {:>5}ms",
                    check.name, check.status, check.duration_ms
                ),
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
