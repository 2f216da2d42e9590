//! Paging soak driver: walks the full activity log repeatedly against a live
//! server and checks the accumulation invariants hold on every pass (ordered
//! append, stable prefix, has-more agreeing with the reported total).
//!
//! Usage:
//!   soak --email E --password P [--base-url URL] [--iterations N] [--filter]

use std::time::Instant;

use link_response_lib::app::api::activities::ActivityPageFetcher;
use link_response_lib::app::api::client::LinkClient;
use link_response_lib::app::api::paging::ActivityPager;
use link_response_lib::app::config::{load_config, ApiSettings};

// Safety cap; a server bug reporting an inflated total must not spin forever.
const MAX_PAGES_PER_PASS: u32 = 500;

#[derive(Debug, Clone)]
struct Args {
    base_url: Option<String>,
    email: String,
    password: String,
    iterations: u32,
    filter_by_me: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut base_url = std::env::var("LINK_API_BASE_URL").ok();
    let mut email = std::env::var("LINK_SMOKE_EMAIL").ok();
    let mut password = std::env::var("LINK_SMOKE_PASSWORD").ok();
    let mut iterations = 3u32;
    let mut filter_by_me = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--base-url" => base_url = Some(it.next().ok_or("--base-url requires a value")?),
            "--email" => email = Some(it.next().ok_or("--email requires a value")?),
            "--password" => password = Some(it.next().ok_or("--password requires a value")?),
            "--iterations" => {
                iterations = it
                    .next()
                    .ok_or("--iterations requires a value")?
                    .parse()
                    .map_err(|_| "--iterations must be a number")?;
            }
            "--filter" => filter_by_me = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(Args {
        base_url,
        email: email.ok_or("--email (or LINK_SMOKE_EMAIL) is required")?,
        password: password.ok_or("--password (or LINK_SMOKE_PASSWORD) is required")?,
        iterations: iterations.max(1),
        filter_by_me,
    })
}

async fn full_pass(
    client: &LinkClient,
    user_id: i64,
    filter_by_me: bool,
) -> Result<(u32, usize), String> {
    let mut pager = ActivityPager::new();
    let mut request = if filter_by_me {
        pager.toggle_filter()
    } else {
        pager.request_refresh()
    };

    let mut pages = 0u32;
    loop {
        let before: Vec<i64> = pager.items().iter().map(|a| a.id).collect();
        let page = client
            .fetch_page(user_id, &request)
            .await
            .map_err(|failure| format!("page {}: {failure}", request.page))?;
        pager
            .apply_success(&request, page)
            .ok_or_else(|| format!("page {} treated as stale", request.page))?;

        // Accumulation invariant: earlier rows never move.
        if request.page > 1 {
            let after: Vec<i64> = pager.items().iter().map(|a| a.id).collect();
            if after.len() < before.len() || after[..before.len()] != before[..] {
                return Err(format!("page {} disturbed the existing prefix", request.page));
            }
        }

        pages += 1;
        if pages >= MAX_PAGES_PER_PASS {
            return Err(format!("exceeded {MAX_PAGES_PER_PASS} pages in one pass"));
        }

        match pager.request_next_page() {
            Some(next) => request = next,
            None => break,
        }
    }
    Ok((pages, pager.items().len()))
}

#[tokio::main]
async fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("soak: {err}");
            std::process::exit(2);
        }
    };

    let mut settings = load_config().map(|c| c.api).unwrap_or_default();
    if let Some(base_url) = &args.base_url {
        settings = ApiSettings {
            base_url: base_url.clone(),
            ..settings
        };
    }

    let client = match LinkClient::from_settings(&settings) {
        Ok(client) => client,
        Err(failure) => {
            eprintln!("soak: {failure}");
            std::process::exit(2);
        }
    };

    let user = match client.login(&args.email, &args.password).await {
        Ok((_, user)) => user,
        Err(failure) => {
            eprintln!("soak: login failed: {failure}");
            std::process::exit(1);
        }
    };

    let mut failures = 0u32;
    for iteration in 1..=args.iterations {
        let started = Instant::now();
        match full_pass(&client, user.id, args.filter_by_me).await {
            Ok((pages, items)) => {
                println!(
                    "pass {iteration}/{}: {pages} pages, {items} items in {}ms",
                    args.iterations,
                    started.elapsed().as_millis()
                );
            }
            Err(error) => {
                failures += 1;
                eprintln!("pass {iteration}/{}: FAILED: {error}", args.iterations);
            }
        }
    }

    if failures > 0 {
        eprintln!("soak: {failures} failed pass(es)");
        std::process::exit(1);
    }
}
