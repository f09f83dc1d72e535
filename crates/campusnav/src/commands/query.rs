//! Terminal front end: the same workspace the viewer uses, with the output
//! region printed instead of drawn.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use crate::api::client::HttpBackend;
use crate::api::dispatch::Dispatcher;
use crate::api::{ApiRequest, ApiResponse, Backend};
use crate::config::Config;
use crate::map::PopupContent;
use crate::map::popup::{details_content, fallback_text};
use crate::output::{LineKind, OutputMessage};
use crate::workspace::CampusMap;

fn workspace(base_url: &str) -> (CampusMap, Dispatcher) {
    let backend = Arc::new(HttpBackend::new(base_url));
    tracing::debug!("using server {}", backend.base_url());
    let settings = Config::load_or_default().map_settings();
    (CampusMap::new(settings), Dispatcher::new(backend))
}

/// Apply completions until nothing is in flight.
fn settle(ws: &mut CampusMap, dispatcher: &mut Dispatcher) -> Result<()> {
    while dispatcher.in_flight() > 0 {
        let completion = dispatcher
            .recv()
            .context("request worker stopped unexpectedly")?;
        ws.handle(completion);
    }
    Ok(())
}

fn styled(kind: LineKind, text: &str) -> ColoredString {
    match kind {
        LineKind::Heading => text.bold(),
        LineKind::Figure => text.cyan(),
        LineKind::Note | LineKind::Progress => text.dimmed(),
        LineKind::Error => text.red(),
        LineKind::Item => format!("  {text}").normal(),
        LineKind::Body => text.normal(),
    }
}

/// Print the output region, or fail with its error text.
fn print_output(message: &OutputMessage) -> Result<()> {
    if let OutputMessage::Error(text) = message {
        anyhow::bail!("{text}");
    }
    for (kind, text) in message.lines() {
        println!("{}", styled(kind, &text));
    }
    Ok(())
}

pub fn buildings(base_url: &str) -> Result<()> {
    let (mut ws, mut dispatcher) = workspace(base_url);
    ws.start(&mut dispatcher);
    settle(&mut ws, &mut dispatcher)?;

    let Some(directory) = ws.catalog.directory() else {
        return print_output(ws.output.message());
    };
    if directory.is_empty() {
        println!("{}", "No buildings found.".yellow());
        return Ok(());
    }
    for group in ws.catalog.source.groups() {
        if let Some(label) = &group.label {
            println!("{}", label.bold());
        }
        for name in &group.options {
            println!("  {name}");
        }
    }
    Ok(())
}

pub fn path(base_url: &str, source: &str, destination: &str) -> Result<()> {
    let (mut ws, mut dispatcher) = workspace(base_url);
    ws.start(&mut dispatcher);
    settle(&mut ws, &mut dispatcher)?;
    // Rejections are already in the output region.
    let _ = ws.request_path(source, destination, &mut dispatcher);
    settle(&mut ws, &mut dispatcher)?;
    print_output(ws.output.message())
}

pub fn mst(base_url: &str) -> Result<()> {
    let (mut ws, mut dispatcher) = workspace(base_url);
    ws.start(&mut dispatcher);
    settle(&mut ws, &mut dispatcher)?;
    ws.show_mst(&mut dispatcher);
    settle(&mut ws, &mut dispatcher)?;
    print_output(ws.output.message())
}

pub fn info(base_url: &str, name: &str) -> Result<()> {
    let backend = HttpBackend::new(base_url);
    let request = ApiRequest::BuildingInfo {
        name: name.to_string(),
    };
    let content = match backend.fetch(&request) {
        Ok(ApiResponse::BuildingInfo(info)) => details_content(name, &info),
        Ok(_) => anyhow::bail!("unexpected response from server"),
        Err(e) => {
            tracing::debug!("building info for '{name}' unavailable: {e}");
            PopupContent::Text(fallback_text(name))
        }
    };

    match content {
        PopupContent::Details { title, rows } => {
            println!("{}", title.bold());
            let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in rows {
                println!("  {}  {value}", format!("{key:width$}").dimmed());
            }
        }
        PopupContent::Text(text) => println!("{}", text.dimmed()),
    }
    Ok(())
}
