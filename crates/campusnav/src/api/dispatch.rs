//! Runs backend requests off the UI thread.
//!
//! Catalog, boundary and navigation requests each run in their own
//! `std::thread`. Hover lookups share one worker that holds at most one
//! queued lookup: a newer hover replaces the queued one, so sweeping the
//! pointer across markers never piles up blocked threads. Every request
//! sends its [`Completion`] back via `crossbeam_channel`. The UI thread
//! drains the channel once per frame, so completions are applied one at a
//! time, in the order the backend answered.

use std::sync::Arc;

use crossbeam_channel::{Receiver, RecvError, Sender, bounded, unbounded};
use eframe::egui;

use super::{ApiRequest, Backend, Completion, Origin, RequestSink, Ticket};

type Job = (Ticket, ApiRequest);

pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    repaint: Option<egui::Context>,
    in_flight: usize,
    hover_lane: Option<HoverLane>,
}

/// Mailbox of the hover worker. The dispatcher keeps a receiver too, so it
/// can take back a lookup the worker has not started yet.
struct HoverLane {
    tx: Sender<Job>,
    queued: Receiver<Job>,
}

fn run_job(
    backend: &dyn Backend,
    (ticket, request): Job,
    tx: &Sender<Completion>,
    repaint: Option<&egui::Context>,
) {
    let result = backend.fetch(&request);
    if let Err(e) = &result {
        tracing::warn!(seq = ticket.seq, "{} failed: {e}", request.describe());
    }
    // The receiver only disappears when the app is shutting down.
    let _ = tx.send(Completion { ticket, result });
    if let Some(ctx) = repaint {
        ctx.request_repaint();
    }
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            backend,
            tx,
            rx,
            repaint: None,
            in_flight: 0,
            hover_lane: None,
        }
    }

    /// Wake the UI whenever a completion arrives.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Completions that have arrived so far, without blocking.
    pub fn drain(&mut self) -> Vec<Completion> {
        let ready: Vec<Completion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(ready.len());
        ready
    }

    /// Block until the next completion. Used by the headless commands.
    pub fn recv(&mut self) -> Result<Completion, RecvError> {
        let completion = self.rx.recv()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Ok(completion)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn hover_lane(&mut self) -> &HoverLane {
        let backend = &self.backend;
        let tx = &self.tx;
        let repaint = &self.repaint;
        self.hover_lane.get_or_insert_with(|| {
            let (job_tx, job_rx) = bounded::<Job>(1);
            let worker_rx = job_rx.clone();
            let backend = Arc::clone(backend);
            let tx = tx.clone();
            let repaint = repaint.clone();
            std::thread::spawn(move || {
                // Ends once the dispatcher drops its sender.
                for job in worker_rx.iter() {
                    run_job(backend.as_ref(), job, &tx, repaint.as_ref());
                }
            });
            HoverLane {
                tx: job_tx,
                queued: job_rx,
            }
        })
    }

    fn submit_hover(&mut self, job: Job) {
        let lane = self.hover_lane();
        let mut dropped = 0;
        if let Ok((old, request)) = lane.queued.try_recv() {
            tracing::debug!(seq = old.seq, "dropping queued {}", request.describe());
            dropped = 1;
        }
        // The slot was just emptied and only this thread fills it.
        let sent = lane.tx.try_send(job).is_ok();
        self.in_flight = self.in_flight.saturating_sub(dropped);
        if !sent {
            tracing::warn!("hover worker unavailable");
            self.in_flight = self.in_flight.saturating_sub(1);
        }
    }
}

impl RequestSink for Dispatcher {
    fn submit(&mut self, ticket: Ticket, request: ApiRequest) {
        tracing::debug!(seq = ticket.seq, "dispatching {}", request.describe());
        self.in_flight += 1;

        if matches!(ticket.origin, Origin::Hover(_)) {
            self.submit_hover((ticket, request));
            return;
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            run_job(backend.as_ref(), (ticket, request), &tx, repaint.as_ref());
        });
    }
}
