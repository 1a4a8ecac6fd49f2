//! The request loop and its concurrent fan-out.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::header;
use tokio_util::io::ReaderStream;
use volley_common::config::HarnessConfig;
use volley_common::Payload;

use crate::generate;
use crate::throttle::ThrottledReader;
use crate::{ClientError, Result};

/// How a run delivers its request bodies, fixed by the `--throttled` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Direct,
    Throttled,
}

/// What one completed cycle looked like. Logged, never retained.
#[derive(Debug)]
pub struct Outcome {
    pub status: reqwest::StatusCode,
    pub elapsed: Duration,
    pub payload_bytes: usize,
}

/// One full request/response cycle: fresh payload, POST, timing.
pub async fn send_once<R: Rng>(
    client: &reqwest::Client,
    cfg: &HarnessConfig,
    delivery: Delivery,
    rng: &mut R,
) -> Result<Outcome> {
    let payload = Payload {
        sent_time: chrono::Utc::now(),
        contents: generate::contents(rng, cfg.payload_mb),
    };
    let body = serde_json::to_vec(&payload)?;
    let payload_bytes = body.len();

    let started = Instant::now();
    tracing::info!(target: "client", mode = ?delivery, "request started");

    let request = client
        .post(&cfg.target_url)
        .header(header::CONTENT_TYPE, "application/json");
    let response = match delivery {
        Delivery::Direct => request.body(body).send().await?,
        Delivery::Throttled => {
            let reader =
                ThrottledReader::new(body.into(), Duration::from_secs(cfg.throttle_secs));
            let chunk = reader.bytes_per_chunk();
            let stream = ReaderStream::with_capacity(reader, chunk);
            request
                .body(reqwest::Body::wrap_stream(stream))
                .send()
                .await?
        }
    };

    let outcome = Outcome {
        status: response.status(),
        elapsed: started.elapsed(),
        payload_bytes,
    };
    tracing::info!(
        target: "client",
        status = %outcome.status,
        sent_mb = %format_args!("{:.2}", payload_bytes as f64 / generate::MIB as f64),
        elapsed = ?outcome.elapsed,
        "request completed"
    );
    Ok(outcome)
}

/// Launch `cfg.workers` independent request loops and wait for all of them.
///
/// Each loop runs until its own POST fails at transport level; one worker
/// retiring does not affect the others, and nothing short of process exit
/// stops a healthy worker.
pub async fn run(cfg: HarnessConfig, delivery: Delivery) {
    let client = reqwest::Client::new();
    let mut handles = Vec::with_capacity(cfg.workers);
    for worker in 0..cfg.workers {
        handles.push(tokio::spawn(worker_loop(
            worker,
            client.clone(),
            cfg.clone(),
            delivery,
        )));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

async fn worker_loop(worker: usize, client: reqwest::Client, cfg: HarnessConfig, delivery: Delivery) {
    let mut rng = StdRng::from_entropy();
    loop {
        match send_once(&client, &cfg, delivery, &mut rng).await {
            Ok(_) => {}
            Err(ClientError::Transport(e)) => {
                tracing::warn!(target: "client", worker, "transport error, stopping: {e}");
                return;
            }
            Err(ClientError::Encode(e)) => {
                tracing::warn!(target: "client", worker, "encode error, dropping attempt: {e}");
                continue;
            }
        }
        let backoff = rng.gen_range(0..cfg.max_backoff_secs.max(1));
        tracing::info!(target: "client", worker, backoff, "sleeping");
        tokio::time::sleep(Duration::from_secs(backoff)).await;
    }
}
