use std::io::Write;
use std::time::Instant;

use bookstore_store::{BookStore, StoreError};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::RunError;
use crate::output;
use crate::step::Step;

/// Runs [`Step::ALL`] in order against one store, printing each step's
/// label before issuing it and its result once it returns. The first
/// failure stops the run.
pub struct Runner<'a, S> {
    store: &'a S,
    config: &'a Config,
}

impl<'a, S: BookStore> Runner<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self { store, config }
    }

    pub async fn run<W: Write>(&self, out: &mut W) -> Result<(), RunError> {
        for step in Step::ALL {
            writeln!(out, "\n{}", step.label(self.config))?;
            info!(%step, "running");
            let started = Instant::now();
            let result = step.execute(self.store, self.config).await?;
            debug!(%step, elapsed_ms = started.elapsed().as_millis() as u64, "done");
            writeln!(out, "{}", output::render(&result)?)?;
        }
        Ok(())
    }
}

/// One complete session: announce the connection, run every step, and
/// always close the store, whichever way the run ended.
///
/// A failure is reported once on `err` as `Error: <message>` before the
/// store is closed, then returned.
pub async fn run_session<S, W, E>(
    connected: Result<S, StoreError>,
    config: &Config,
    out: &mut W,
    err: &mut E,
) -> Result<(), RunError>
where
    S: BookStore,
    W: Write,
    E: Write,
{
    let (result, store) = match connected {
        Ok(store) => {
            let result = match writeln!(out, "Connected to Database") {
                Ok(()) => Runner::new(&store, config).run(out).await,
                Err(e) => Err(e.into()),
            };
            (result, Some(store))
        }
        Err(e) => (Err(RunError::Connect(e)), None),
    };

    if let Err(e) = &result {
        error!(error = %e, "run aborted");
        // Nowhere left to report to if stderr itself fails.
        let _ = writeln!(err, "Error: {e}");
    }

    let closed = match store {
        Some(store) => store.close().await.map_err(RunError::Close),
        None => Ok(()),
    };
    if let Err(e) = &closed {
        error!(error = %e, "closing the store failed");
    }
    let announced = writeln!(out, "\nDatabase connection closed").map_err(RunError::from);

    result.and(closed).and(announced)
}
