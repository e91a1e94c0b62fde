//! Request lifecycle state machine.
//!
//! The state moves `Idle -> Loading -> {Success, Failed}` and back to
//! `Loading` on every new trigger. Transitions are expressed by the pure
//! [`SurfaceState::reduce`]; [`RequestLifecycleController`] runs the
//! resulting fetch effects on tokio and feeds their completions back in
//! on the caller's task.
//!
//! Every trigger takes the next sequence number. A completion is applied
//! only when it carries the latest number, so a slow early fetch can never
//! overwrite the result of a later one.

use std::sync::Arc;

use surface_core::heatmap::to_series;
use surface_core::{HeatmapSeries, ParameterModel, PricingSurfaceRequest, PricingSurfaceResponse};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api_client::SurfaceFetcher;
use crate::error::FetchError;

pub const PROGRESS_LOADING: &str = "Fetching data...";
pub const PROGRESS_SUCCESS: &str = "Data fetched successfully.";
pub const PROGRESS_FAILED: &str = "Error occurred while fetching data";

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// What to do with parameters that fail [`ParameterModel::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Send anyway and let the pricing engine decide
    #[default]
    Advisory,
    /// Fail the trigger without a network call
    Strict,
}

/// Input to the state machine
#[derive(Debug)]
pub enum Event {
    /// User (or activation) asked for a surface
    Trigger(ParameterModel),
    /// A fetch started by trigger `seq` finished
    Completed {
        seq: u64,
        outcome: Result<PricingSurfaceResponse, FetchError>,
    },
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch {
        seq: u64,
        request: PricingSurfaceRequest,
    },
}

/// Result state owned by the controller
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    phase: Phase,
    submitted: Option<ParameterModel>,
    response: Option<PricingSurfaceResponse>,
    error: Option<String>,
    progress: String,
    latest_seq: u64,
}

impl SurfaceState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Parameters of the most recent trigger
    pub fn submitted(&self) -> Option<&ParameterModel> {
        self.submitted.as_ref()
    }

    /// Last successfully fetched surface; survives later failures
    pub fn response(&self) -> Option<&PricingSurfaceResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> &str {
        &self.progress
    }

    /// Sequence number of the most recent trigger, 0 before the first
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Heatmap series for calls and puts, built fresh from the current response
    pub fn series(&self) -> Option<(Vec<HeatmapSeries>, Vec<HeatmapSeries>)> {
        self.response
            .as_ref()
            .map(|r| (to_series(&r.call_data), to_series(&r.put_data)))
    }

    /// Apply one event.
    ///
    /// Pure: the only effect is returned, never performed.
    pub fn reduce(mut self, event: Event, policy: ValidationPolicy) -> (Self, Option<Effect>) {
        match event {
            Event::Trigger(model) => {
                let seq = self.latest_seq + 1;
                self.latest_seq = seq;
                self.error = None;

                if let (ValidationPolicy::Strict, Err(e)) = (policy, model.validate()) {
                    self.submitted = Some(model);
                    self.error = Some(FetchError::from(e).user_message());
                    self.progress = PROGRESS_FAILED.to_string();
                    self.phase = Phase::Failed;
                    return (self, None);
                }

                let request = model.to_request();
                self.submitted = Some(model);
                self.progress = PROGRESS_LOADING.to_string();
                self.phase = Phase::Loading;
                (self, Some(Effect::Fetch { seq, request }))
            }
            Event::Completed { seq, outcome } => {
                if seq != self.latest_seq {
                    return (self, None);
                }
                match outcome {
                    Ok(response) => {
                        self.response = Some(response);
                        self.error = None;
                        self.progress = PROGRESS_SUCCESS.to_string();
                        self.phase = Phase::Success;
                    }
                    Err(e) => {
                        self.error = Some(e.user_message());
                        self.progress = PROGRESS_FAILED.to_string();
                        self.phase = Phase::Failed;
                    }
                }
                (self, None)
            }
        }
    }
}

/// What happened to a finished fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Result written to the state
    Applied { seq: u64, phase: Phase },
    /// Result dropped because a newer trigger exists
    Discarded { seq: u64, latest: u64 },
}

struct FetchDone {
    seq: u64,
    outcome: Result<PricingSurfaceResponse, FetchError>,
}

/// Drives [`SurfaceState`] with a [`SurfaceFetcher`].
///
/// Fetches run as background tasks; their outcomes are only applied when
/// the owner awaits [`next_completion`](Self::next_completion) or
/// [`settle`](Self::settle), so all state changes happen on the owner's task.
pub struct RequestLifecycleController<F: SurfaceFetcher> {
    fetcher: Arc<F>,
    policy: ValidationPolicy,
    parameters: ParameterModel,
    state: SurfaceState,
    done_tx: mpsc::UnboundedSender<FetchDone>,
    done_rx: mpsc::UnboundedReceiver<FetchDone>,
    pending: usize,
    activated: bool,
}

impl<F: SurfaceFetcher> RequestLifecycleController<F> {
    /// Create a controller holding the default parameters
    pub fn new(fetcher: F) -> Self {
        Self::with_parameters(fetcher, ParameterModel::default())
    }

    /// Create a controller with initial parameters
    pub fn with_parameters(fetcher: F, parameters: ParameterModel) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            fetcher: Arc::new(fetcher),
            policy: ValidationPolicy::default(),
            parameters,
            state: SurfaceState::default(),
            done_tx,
            done_rx,
            pending: 0,
            activated: false,
        }
    }

    /// Set the validation policy applied on submit
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn parameters(&self) -> &ParameterModel {
        &self.parameters
    }

    /// Editable parameters; changes take effect on the next submit
    pub fn parameters_mut(&mut self) -> &mut ParameterModel {
        &mut self.parameters
    }

    /// Fetches started but not yet collected
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Run the initial fetch once. Later calls do nothing and return `None`.
    pub fn activate(&mut self) -> Option<u64> {
        if self.activated {
            return None;
        }
        self.activated = true;
        Some(self.submit())
    }

    /// Trigger a fetch with the current parameters and return its sequence number
    pub fn submit(&mut self) -> u64 {
        let model = self.parameters.clone();
        if self.policy == ValidationPolicy::Advisory {
            if let Err(e) = model.validate() {
                warn!(error = %e, "Submitting parameters that fail validation");
            }
        }

        let state = std::mem::take(&mut self.state);
        let (state, effect) = state.reduce(Event::Trigger(model), self.policy);
        self.state = state;

        if let Some(effect) = effect {
            self.run(effect);
        } else {
            info!(
                seq = self.state.latest_seq(),
                error = self.state.error().unwrap_or_default(),
                "Trigger rejected"
            );
        }
        self.state.latest_seq()
    }

    fn run(&mut self, effect: Effect) {
        let Effect::Fetch { seq, request } = effect;
        debug!(seq, stock = %request.stock, "Starting fetch");

        let fetcher = Arc::clone(&self.fetcher);
        let done_tx = self.done_tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            // The fetch runs in its own task so a panic still yields an outcome
            let outcome = match tokio::spawn(async move { fetcher.fetch(request).await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(seq, error = %e, "Fetch task aborted");
                    Err(FetchError::transport(format!("fetch task failed: {}", e)))
                }
            };
            // Receiver lives as long as the controller
            let _ = done_tx.send(FetchDone { seq, outcome });
        });
    }

    /// Wait for the next fetch to finish and apply or discard it.
    ///
    /// Returns `None` when no fetch is outstanding.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let FetchDone { seq, outcome } = self.done_rx.recv().await?;
        self.pending -= 1;

        let latest = self.state.latest_seq();
        if seq != latest {
            debug!(seq, latest, "Discarding stale fetch result");
            return Some(Completion::Discarded { seq, latest });
        }

        if let Err(e) = &outcome {
            warn!(seq, error = %e, "Fetch failed");
        }

        let state = std::mem::take(&mut self.state);
        let (state, _) = state.reduce(Event::Completed { seq, outcome }, self.policy);
        self.state = state;

        info!(seq, phase = ?self.state.phase(), "Fetch completed");
        Some(Completion::Applied {
            seq,
            phase: self.state.phase(),
        })
    }

    /// Collect every outstanding fetch
    pub async fn settle(&mut self) -> Vec<Completion> {
        let mut completions = Vec::with_capacity(self.pending);
        while let Some(completion) = self.next_completion().await {
            completions.push(completion);
        }
        completions
    }
}
