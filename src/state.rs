//! View state for the card and the transitions between fetch cycles.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::DisplayModel;

/// Handle for one fetch cycle. Only the newest one is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle(u64);

impl Cycle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Displayed(DisplayModel),
    Failed(String),
}

/// What [`Controller::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Displayed,
    Failed,
    /// The result belonged to a superseded cycle and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct Controller {
    state: ViewState,
    last: Option<DisplayModel>,
    next_cycle: u64,
    active: Option<Cycle>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            last: None,
            next_cycle: 1,
            active: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    /// Model to draw: the fresh one, or the last good one while loading or
    /// after a failure.
    pub fn current(&self) -> Option<&DisplayModel> {
        match &self.state {
            ViewState::Displayed(model) => Some(model),
            _ => self.last.as_ref(),
        }
    }

    /// Starts a new cycle, superseding whatever was in flight.
    pub fn begin(&mut self) -> Cycle {
        let cycle = Cycle(self.next_cycle);
        self.next_cycle += 1;
        if let Some(prev) = self.active.replace(cycle) {
            debug!(superseded = prev.id(), cycle = cycle.id(), "fetch superseded");
        }
        if let ViewState::Displayed(model) = std::mem::replace(&mut self.state, ViewState::Loading)
        {
            self.last = Some(model);
        }
        cycle
    }

    pub fn complete(
        &mut self,
        cycle: Cycle,
        result: Result<DisplayModel, FetchError>,
    ) -> Transition {
        if self.active != Some(cycle) {
            warn!(cycle = cycle.id(), "dropping result of stale fetch");
            return Transition::Stale;
        }
        self.active = None;
        match result {
            Ok(model) => {
                self.last = Some(model.clone());
                self.state = ViewState::Displayed(model);
                Transition::Displayed
            }
            Err(e) => {
                self.state = ViewState::Failed(e.to_string());
                Transition::Failed
            }
        }
    }
}
