//! Step controller of the upload wizard.
//!
//! Each role runs its own step enum: the workshop wizard has three steps and
//! the customer wizard four. A wizard is either on a step or completed, in
//! which case it shows a success countdown until the caller continues.
//!
//! ```text
//! Documents ──▶ Photos ──▶ [PersonalInfo] ──▶ Review ──confirm──▶ Completed
//!     ▲            ▲              ▲              │
//!     └────────────┴──────────────┴── edit ──────┘
//! ```

use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;

use crate::config::SUCCESS_COUNTDOWN_SECS;
use crate::error::{WizardError, WizardResult};
use crate::lifecycle::{Cancelled, LifecycleToken};
use crate::models::Role;

use super::layout::UploadLayout;
use super::submit::{plan_submission, SubmissionPlan};

// =============================================================================
// Steps
// =============================================================================

/// Check applied before leaving a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepGate {
    None,
    /// Required document slots must be filled (only when enabled).
    RequiredDocuments,
    /// First and last name must be filled.
    PersonalInfo,
}

/// A role's ordered wizard steps.
pub trait WizardStep: Copy + Eq + Debug + Send + Sync + 'static {
    const ROLE: Role;
    const STEPS: &'static [Self];

    fn label(&self) -> &'static str;

    fn gate(&self) -> StepGate {
        StepGate::None
    }

    /// 1-based position.
    fn number(&self) -> u8 {
        Self::STEPS
            .iter()
            .position(|s| s == self)
            .map_or(1, |i| i as u8 + 1)
    }

    fn from_number(number: u8) -> Option<Self> {
        let index = (number as usize).checked_sub(1)?;
        Self::STEPS.get(index).copied()
    }

    fn first() -> Self {
        Self::STEPS[0]
    }

    fn is_last(&self) -> bool {
        self.number() as usize == Self::STEPS.len()
    }

    fn following(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn preceding(&self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStep {
    Documents,
    Photos,
    Review,
}

impl WizardStep for WorkshopStep {
    const ROLE: Role = Role::Workshop;
    const STEPS: &'static [Self] = &[Self::Documents, Self::Photos, Self::Review];

    fn label(&self) -> &'static str {
        match self {
            Self::Documents => "Upload Documents",
            Self::Photos => "Vehicle Photos",
            Self::Review => "Review & Submit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStep {
    Documents,
    Photos,
    PersonalInfo,
    Review,
}

impl WizardStep for CustomerStep {
    const ROLE: Role = Role::Customer;
    const STEPS: &'static [Self] = &[Self::Documents, Self::Photos, Self::PersonalInfo, Self::Review];

    fn label(&self) -> &'static str {
        match self {
            Self::Documents => "Upload Documents",
            Self::Photos => "Vehicle Photos",
            Self::PersonalInfo => "Personal Information",
            Self::Review => "Review & Submit",
        }
    }

    fn gate(&self) -> StepGate {
        match self {
            Self::Documents => StepGate::RequiredDocuments,
            Self::PersonalInfo => StepGate::PersonalInfo,
            _ => StepGate::None,
        }
    }
}

// =============================================================================
// Wizard Inputs
// =============================================================================

/// Contact details collected by the customer wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl PersonalInfo {
    pub fn validate(&self) -> WizardResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(WizardError::MissingField { field: "First name".into() });
        }
        if self.last_name.trim().is_empty() {
            return Err(WizardError::MissingField { field: "Last name".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardOptions {
    /// Block leaving the documents step while a required slot is empty.
    pub enforce_required_documents: bool,
}

/// What the gates look at.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub layout: &'a UploadLayout,
    pub personal: &'a PersonalInfo,
}

fn check_gate(gate: StepGate, ctx: &StepContext<'_>, options: &WizardOptions) -> WizardResult<()> {
    match gate {
        StepGate::None => Ok(()),
        StepGate::RequiredDocuments if options.enforce_required_documents => {
            match ctx.layout.missing_required().next() {
                Some(slot) => Err(WizardError::RequiredSlotEmpty(slot.label.clone())),
                None => Ok(()),
            }
        }
        StepGate::RequiredDocuments => Ok(()),
        StepGate::PersonalInfo => ctx.personal.validate(),
    }
}

// =============================================================================
// Success Countdown
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(u32),
    Continue,
}

/// Seconds left on the success modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessCountdown {
    remaining: u32,
}

impl Default for SuccessCountdown {
    fn default() -> Self {
        Self::new(SUCCESS_COUNTDOWN_SECS)
    }
}

impl SuccessCountdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self) -> CountdownTick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            CountdownTick::Continue
        } else {
            CountdownTick::Remaining(self.remaining)
        }
    }

    /// Tick every `period` until exhausted, reporting each remaining count.
    ///
    /// Stops with [`Cancelled`] on teardown.
    pub async fn run(
        mut self,
        token: &LifecycleToken,
        period: Duration,
        mut on_tick: impl FnMut(u32),
    ) -> Result<(), Cancelled> {
        if self.remaining == 0 {
            return Ok(());
        }
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            token.guard(interval.tick()).await?;
            match self.tick() {
                CountdownTick::Remaining(n) => on_tick(n),
                CountdownTick::Continue => return Ok(()),
            }
        }
    }
}

// =============================================================================
// Wizard
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<S> {
    Step(S),
    Completed(SuccessCountdown),
}

/// Result of a backwards move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Moved(S),
    /// `Previous` on step 1 leaves the wizard.
    Exited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard<S: WizardStep> {
    phase: Phase<S>,
    options: WizardOptions,
}

impl<S: WizardStep> Default for Wizard<S> {
    fn default() -> Self {
        Self::new(WizardOptions::default())
    }
}

impl<S: WizardStep> Wizard<S> {
    pub fn new(options: WizardOptions) -> Self {
        Self { phase: Phase::Step(S::first()), options }
    }

    /// Start on the step named by a `?step=n` URL, or step 1.
    pub fn from_url(url: &str, options: WizardOptions) -> Self {
        let step = step_from_url::<S>(url).unwrap_or_else(S::first);
        Self { phase: Phase::Step(step), options }
    }

    pub fn phase(&self) -> Phase<S> {
        self.phase
    }

    pub fn options(&self) -> &WizardOptions {
        &self.options
    }

    /// Current step, `None` once completed.
    pub fn current(&self) -> Option<S> {
        match self.phase {
            Phase::Step(step) => Some(step),
            Phase::Completed(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }

    fn step(&self) -> WizardResult<S> {
        self.current().ok_or(WizardError::Completed)
    }

    /// Leave the current step forwards, after its gate passes.
    pub fn next(&mut self, ctx: &StepContext<'_>) -> WizardResult<S> {
        let step = self.step()?;
        let target = step.following().ok_or(WizardError::NoNextStep)?;
        check_gate(step.gate(), ctx, &self.options)?;
        self.phase = Phase::Step(target);
        Ok(target)
    }

    pub fn previous(&mut self) -> WizardResult<Transition<S>> {
        let step = self.step()?;
        match step.preceding() {
            Some(target) => {
                self.phase = Phase::Step(target);
                Ok(Transition::Moved(target))
            }
            None => Ok(Transition::Exited),
        }
    }

    /// Jump back from the review step to an earlier one.
    pub fn edit_jump(&mut self, target: S) -> WizardResult<S> {
        let step = self.step()?;
        if !step.is_last() {
            return Err(WizardError::NotOnReviewStep);
        }
        if target.number() >= step.number() {
            return Err(WizardError::InvalidJump { from: step.number(), to: target.number() });
        }
        self.phase = Phase::Step(target);
        Ok(target)
    }

    /// Re-run every gate and build the submission plan.
    ///
    /// The wizard stays on the review step; call [`Wizard::complete`] once
    /// the uploads succeed.
    pub fn confirm(&self, ctx: &StepContext<'_>) -> WizardResult<SubmissionPlan> {
        let step = self.step()?;
        if !step.is_last() {
            return Err(WizardError::NotFinalStep);
        }
        for s in S::STEPS {
            check_gate(s.gate(), ctx, &self.options)?;
        }
        Ok(plan_submission(ctx.layout))
    }

    pub fn complete(&mut self) -> SuccessCountdown {
        let countdown = SuccessCountdown::default();
        self.phase = Phase::Completed(countdown);
        countdown
    }

    pub fn restart(&mut self) {
        self.phase = Phase::Step(S::first());
    }

    /// `step=n` for the current step.
    pub fn query(&self) -> Option<String> {
        self.current().map(|s| format!("step={}", s.number()))
    }
}

// =============================================================================
// Step Query Parameter
// =============================================================================

/// Step named by the `step` query parameter of `url`, if valid for `S`.
pub fn step_from_url<S: WizardStep>(url: &str) -> Option<S> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let (_, value) = parsed.query_pairs().find(|(key, _)| key == "step")?;
    S::from_number(value.trim().parse().ok()?)
}

/// `url` with its `step` parameter set to `step`, other parameters kept.
pub fn url_with_step<S: WizardStep>(url: &str, step: S) -> Option<String> {
    let mut parsed = reqwest::Url::parse(url).ok()?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "step")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("step", &step.number().to_string());
    Some(parsed.to_string())
}
