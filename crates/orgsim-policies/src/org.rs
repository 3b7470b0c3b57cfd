//! Built-in org: quota-capped recruitment with configurable pay.

use serde::{Deserialize, Serialize};
use tracing::debug;

use orgsim_types::{Identity, PublicProfile, WorldState};

use crate::error::{PolicyError, check_non_negative, check_unit};
use crate::policy::{CandidateVerdict, IdentityAmounts, OrgPolicy};
use crate::recruitment::RoleModelSelection;
use crate::reward::RewardDistribution;

/// How daily salaries are re-evaluated at each period end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SalaryPolicy {
    /// Everyone keeps the seed's daily salary.
    #[default]
    Flat,
    /// `floor + rate * contribution / fiscal_length`, per day.
    ContributionIndexed {
        /// Minimum daily salary.
        floor: f64,
        /// Salary per unit of average daily contribution.
        rate: f64,
    },
}

/// Default cap on candidates evaluated per recruitment pass.
pub const DEFAULT_MAX_INTERVIEWS: u32 = 1000;

/// Parameters of [`QuotaOrg`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaOrgParams {
    /// Admissions per recruitment pass. `None` uses the world seed's quota.
    pub quota: Option<u32>,
    /// Candidates scoring below this are rejected.
    pub min_interview_score: Option<f64>,
    /// Candidates evaluated per pass before the pass is stopped.
    pub max_interviews: u32,
    /// How bonuses are split.
    pub distribution: RewardDistribution,
    /// Fraction of the reward pool retained for shareholders.
    pub shareholder_cut: f64,
    /// Salary re-evaluation rule.
    pub salary: SalaryPolicy,
    /// Role models for recruitment.
    pub role_models: RoleModelSelection,
}

impl Default for QuotaOrgParams {
    fn default() -> Self {
        Self {
            quota: None,
            min_interview_score: None,
            max_interviews: DEFAULT_MAX_INTERVIEWS,
            distribution: RewardDistribution::default(),
            shareholder_cut: 0.0,
            salary: SalaryPolicy::default(),
            role_models: RoleModelSelection::default(),
        }
    }
}

/// Org that admits up to a fixed number of candidates per period.
///
/// Once the quota is reached, or `max_interviews` candidates have been
/// seen, the next evaluated candidate ends the pass.
#[derive(Debug, Clone)]
pub struct QuotaOrg {
    params: QuotaOrgParams,
    /// Admissions over the whole run.
    admitted: u64,
    /// Candidates evaluated in the current pass.
    interviewed: u32,
}

impl QuotaOrg {
    /// Validate parameters and build the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if a fraction is outside `[0, 1]` or a salary
    /// parameter is negative.
    pub fn new(params: QuotaOrgParams) -> Result<Self, PolicyError> {
        check_unit("shareholder_cut", params.shareholder_cut)?;
        if let Some(min) = params.min_interview_score {
            check_unit("min_interview_score", min)?;
        }
        if let RoleModelSelection::TopContributors { percentile } = params.role_models {
            check_unit("percentile", percentile)?;
        }
        if let SalaryPolicy::ContributionIndexed { floor, rate } = params.salary {
            check_non_negative("salary floor", floor)?;
            check_non_negative("salary rate", rate)?;
        }
        Ok(Self {
            params,
            admitted: 0,
            interviewed: 0,
        })
    }

    /// The validated parameters.
    pub const fn params(&self) -> &QuotaOrgParams {
        &self.params
    }

    /// Admissions over the whole run.
    pub const fn admitted(&self) -> u64 {
        self.admitted
    }

    fn quota(&self, state: &WorldState) -> u32 {
        self.params.quota.unwrap_or(state.seed.recruitment_quota)
    }
}

impl OrgPolicy for QuotaOrg {
    fn kind(&self) -> &'static str {
        "quota"
    }

    fn compute_shareholder_value(&mut self, state: &WorldState) -> f64 {
        state.total_reward * self.params.shareholder_cut
    }

    fn compute_bonuses(&mut self, state: &WorldState) -> Option<IdentityAmounts> {
        self.params.distribution.compute(state.total_reward, state)
    }

    fn re_evaluate_salaries(&mut self, state: &WorldState) -> IdentityAmounts {
        match self.params.salary {
            SalaryPolicy::Flat => state
                .people
                .keys()
                .map(|id| (id.clone(), state.seed.daily_salary))
                .collect(),
            SalaryPolicy::ContributionIndexed { floor, rate } => {
                let days = f64::from(state.seed.fiscal_length.max(1));
                state
                    .people
                    .iter()
                    .map(|(id, p)| (id.clone(), rate.mul_add(p.contribution / days, floor)))
                    .collect()
            }
        }
    }

    fn evaluate_individuals(&mut self, state: &WorldState) -> IdentityAmounts {
        // Called once at the start of every recruitment pass.
        self.interviewed = 0;
        self.params.role_models.select(state)
    }

    fn evaluate_candidate(
        &mut self,
        state: &WorldState,
        public: &PublicProfile,
    ) -> CandidateVerdict {
        if state.org.recruited_this_period >= self.quota(state) {
            return CandidateVerdict::Stop;
        }
        if self.interviewed >= self.params.max_interviews {
            debug!(interviewed = self.interviewed, "interview budget spent");
            return CandidateVerdict::Stop;
        }
        self.interviewed = self.interviewed.saturating_add(1);
        match self.params.min_interview_score {
            Some(min) if public.interview_score < min => CandidateVerdict::Reject,
            _ => CandidateVerdict::Admit,
        }
    }

    fn recruit(&mut self, _state: &WorldState, identity: &Identity, public: &PublicProfile) {
        self.admitted = self.admitted.saturating_add(1);
        debug!(
            identity = %identity,
            interview_score = public.interview_score,
            total_admitted = self.admitted,
            "candidate admitted"
        );
    }
}
