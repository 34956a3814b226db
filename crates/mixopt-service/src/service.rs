//! Request handling shared by the HTTP layer and tests

use std::collections::HashMap;
use std::sync::Arc;

use mixopt_common::{
    ChannelConstraint, ChannelHistory, FittedCurve, HillCurve, MixError, Scenario,
};
use mixopt_genetic::{
    AllocationEvaluation, AllocationProblem, BudgetAllocationOptimizer, OptimizationResult,
    OptimizerConfig,
};
use mixopt_saturation::{FitterConfig, SaturationCurveFitter};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{RequestLimits, ServiceConfig};
use crate::error::{Result, ServiceError};
use crate::infra::{CurveStore, InMemoryCurveStore, RunStore};

/// Fit curves for one or more channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRequest {
    pub channels: Vec<ChannelHistory>,
    /// Replaces the service's fitter settings for this request
    #[serde(default)]
    pub config: Option<FitterConfig>,
}

/// Allocate a budget across channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub total_budget: Decimal,
    /// Channels to allocate across; empty means every available curve
    #[serde(default)]
    pub constraints: Vec<ChannelConstraint>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    /// Curves to use instead of the stored ones
    #[serde(default)]
    pub curves: Option<HashMap<String, HillCurve>>,
    /// Current split to compare the optimized allocation against
    #[serde(default)]
    pub current_allocation: Option<HashMap<String, f64>>,
    /// Replaces the service's optimizer settings for this request
    #[serde(default)]
    pub config: Option<OptimizerConfig>,
}

/// Score an allocation without searching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub total_budget: Decimal,
    pub allocation: HashMap<String, f64>,
    #[serde(default)]
    pub constraints: Vec<ChannelConstraint>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub curves: Option<HashMap<String, HillCurve>>,
    #[serde(default)]
    pub diversification_weight: Option<f64>,
}

/// Curve fitting and budget optimization over in-memory stores
pub struct MixOptService {
    curves: Arc<dyn CurveStore>,
    runs: RunStore,
    fitting: FitterConfig,
    optimizer: OptimizerConfig,
    limits: RequestLimits,
}

impl MixOptService {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_store(
            config,
            Arc::new(InMemoryCurveStore::new(config.store.max_curves)),
        )
    }

    pub fn with_store(config: &ServiceConfig, curves: Arc<dyn CurveStore>) -> Self {
        Self {
            curves,
            runs: RunStore::new(config.store.max_stored_runs),
            fitting: config.fitting.clone(),
            optimizer: config.optimizer.clone(),
            limits: config.limits.clone(),
        }
    }

    /// Fit every channel, then store the curves
    ///
    /// Nothing is stored unless all channels fit.
    #[instrument(skip(self, request), fields(channels = request.channels.len()))]
    pub async fn fit_curves(&self, request: FitRequest) -> Result<Vec<FittedCurve>> {
        let fitter = SaturationCurveFitter::new(request.config.unwrap_or_else(|| self.fitting.clone()))?;
        let histories = request.channels;

        let fitted = tokio::task::spawn_blocking(move || fitter.fit_all(&histories)).await??;

        self.curves.put_all(fitted.clone()).await?;

        info!(curves = fitted.len(), "Fitted saturation curves");
        Ok(fitted)
    }

    pub async fn list_curves(&self) -> Vec<FittedCurve> {
        self.curves.all().await
    }

    pub async fn get_curve(&self, channel: &str) -> Result<FittedCurve> {
        self.curves
            .get(channel)
            .await
            .ok_or_else(|| MixError::NotFound(format!("curve for channel {}", channel)).into())
    }

    pub async fn delete_curve(&self, channel: &str) -> Result<FittedCurve> {
        let removed = self.curves.remove(channel).await?;
        info!(channel, "Deleted curve");
        Ok(removed)
    }

    /// Run the genetic search and keep the result for later lookup
    #[instrument(skip(self, request), fields(budget = %request.total_budget))]
    pub async fn optimize(&self, request: OptimizeRequest) -> Result<Arc<OptimizationResult>> {
        let budget = to_budget(request.total_budget)?;
        let curves = self.resolve_curves(request.curves).await?;
        let config = request.config.unwrap_or_else(|| self.optimizer.clone());
        self.limits.check(&config)?;
        let optimizer = BudgetAllocationOptimizer::new(config)?;
        let constraints = request.constraints;
        let scenarios = request.scenarios;
        let baseline = request.current_allocation;

        let result = tokio::task::spawn_blocking(move || -> mixopt_common::Result<OptimizationResult> {
            let problem = AllocationProblem::new(&curves, &constraints, budget, &scenarios)?;
            match &baseline {
                Some(current) => optimizer.optimize_with_baseline(&problem, current),
                None => optimizer.optimize(&problem),
            }
        })
        .await??;

        let result = Arc::new(result);
        self.runs.insert(Arc::clone(&result));

        info!(
            run_id = %result.run_id,
            generations = result.generations_run,
            fitness = result.fitness.fitness,
            "Optimization run stored"
        );
        Ok(result)
    }

    pub fn get_run(&self, run_id: &Uuid) -> Result<Arc<OptimizationResult>> {
        self.runs.get(run_id).ok_or(ServiceError::RunNotFound(*run_id))
    }

    /// Score a given allocation under the request's constraints and scenarios
    pub async fn evaluate(&self, request: EvaluateRequest) -> Result<AllocationEvaluation> {
        let budget = to_budget(request.total_budget)?;
        let curves = self.resolve_curves(request.curves).await?;
        let config = OptimizerConfig {
            diversification_weight: request
                .diversification_weight
                .unwrap_or(self.optimizer.diversification_weight),
            ..self.optimizer.clone()
        };
        let optimizer = BudgetAllocationOptimizer::new(config)?;

        let problem = AllocationProblem::new(&curves, &request.constraints, budget, &request.scenarios)?;
        Ok(optimizer.evaluate(&problem, &request.allocation)?)
    }

    pub async fn curve_count(&self) -> usize {
        self.curves.count().await
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    async fn resolve_curves(
        &self,
        inline: Option<HashMap<String, HillCurve>>,
    ) -> Result<HashMap<String, HillCurve>> {
        match inline {
            Some(curves) => {
                for curve in curves.values() {
                    curve.validate().map_err(MixError::from)?;
                }
                Ok(curves)
            }
            None => Ok(self.curves.curve_map().await),
        }
    }
}

fn to_budget(total_budget: Decimal) -> Result<f64> {
    total_budget
        .to_f64()
        .ok_or_else(|| ServiceError::InvalidRequest(format!("budget {} is not representable", total_budget)))
}
