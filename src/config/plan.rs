use crate::adapter::{Endpoints, SystemParams};
use crate::error::{AppError, AppResult, ConfigError, ScheduleError};
use crate::schedule::LoadCurve;

use super::types::{BehaviorConfig, PlanFile, WorkloadConfig};

/// A validated benchmark plan.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkPlan {
    pub system: String,
    pub parameters: SystemParams,
    pub endpoints: Endpoints,
    pub workloads: Vec<WorkloadPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadPlan {
    pub name: String,
    pub number: usize,
    pub location: Vec<String>,
    /// Endpoint addresses clients of this workload may talk to.
    pub candidates: Vec<String>,
    pub view: usize,
    pub behaviors: Vec<BehaviorPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorPlan {
    pub interaction: String,
    pub load: LoadCurve,
}

impl PlanFile {
    /// Validates the file and resolves load curves and endpoint candidates.
    ///
    /// # Errors
    ///
    /// Returns an error when the plan has no endpoints or workloads, a
    /// workload has no behaviors or no usable endpoints, or a load curve is
    /// invalid.
    pub fn into_plan(self) -> AppResult<BenchmarkPlan> {
        let mut endpoints = Endpoints::new();
        for group in self.endpoints {
            for address in group.addresses {
                endpoints
                    .entry(address)
                    .or_default()
                    .extend(group.tags.iter().cloned());
            }
        }
        if endpoints.is_empty() {
            return Err(AppError::config(ConfigError::MissingEndpoints));
        }
        if self.workloads.is_empty() {
            return Err(AppError::config(ConfigError::MissingWorkloads));
        }

        let workloads = self
            .workloads
            .into_iter()
            .map(|workload| resolve_workload(workload, &endpoints))
            .collect::<AppResult<Vec<_>>>()?;
        let parameters = self
            .parameters
            .into_iter()
            .map(|(key, value)| (key, value.to_param_string()))
            .collect();

        Ok(BenchmarkPlan {
            system: self.system,
            parameters,
            endpoints,
            workloads,
        })
    }
}

fn resolve_workload(workload: WorkloadConfig, endpoints: &Endpoints) -> AppResult<WorkloadPlan> {
    if workload.behaviors.is_empty() {
        return Err(AppError::config(ConfigError::MissingBehaviors {
            name: workload.name,
        }));
    }
    let candidates: Vec<String> = endpoints
        .iter()
        .filter(|(_, tags)| workload.endpoints.iter().all(|tag| tags.contains(tag)))
        .map(|(address, _)| address.clone())
        .collect();
    let view = workload.view.unwrap_or(candidates.len());
    if view == 0 || candidates.is_empty() {
        return Err(AppError::config(ConfigError::EmptyView {
            name: workload.name,
        }));
    }
    let behaviors = workload
        .behaviors
        .into_iter()
        .map(resolve_behavior)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(WorkloadPlan {
        name: workload.name,
        number: workload.number,
        location: workload.location,
        view: view.min(candidates.len()),
        candidates,
        behaviors,
    })
}

fn resolve_behavior(behavior: BehaviorConfig) -> AppResult<BehaviorPlan> {
    let mut points = Vec::with_capacity(behavior.load.len());
    for (key, rate) in behavior.load {
        let time = key
            .trim()
            .parse::<f64>()
            .map_err(|_err| AppError::schedule(ScheduleError::InvalidTimeKey { key: key.clone() }))?;
        points.push((time, rate));
    }
    let load = LoadCurve::new(points).map_err(AppError::schedule)?;
    Ok(BehaviorPlan {
        interaction: behavior.interaction,
        load,
    })
}
