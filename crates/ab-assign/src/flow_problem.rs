//! The integer program solved for one work origin.
//!
//! # Formulation
//!
//! Persons of an origin whose ranked candidate lists are identical form a
//! group `g` of size `n_g`.  For every candidate destination `d` of `g` an
//! integer flow `x_{g,d} ∈ [0, n_g]` counts how many of them go there, with
//!
//! ```text
//! Σ_d x_{g,d} = n_g                                  (everyone assigned once)
//! ```
//!
//! Destinations map to observed-flow cells `c` (a zone or an aggregate
//! area; destinations never observed get a cell with `o_c = 0`).  With
//! `A_c = Σ x_{g,d}` over destinations in `c` and observed count `o_c`,
//! each cell gets a deviation `dev_c ≥ 0` bounded below by
//!
//! ```text
//! dev_c ≥  s·A_c − t_c
//! dev_c ≥ −s·A_c + t_c
//! ```
//!
//! where `s = 1, t_c = o_c` for absolute counts and `s = 1/N, t_c = o_c/O`
//! for shares (`N` persons to assign, `O` observed outflow).  The objective
//! is
//!
//! ```text
//! minimise  w_max · max_dev + w_total · Σ_c dev_c,    max_dev ≥ dev_c
//! ```
//!
//! `max_dev` is only created when `w_max > 0`.  Grouped integer flows are an
//! exact reformulation of one binary per person and destination, with far
//! fewer variables when many persons share a candidate list.
//!
//! Branch-and-bound on this model can run for minutes on origins with many
//! overlapping candidate lists, share targets in particular.  Every solve
//! therefore carries a wall-clock limit; the best integer solution found by
//! then is used, and a solve that found none is an error.

use std::time::{Duration, Instant};

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolutionStatus,
    SolverModel, Variable, WithTimeLimit,
};

/// Persons sharing one candidate list.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowGroup {
    pub size: u32,
    /// Observed-flow cell of each candidate destination, in candidate
    /// order.
    pub cells: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowProblem {
    pub groups: Vec<FlowGroup>,
    /// Observed count per cell.
    pub observed: Vec<f64>,
    pub use_percentages: bool,
    pub weight_max_dev: f64,
    pub weight_total_dev: f64,
    /// Wall-clock budget of one solve.
    pub time_limit: Duration,
}

/// Group flows, in group and candidate order.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSolution {
    pub flows: Vec<Vec<u32>>,
    /// `false` when the time limit cut the search short.
    pub optimal: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlowError {
    /// The limit expired before any integer solution was found.
    TimeLimit(Duration),
    Solver(String),
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::TimeLimit(limit) => {
                write!(f, "no integer solution within {:.3}s", limit.as_secs_f64())
            }
            FlowError::Solver(reason) => f.write_str(reason),
        }
    }
}

impl FlowProblem {
    /// Number of integer flow variables.
    pub fn variable_count(&self) -> usize {
        self.groups.iter().map(|g| g.cells.len()).sum()
    }

    fn persons(&self) -> u32 {
        self.groups.iter().map(|g| g.size).sum()
    }

    /// Solve and return the flow of every group to each of its candidates.
    /// Each group's flows sum to its size.
    pub fn solve(&self) -> Result<FlowSolution, FlowError> {
        let persons = self.persons();
        if persons == 0 {
            let flows = self.groups.iter().map(|g| vec![0; g.cells.len()]).collect();
            return Ok(FlowSolution { flows, optimal: true });
        }
        let observed_total: f64 = self.observed.iter().sum();
        let (scale, targets): (f64, Vec<f64>) = if self.use_percentages && observed_total > 0.0 {
            (1.0 / persons as f64, self.observed.iter().map(|o| o / observed_total).collect())
        } else {
            (1.0, self.observed.clone())
        };

        // ── Variables ─────────────────────────────────────────────────────
        let mut vars = ProblemVariables::new();
        let flows: Vec<Vec<Variable>> = self
            .groups
            .iter()
            .map(|g| {
                g.cells
                    .iter()
                    .map(|_| vars.add(variable().integer().min(0).max(g.size as f64)))
                    .collect()
            })
            .collect();
        let devs: Vec<Variable> = targets.iter().map(|_| vars.add(variable().min(0))).collect();
        let max_dev: Option<Variable> =
            (self.weight_max_dev > 0.0).then(|| vars.add(variable().min(0)));

        // ── Objective ─────────────────────────────────────────────────────
        let w_total = self.weight_total_dev;
        let mut objective: Expression = devs.iter().map(|&d| w_total * d).sum();
        if let Some(m) = max_dev {
            objective += self.weight_max_dev * m;
        }

        let mut model = vars
            .minimise(objective)
            .using(default_solver)
            .with_time_limit(self.time_limit.as_secs_f64());

        // ── Constraints ───────────────────────────────────────────────────
        for (g, xs) in self.groups.iter().zip(&flows) {
            let total: Expression = xs.iter().copied().sum();
            let size = g.size as f64;
            model = model.with(constraint!(total == size));
        }

        let mut cell_terms: Vec<Vec<Variable>> = vec![Vec::new(); targets.len()];
        for (g, xs) in self.groups.iter().zip(&flows) {
            for (&c, &x) in g.cells.iter().zip(xs) {
                cell_terms[c].push(x);
            }
        }

        for ((terms, &target), &dev) in cell_terms.iter().zip(&targets).zip(&devs) {
            let assigned: Expression = terms.iter().map(|&x| scale * x).sum();
            let upper = assigned.clone() - dev;
            let lower = assigned + dev;
            model = model.with(constraint!(upper <= target));
            model = model.with(constraint!(lower >= target));
            if let Some(m) = max_dev {
                model = model.with(constraint!(m >= dev));
            }
        }

        let started = Instant::now();
        let solution = model.solve().map_err(|e| {
            if started.elapsed() >= self.time_limit {
                FlowError::TimeLimit(self.time_limit)
            } else {
                FlowError::Solver(e.to_string())
            }
        })?;
        let optimal = !matches!(solution.status(), SolutionStatus::TimeLimit);

        // ── Extract integer flows ─────────────────────────────────────────
        let mut out = Vec::with_capacity(self.groups.len());
        for (g, xs) in self.groups.iter().zip(&flows) {
            let mut counts: Vec<u32> = xs
                .iter()
                .map(|&x| solution.value(x).round().max(0.0) as u32)
                .collect();
            repair_total(&mut counts, g.size);
            out.push(counts);
        }
        Ok(FlowSolution { flows: out, optimal })
    }
}

/// Nudge rounded counts so they sum to `size`, adjusting the largest entry.
pub(crate) fn repair_total(counts: &mut [u32], size: u32) {
    let Some(largest) = (0..counts.len()).max_by_key(|&i| (counts[i], std::cmp::Reverse(i))) else {
        return;
    };
    let sum: u32 = counts.iter().sum();
    if sum > size {
        let mut excess = sum - size;
        // Take from the largest entries first.
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(counts[i]));
        for i in order {
            let take = excess.min(counts[i]);
            counts[i] -= take;
            excess -= take;
            if excess == 0 {
                break;
            }
        }
    } else {
        counts[largest] += size - sum;
    }
}
