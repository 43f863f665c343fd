//! Dense-tableau two-phase simplex over `Decimal`.
//!
//! Sized for the epoch problem (four variables, a handful of rows) but
//! generic over any [`LinearProgram`].
//!
//! # Numerical policy
//!
//! - Every tableau entry is a `Decimal` (28 significant digits). Each
//!   operation is checked; overflow aborts with [`NumericalFailure::Overflow`].
//! - Entries whose magnitude falls below `1e-24` after elimination are
//!   flushed to zero.
//! - Bland's rule picks the lowest-index improving column and breaks ratio
//!   ties by the lowest basic index. Vertex selection is therefore a pure
//!   function of the input and the method cannot cycle.

use crate::core::arith::{add, div, mul, sub};
use crate::core::error::NumericalFailure;
use crate::optimization::config::SolverConfig;
use crate::optimization::engine::{LpOutcome, LpSolver};
use crate::optimization::model::{ConstraintSense, LinearProgram};
use rust_decimal::Decimal;

/// The bundled [`LpSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseSimplex {
    /// Reduced costs above this improve the objective.
    pub optimality_tolerance: Decimal,
    /// Column entries at or below this are never pivoted on.
    pub pivot_tolerance: Decimal,
    /// Pivot cap per phase.
    pub max_iterations: usize,
}

impl DenseSimplex {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            optimality_tolerance: config.optimality_tolerance,
            pivot_tolerance: config.pivot_tolerance,
            max_iterations: config.max_iterations,
        }
    }

    fn run(&self, program: &LinearProgram) -> Result<LpOutcome, NumericalFailure> {
        let n = program.num_vars();
        let lowers: Vec<Decimal> = program.bounds.iter().map(|b| b.lower).collect();

        // Everything becomes `a·x' <= b` with `x = lower + x'`, `x' >= 0`.
        let mut rows: Vec<(Vec<Decimal>, Decimal)> = Vec::new();
        for constraint in &program.constraints {
            let mut coefficients = constraint.coefficients.clone();
            coefficients.resize(n, Decimal::ZERO);
            let mut shift = Decimal::ZERO;
            for (a, l) in coefficients.iter().zip(&lowers) {
                shift = add(shift, mul(*a, *l)?)?;
            }
            let rhs = sub(constraint.rhs, shift)?;
            let negated: Vec<Decimal> = coefficients.iter().map(|a| -*a).collect();

            match constraint.sense {
                ConstraintSense::LessEqual => rows.push((coefficients, rhs)),
                ConstraintSense::GreaterEqual => rows.push((negated, -rhs)),
                ConstraintSense::Equal => {
                    rows.push((coefficients, rhs));
                    rows.push((negated, -rhs));
                }
            }
        }
        for (j, bounds) in program.bounds.iter().enumerate() {
            if let Some(upper) = bounds.upper {
                let span = sub(upper, bounds.lower)?;
                if span < Decimal::ZERO {
                    return Ok(LpOutcome::Infeasible);
                }
                let mut coefficients = vec![Decimal::ZERO; n];
                coefficients[j] = Decimal::ONE;
                rows.push((coefficients, span));
            }
        }

        let mut tableau = Tableau::new(n, rows);

        if tableau.has_artificials() {
            let costs = tableau.phase_one_costs();
            let limit = tableau.width;
            if self.optimize(&mut tableau, &costs, limit)? == Phase::Unbounded {
                // -sum(artificials) is bounded above by zero.
                return Err(NumericalFailure::Unbounded);
            }
            if tableau.artificial_level()? > self.optimality_tolerance {
                log::debug!("phase I ended with positive artificials, program infeasible");
                return Ok(LpOutcome::Infeasible);
            }
            self.drive_out_artificials(&mut tableau)?;
        }

        let mut costs = program.objective.clone();
        costs.resize(tableau.width, Decimal::ZERO);
        let limit = tableau.slack_end;
        if self.optimize(&mut tableau, &costs, limit)? == Phase::Unbounded {
            return Ok(LpOutcome::Unbounded);
        }

        let mut values = lowers;
        for (row, &column) in tableau.basis.iter().enumerate() {
            if column < n {
                values[column] = add(values[column], tableau.rhs(row))?;
            }
        }
        let mut objective = Decimal::ZERO;
        for (c, x) in program.objective.iter().zip(&values) {
            objective = add(objective, mul(*c, *x)?)?;
        }

        log::debug!(
            "simplex optimal after {} pivots, objective {}",
            tableau.pivots,
            objective.normalize()
        );
        Ok(LpOutcome::Optimal { values, objective })
    }

    /// Pivot until no column below `entering_limit` improves `costs`.
    fn optimize(
        &self,
        tableau: &mut Tableau,
        costs: &[Decimal],
        entering_limit: usize,
    ) -> Result<Phase, NumericalFailure> {
        for _ in 0..self.max_iterations {
            let mut entering = None;
            for column in 0..entering_limit {
                if tableau.is_basic(column) {
                    continue;
                }
                if tableau.reduced_cost(costs, column)? > self.optimality_tolerance {
                    entering = Some(column);
                    break;
                }
            }
            let Some(column) = entering else {
                return Ok(Phase::Optimal);
            };

            let mut leaving: Option<(usize, Decimal)> = None;
            for row in 0..tableau.rows.len() {
                let a = tableau.rows[row][column];
                if a <= self.pivot_tolerance {
                    continue;
                }
                let ratio = div(tableau.rhs(row).max(Decimal::ZERO), a)?;
                let better = match leaving {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < best_ratio
                            || (ratio == best_ratio && tableau.basis[row] < tableau.basis[best])
                    }
                };
                if better {
                    leaving = Some((row, ratio));
                }
            }
            let Some((row, _)) = leaving else {
                return Ok(Phase::Unbounded);
            };

            tableau.pivot(row, column)?;
        }
        Err(NumericalFailure::IterationLimit {
            limit: self.max_iterations,
        })
    }

    /// Replace zero-level artificials in the basis with real columns.
    ///
    /// A row left with an artificial has no non-artificial entries and is
    /// redundant; it stays at zero for the rest of the solve.
    fn drive_out_artificials(&self, tableau: &mut Tableau) -> Result<(), NumericalFailure> {
        for row in 0..tableau.rows.len() {
            if tableau.basis[row] < tableau.slack_end {
                continue;
            }
            let replacement = (0..tableau.slack_end)
                .find(|&column| tableau.rows[row][column].abs() > self.pivot_tolerance);
            if let Some(column) = replacement {
                let rhs = tableau.width;
                tableau.rows[row][rhs] = Decimal::ZERO;
                tableau.pivot(row, column)?;
            }
        }
        Ok(())
    }
}

impl Default for DenseSimplex {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl LpSolver for DenseSimplex {
    fn name(&self) -> &'static str {
        "dense-simplex"
    }

    fn solve(&self, program: &LinearProgram) -> LpOutcome {
        match self.run(program) {
            Ok(outcome) => outcome,
            Err(failure) => LpOutcome::NumericalFailure(failure),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Optimal,
    Unbounded,
}

/// Columns: structural `[0, n)`, one slack per row `[n, n + m)`, then
/// artificials. The right-hand side sits after the last column.
struct Tableau {
    rows: Vec<Vec<Decimal>>,
    basis: Vec<usize>,
    slack_end: usize,
    width: usize,
    pivots: usize,
}

impl Tableau {
    fn new(n: usize, rows: Vec<(Vec<Decimal>, Decimal)>) -> Self {
        let m = rows.len();
        let artificials = rows.iter().filter(|(_, b)| *b < Decimal::ZERO).count();
        let slack_end = n + m;
        let width = slack_end + artificials;

        let mut tableau_rows = Vec::with_capacity(m);
        let mut basis = Vec::with_capacity(m);
        let mut next_artificial = slack_end;
        for (i, (coefficients, rhs)) in rows.into_iter().enumerate() {
            let mut row = vec![Decimal::ZERO; width + 1];
            if rhs < Decimal::ZERO {
                for (cell, a) in row.iter_mut().zip(&coefficients) {
                    *cell = -*a;
                }
                row[n + i] = -Decimal::ONE;
                row[next_artificial] = Decimal::ONE;
                row[width] = -rhs;
                basis.push(next_artificial);
                next_artificial += 1;
            } else {
                row[..n].copy_from_slice(&coefficients);
                row[n + i] = Decimal::ONE;
                row[width] = rhs;
                basis.push(n + i);
            }
            tableau_rows.push(row);
        }

        Self {
            rows: tableau_rows,
            basis,
            slack_end,
            width,
            pivots: 0,
        }
    }

    fn has_artificials(&self) -> bool {
        self.width > self.slack_end
    }

    fn phase_one_costs(&self) -> Vec<Decimal> {
        (0..self.width)
            .map(|column| {
                if column >= self.slack_end {
                    -Decimal::ONE
                } else {
                    Decimal::ZERO
                }
            })
            .collect()
    }

    /// Sum of artificial variables currently in the basis.
    fn artificial_level(&self) -> Result<Decimal, NumericalFailure> {
        let mut level = Decimal::ZERO;
        for (row, &column) in self.basis.iter().enumerate() {
            if column >= self.slack_end {
                level = add(level, self.rhs(row))?;
            }
        }
        Ok(level)
    }

    fn rhs(&self, row: usize) -> Decimal {
        self.rows[row][self.width]
    }

    fn is_basic(&self, column: usize) -> bool {
        self.basis.contains(&column)
    }

    fn reduced_cost(&self, costs: &[Decimal], column: usize) -> Result<Decimal, NumericalFailure> {
        let mut reduced = costs[column];
        for (row, &basic) in self.basis.iter().enumerate() {
            let cost = costs[basic];
            if cost.is_zero() {
                continue;
            }
            reduced = sub(reduced, mul(cost, self.rows[row][column])?)?;
        }
        Ok(reduced)
    }

    fn pivot(&mut self, row: usize, column: usize) -> Result<(), NumericalFailure> {
        let element = self.rows[row][column];
        let mut pivot_row = Vec::with_capacity(self.width + 1);
        for value in &self.rows[row] {
            pivot_row.push(div(*value, element)?);
        }
        pivot_row[column] = Decimal::ONE;

        let dust = Decimal::new(1, 24);
        for (i, current) in self.rows.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[column];
            if factor.is_zero() {
                continue;
            }
            for (cell, p) in current.iter_mut().zip(&pivot_row) {
                let value = sub(*cell, mul(factor, *p)?)?;
                *cell = if value.abs() < dust {
                    Decimal::ZERO
                } else {
                    value
                };
            }
            current[column] = Decimal::ZERO;
        }

        self.rows[row] = pivot_row;
        self.basis[row] = column;
        self.pivots += 1;
        log::trace!("pivot #{} on row {} column {}", self.pivots, row, column);
        Ok(())
    }
}
