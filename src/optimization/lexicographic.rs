//! Priority-staged solving on top of any [`LpSolver`].
//!
//! A weighted objective only ranks legs correctly when every row prices the
//! legs alike. The epoch ratio rows do not (a junior redemption uses
//! `1 - minJuniorRatio` of headroom, a senior investment `minJuniorRatio`), so
//! the weights are treated as a priority order instead:
//!
//! 1. Group variables by the magnitude of their objective coefficient,
//!    largest first. Each group is one stage.
//! 2. Maximize the signed sum of the stage's variables alone.
//! 3. Pin the achieved level with a `>=` row and move to the next stage.
//!
//! The final assignment is the last stage's optimum, with the objective
//! re-priced at the original coefficients.

use crate::core::arith;
use crate::core::error::NumericalFailure;
use crate::optimization::engine::{LpOutcome, LpSolver};
use crate::optimization::model::{Constraint, LinearProgram};
use crate::optimization::simplex::DenseSimplex;
use rust_decimal::Decimal;

/// Row name given to the pin added after each stage.
pub const PRIORITY_PIN: &str = "priority_pin";

/// Lexicographic maximization by objective-coefficient magnitude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicographic<S = DenseSimplex> {
    inner: S,
}

impl<S> Lexicographic<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl Default for Lexicographic<DenseSimplex> {
    fn default() -> Self {
        Self::new(DenseSimplex::default())
    }
}

impl<S: LpSolver> Lexicographic<S> {
    fn run(&self, program: &LinearProgram) -> Result<LpOutcome, NumericalFailure> {
        let stages = priority_stages(&program.objective);
        if stages.is_empty() {
            return Ok(self.inner.solve(program));
        }

        let mut staged = program.clone();
        let mut values = Vec::new();
        for (stage, coefficients) in stages.iter().enumerate() {
            staged.objective = coefficients.clone();
            match self.inner.solve(&staged) {
                LpOutcome::Optimal {
                    values: stage_values,
                    objective,
                } => {
                    log::debug!(
                        "priority stage {} of {}: level {}",
                        stage,
                        stages.len(),
                        objective.normalize()
                    );
                    staged = staged.with_constraint(Constraint::geq(
                        PRIORITY_PIN,
                        coefficients.clone(),
                        objective,
                    ));
                    values = stage_values;
                }
                LpOutcome::Infeasible if stage == 0 => return Ok(LpOutcome::Infeasible),
                LpOutcome::Infeasible => return Err(NumericalFailure::LostFeasibility { stage }),
                LpOutcome::Unbounded => return Ok(LpOutcome::Unbounded),
                LpOutcome::NumericalFailure(failure) => return Err(failure),
            }
        }

        if values.len() != program.num_vars() {
            return Err(NumericalFailure::MalformedAssignment {
                expected: program.num_vars(),
                actual: values.len(),
            });
        }
        let objective = arith::dot(&program.objective, &values)?;
        Ok(LpOutcome::Optimal { values, objective })
    }
}

impl<S: LpSolver> LpSolver for Lexicographic<S> {
    fn name(&self) -> &'static str {
        "lexicographic"
    }

    fn solve(&self, program: &LinearProgram) -> LpOutcome {
        match self.run(program) {
            Ok(outcome) => outcome,
            Err(failure) => {
                log::warn!("lexicographic solve failed: {}", failure);
                LpOutcome::NumericalFailure(failure)
            }
        }
    }
}

/// One `{-1, 0, 1}` objective per distinct nonzero coefficient magnitude,
/// largest magnitude first.
fn priority_stages(objective: &[Decimal]) -> Vec<Vec<Decimal>> {
    let mut levels: Vec<Decimal> = objective
        .iter()
        .filter(|c| !c.is_zero())
        .map(|c| c.abs().normalize())
        .collect();
    levels.sort_by(|a, b| b.cmp(a));
    levels.dedup();

    levels
        .into_iter()
        .map(|level| {
            objective
                .iter()
                .map(|c| {
                    if c.abs() != level {
                        Decimal::ZERO
                    } else if c.is_sign_negative() {
                        -Decimal::ONE
                    } else {
                        Decimal::ONE
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::model::VariableBounds;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000000001),
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn optimal(outcome: LpOutcome) -> (Vec<Decimal>, Decimal) {
        match outcome {
            LpOutcome::Optimal { values, objective } => (values, objective),
            other => panic!("expected optimal, got {:?}", other),
        }
    }

    /// `x` is worth more per unit but uses 100x the shared capacity of `y`.
    fn lopsided() -> LinearProgram {
        let mut program = LinearProgram::new(2).with_constraint(Constraint::leq(
            "capacity",
            vec![dec!(100), dec!(1)],
            dec!(100),
        ));
        program.objective = vec![dec!(2), dec!(1)];
        program.bounds[0] = VariableBounds::bounded(dec!(0), dec!(1));
        program.bounds[1] = VariableBounds::bounded(dec!(0), dec!(100));
        program
    }

    #[test]
    fn test_stages_by_magnitude() {
        let stages = priority_stages(&[dec!(1), dec!(-8), dec!(0), dec!(8.0), dec!(2)]);
        assert_eq!(
            stages,
            vec![
                vec![dec!(0), dec!(-1), dec!(0), dec!(1), dec!(0)],
                vec![dec!(0), dec!(0), dec!(0), dec!(0), dec!(1)],
                vec![dec!(1), dec!(0), dec!(0), dec!(0), dec!(0)],
            ]
        );
        assert!(priority_stages(&[dec!(0), dec!(0)]).is_empty());
    }

    #[test]
    fn test_higher_priority_wins_over_weighted_sum() {
        let program = lopsided();

        // The weighted sum prefers 100 units of y over 1 unit of x.
        let (weighted, _) = optimal(DenseSimplex::default().solve(&program));
        assert_close(weighted[1], dec!(100));

        let (values, objective) = optimal(Lexicographic::default().solve(&program));
        assert_close(values[0], dec!(1));
        assert_close(values[1], dec!(0));
        assert_close(objective, dec!(2));
    }

    #[test]
    fn test_lower_stage_uses_leftover_capacity() {
        // max 5x + y, x + y <= 10, x <= 4
        let mut program = LinearProgram::new(2).with_constraint(Constraint::leq(
            "capacity",
            vec![dec!(1), dec!(1)],
            dec!(10),
        ));
        program.objective = vec![dec!(5), dec!(1)];
        program.bounds[0] = VariableBounds::bounded(dec!(0), dec!(4));

        let (values, objective) = optimal(Lexicographic::default().solve(&program));
        assert_close(values[0], dec!(4));
        assert_close(values[1], dec!(6));
        assert_close(objective, dec!(26));
    }

    #[test]
    fn test_infeasible_first_stage() {
        let program = lopsided().with_constraint(Constraint::geq(
            "too_much",
            vec![dec!(1), dec!(1)],
            dec!(1000),
        ));
        assert_eq!(
            Lexicographic::default().solve(&program),
            LpOutcome::Infeasible
        );
    }

    #[test]
    fn test_zero_objective_solves_once() {
        let mut program = lopsided();
        program.objective = vec![dec!(0), dec!(0)];
        let (_, objective) = optimal(Lexicographic::default().solve(&program));
        assert_eq!(objective, Decimal::ZERO);
    }

    #[test]
    fn test_unbounded_passes_through() {
        let mut program = LinearProgram::new(1);
        program.objective = vec![dec!(1)];
        assert_eq!(
            Lexicographic::default().solve(&program),
            LpOutcome::Unbounded
        );
    }

    /// Answers stage 0, then claims the pinned program is infeasible.
    struct ForgetfulEngine;

    impl LpSolver for ForgetfulEngine {
        fn name(&self) -> &'static str {
            "forgetful"
        }

        fn solve(&self, program: &LinearProgram) -> LpOutcome {
            if program.constraints.iter().any(|c| c.name == PRIORITY_PIN) {
                LpOutcome::Infeasible
            } else {
                LpOutcome::Optimal {
                    values: vec![Decimal::ZERO; program.num_vars()],
                    objective: Decimal::ZERO,
                }
            }
        }
    }

    #[test]
    fn test_lost_feasibility_is_numerical_failure() {
        assert_eq!(
            Lexicographic::new(ForgetfulEngine).solve(&lopsided()),
            LpOutcome::NumericalFailure(NumericalFailure::LostFeasibility { stage: 1 })
        );
    }

    #[test]
    fn test_repeat_solves_are_identical() {
        let engine = Lexicographic::default();
        let first = engine.solve(&lopsided());
        for _ in 0..3 {
            assert_eq!(engine.solve(&lopsided()), first);
        }
    }
}
