//! Steepest-ascent gradient search with backtracking line search.

use std::sync::Arc;

use tracing::trace;

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::local_search::IterationHook;
use crate::population::{Entity, EntityId, Population};
use crate::rng::RandomNumberGenerator;

/// Numeric floor under which step sizes and gradient magnitudes count
/// as zero.
pub const APPROX_ZERO: f64 = 1e-18;

/// Maps an entity's chromosomes onto a real vector.
pub type ToVectorFn<R> = dyn Fn(&Entity<R>, &mut [f64]) + Send + Sync;
/// Writes a real vector back into an entity's chromosomes.
pub type FromVectorFn<R> = dyn Fn(&mut Entity<R>, &[f64]) + Send + Sync;
/// Fills the gradient at a point and returns its RMS magnitude.
pub type GradientFn<R> = dyn Fn(&Entity<R>, &[f64], &mut [f64]) -> f64 + Send + Sync;

/// Gradient-search parameter block, created lazily on the population.
pub struct GradientParams<R: Representation> {
    pub to_vector: Arc<ToVectorFn<R>>,
    pub from_vector: Arc<FromVectorFn<R>>,
    pub gradient: Arc<GradientFn<R>>,
    /// Dimensionality of the search vector; need not match the
    /// chromosome shape.
    pub dimensions: usize,
    /// Initial step size.
    pub step_size: f64,
    /// Step-size scale-down factor applied while backtracking.
    pub alpha: f64,
    /// Step-size scale-up factor applied after an accepted step.
    pub beta: f64,
}

impl<R: Representation> Clone for GradientParams<R> {
    fn clone(&self) -> Self {
        Self {
            to_vector: Arc::clone(&self.to_vector),
            from_vector: Arc::clone(&self.from_vector),
            gradient: Arc::clone(&self.gradient),
            dimensions: self.dimensions,
            step_size: self.step_size,
            alpha: self.alpha,
            beta: self.beta,
        }
    }
}

impl<R: Representation> Population<R> {
    /// Installs the gradient-search parameter block. Must be called
    /// before [`steepest_ascent`].
    pub fn set_gradient_parameters(
        &mut self,
        to_vector: Arc<ToVectorFn<R>>,
        from_vector: Arc<FromVectorFn<R>>,
        gradient: Arc<GradientFn<R>>,
        dimensions: usize,
        step_size: f64,
    ) {
        self.gradient_params = Some(GradientParams {
            to_vector,
            from_vector,
            gradient,
            dimensions,
            step_size,
            alpha: 0.5,
            beta: 1.2,
        });
    }
}

/// Steepest-ascent optimization of a single entity. Each iteration
/// steps along the gradient scaled by the current step size; a worse
/// result shrinks the step and retries in place until improvement or
/// the step underflows [`APPROX_ZERO`]. The search terminates when both
/// the step size and the gradient RMS underflow the floor, on budget
/// exhaustion, or when the hook declines to continue. Returns the
/// number of iterations performed.
pub fn steepest_ascent<R: Representation>(
    pop: &mut Population<R>,
    start: Option<EntityId>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    mut hook: Option<IterationHook<'_, R>>,
) -> Result<usize> {
    let params = pop
        .gradient_params
        .clone()
        .ok_or(GeneticError::OperatorUnset("gradient parameters"))?;
    if pop.evaluator().is_none() {
        return Err(GeneticError::OperatorUnset("evaluator"));
    }
    if params.dimensions == 0 {
        return Err(GeneticError::Configuration(
            "gradient search needs at least one dimension".to_string(),
        ));
    }

    let dimensions = params.dimensions;
    let mut current_d = vec![0.0; dimensions];
    let mut putative_d = vec![0.0; dimensions];
    let mut current_g = vec![0.0; dimensions];

    let mut putative = pop.acquire();
    let mut current = match start {
        Some(id) => {
            pop.entity(id)?;
            id
        }
        None => {
            let id = pop.acquire();
            pop.seed_entity(id, rng)?;
            id
        }
    };

    pop.score_entity(current)?;
    (params.to_vector)(pop.entity(current)?, &mut current_d);
    let mut grms = (params.gradient)(pop.entity(current)?, &current_d, &mut current_g);
    let mut step_size = params.step_size;

    let mut iteration = 0;
    let mut force_terminate = false;
    while !force_terminate && iteration < max_iterations {
        if let Some(hook) = hook.as_mut() {
            if !hook(iteration, pop.entity(current)?) {
                break;
            }
        }
        iteration += 1;

        for i in 0..dimensions {
            putative_d[i] = current_d[i] + step_size * current_g[i];
        }
        (params.from_vector)(pop.entity_mut(putative)?, &putative_d);
        pop.score_entity(putative)?;

        if pop.entity(current)?.fitness() > pop.entity(putative)?.fitness() {
            // Worse: backtrack in place.
            loop {
                step_size *= params.alpha;
                for i in 0..dimensions {
                    putative_d[i] = current_d[i] + step_size * current_g[i];
                }
                (params.from_vector)(pop.entity_mut(putative)?, &putative_d);
                pop.score_entity(putative)?;
                if pop.entity(current)?.fitness() <= pop.entity(putative)?.fitness()
                    || step_size <= APPROX_ZERO
                {
                    break;
                }
            }
            if step_size <= APPROX_ZERO && grms <= APPROX_ZERO {
                force_terminate = true;
            }
        } else {
            step_size *= params.beta;
        }

        std::mem::swap(&mut current, &mut putative);
        std::mem::swap(&mut current_d, &mut putative_d);

        grms = (params.gradient)(pop.entity(current)?, &current_d, &mut current_g);
        trace!(
            iteration,
            step_size,
            grms,
            fitness = pop.entity(current)?.fitness(),
            "gradient step"
        );
    }

    pop.release(putative)?;
    Ok(iteration)
}
