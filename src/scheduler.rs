//! Cooperative step queue with generation-token cancellation.
//!
//! Long renders are split into jobs that do one small unit of work per
//! `step`. The driver calls [`Scheduler::tick`] once per frame; each live job
//! gets up to `steps_per_tick` steps, in order. Every job remembers the
//! generation it was scheduled under. Bumping the generation with
//! [`Scheduler::invalidate`] makes all earlier jobs stale, and a stale job is
//! dropped before it can touch the surface again.

use crate::raster::Surface;
use tracing::{debug, trace};

pub type Generation = u64;

/// A unit of incremental rendering work.
pub trait Job {
    /// Perform one step if any work remains. Returns `false` (without
    /// drawing) once the job is exhausted.
    fn step(&mut self, surface: &mut dyn Surface) -> bool;

    fn name(&self) -> &'static str {
        "job"
    }
}

struct Scheduled {
    generation: Generation,
    job: Box<dyn Job>,
}

pub struct Scheduler {
    generation: Generation,
    steps_per_tick: usize,
    jobs: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new(steps_per_tick: usize) -> Self {
        Self {
            generation: 0,
            steps_per_tick: steps_per_tick.max(1),
            jobs: Vec::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub fn steps_per_tick(&self) -> usize {
        self.steps_per_tick
    }

    pub fn set_steps_per_tick(&mut self, steps: usize) {
        self.steps_per_tick = steps.max(1);
    }

    /// Start a new generation. Every job scheduled before this call becomes
    /// stale and will never step again.
    pub fn invalidate(&mut self) -> Generation {
        self.generation += 1;
        let dropped = self.jobs.len();
        self.jobs.clear();
        debug!(generation = self.generation, dropped, "render generation bumped");
        self.generation
    }

    /// Queue a job under the current generation.
    pub fn schedule<J: Job + 'static>(&mut self, job: J) -> Generation {
        trace!(job = job.name(), generation = self.generation, "job scheduled");
        self.jobs.push(Scheduled {
            generation: self.generation,
            job: Box::new(job),
        });
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drain one frame's worth of steps. Returns how many steps drew.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> usize {
        let current = self.generation;
        let budget = self.steps_per_tick;
        let mut executed = 0;

        self.jobs.retain_mut(|scheduled| {
            if scheduled.generation != current {
                return false;
            }
            for _ in 0..budget {
                if !scheduled.job.step(surface) {
                    trace!(job = scheduled.job.name(), "job finished");
                    return false;
                }
                executed += 1;
            }
            true
        });

        executed
    }

    /// Tick until every live job is exhausted.
    pub fn run_to_completion(&mut self, surface: &mut dyn Surface) -> usize {
        let mut total = 0;
        while !self.is_idle() {
            total += self.tick(surface);
        }
        total
    }
}
