//! Simulated pool of parallel workers on a virtual clock.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use sb_types::{validation_error, BenchResult, TimeDistribution};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::debug;

/// A job that has been assigned to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedJob {
    pub job_id: usize,
    pub worker_id: usize,
    pub point: Vec<f64>,
    pub start_time: f64,
    pub end_time: f64,
}

impl DispatchedJob {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Heap entry ordered by completion time, then dispatch order.
#[derive(Debug, Clone)]
struct PendingJob(DispatchedJob);

impl PartialEq for PendingJob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingJob {}

impl PartialOrd for PendingJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .end_time
            .total_cmp(&other.0.end_time)
            .then(self.0.job_id.cmp(&other.0.job_id))
    }
}

/// Simulates `num_workers` workers whose evaluation times follow a
/// [`TimeDistribution`].
///
/// Jobs go to whichever worker frees up first; [`next_completion`] hands
/// finished jobs back in completion order and advances the clock.
///
/// [`next_completion`]: SyntheticWorkerManager::next_completion
#[derive(Debug, Clone)]
pub struct SyntheticWorkerManager {
    num_workers: usize,
    time_distro: TimeDistribution,
    seed: Option<u64>,
    rng: ChaCha8Rng,
    worker_free_at: Vec<f64>,
    pending: BinaryHeap<Reverse<PendingJob>>,
    clock: f64,
    next_job_id: usize,
}

impl SyntheticWorkerManager {
    pub fn new(
        num_workers: usize,
        time_distro: TimeDistribution,
        seed: Option<u64>,
    ) -> BenchResult<Self> {
        if num_workers == 0 {
            return Err(validation_error!("worker manager needs at least one worker"));
        }
        Ok(Self {
            num_workers,
            time_distro,
            seed,
            rng: Self::make_rng(seed),
            worker_free_at: vec![0.0; num_workers],
            pending: BinaryHeap::new(),
            clock: 0.0,
            next_job_id: 0,
        })
    }

    fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
        match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn time_distro(&self) -> TimeDistribution {
        self.time_distro
    }

    /// Current simulated time.
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Workers idle at the current simulated time.
    pub fn num_free_workers(&self) -> usize {
        self.worker_free_at
            .iter()
            .filter(|free_at| **free_at <= self.clock)
            .count()
    }

    fn sample_duration(&mut self, caller_eval_cost: Option<f64>) -> BenchResult<f64> {
        match self.time_distro {
            TimeDistribution::Const => Ok(1.0),
            TimeDistribution::CallerEvalCost => match caller_eval_cost {
                Some(cost) if cost.is_finite() && cost >= 0.0 => Ok(cost),
                Some(cost) => Err(validation_error!("invalid evaluation cost {cost}")),
                None => Err(validation_error!(
                    "time distribution 'caller_eval_cost' requires an evaluation cost"
                )),
            },
            TimeDistribution::Uniform => Ok(self.rng.random_range(0.0..2.0)),
            TimeDistribution::HalfNormal => {
                // |N(0, s)| has mean s * sqrt(2 / pi); pick s for unit mean.
                let scale = (std::f64::consts::PI / 2.0).sqrt();
                let normal = Normal::new(0.0, scale)
                    .map_err(|e| validation_error!("half-normal time distribution: {e}"))?;
                Ok(normal.sample(&mut self.rng).abs())
            }
        }
    }

    /// Assign an evaluation of `point` to the earliest available worker.
    pub fn dispatch(
        &mut self,
        point: Vec<f64>,
        caller_eval_cost: Option<f64>,
    ) -> BenchResult<DispatchedJob> {
        let duration = self.sample_duration(caller_eval_cost)?;

        let (worker_id, free_at) = self
            .worker_free_at
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .unwrap_or((0, self.clock));

        let start_time = free_at.max(self.clock);
        let job = DispatchedJob {
            job_id: self.next_job_id,
            worker_id,
            point,
            start_time,
            end_time: start_time + duration,
        };
        self.next_job_id += 1;
        self.worker_free_at[worker_id] = job.end_time;
        debug!(
            "Dispatched job {} to worker {} ({:.3} -> {:.3})",
            job.job_id, worker_id, job.start_time, job.end_time
        );
        self.pending.push(Reverse(PendingJob(job.clone())));
        Ok(job)
    }

    /// Pop the next job to finish, advancing the clock to its end time.
    pub fn next_completion(&mut self) -> Option<DispatchedJob> {
        let Reverse(PendingJob(job)) = self.pending.pop()?;
        self.clock = self.clock.max(job.end_time);
        Some(job)
    }

    /// Return to the initial state (clock zero, all workers idle, seed rewound).
    pub fn reset(&mut self) {
        self.rng = Self::make_rng(self.seed);
        self.worker_free_at = vec![0.0; self.num_workers];
        self.pending.clear();
        self.clock = 0.0;
        self.next_job_id = 0;
    }
}
