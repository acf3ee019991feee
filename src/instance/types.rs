//! Problem instance: processing-time matrix and setup-time tensor.

use crate::error::{FlowShopError, Result};
use crate::schedule::check_sequence;

use super::evaluator::MakespanEvaluator;

/// An SDST permutation flow-shop instance.
///
/// Holds `N` jobs, `M` machines, the processing time of every
/// (job, machine) pair and the changeover incurred on a machine when one
/// job immediately follows another. Tables are stored flat and are
/// read-only after construction.
///
/// # Examples
///
/// ```
/// use u_flowshop::ProblemInstance;
///
/// let instance = ProblemInstance::without_setup(vec![vec![4, 3], vec![2, 5]]).unwrap();
/// assert_eq!(instance.job_count(), 2);
/// assert_eq!(instance.evaluate(&[1, 0]).unwrap(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "InstanceTables", into = "InstanceTables")
)]
pub struct ProblemInstance {
    jobs: usize,
    machines: usize,
    /// `processing[job * machines + machine]`
    processing: Vec<u64>,
    /// `setup[(machine * jobs + prev) * jobs + job]`
    setup: Vec<u64>,
}

/// Nested-table form of an instance, as produced by loaders and used for
/// (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceTables {
    /// Number of jobs.
    pub jobs: usize,
    /// Number of machines.
    pub machines: usize,
    /// `processing_time[job][machine]`.
    pub processing_time: Vec<Vec<u64>>,
    /// `setup_time[machine][prev_job][job]`.
    pub setup_time: Vec<Vec<Vec<u64>>>,
}

impl ProblemInstance {
    /// Builds an instance from nested tables.
    ///
    /// # Errors
    ///
    /// [`FlowShopError::InvalidInstance`] if `processing_time` is not
    /// `jobs × machines`, `setup_time` is not `machines × jobs × jobs`, or
    /// the durations are large enough for a makespan to overflow `u64`.
    pub fn new(
        jobs: usize,
        machines: usize,
        processing_time: Vec<Vec<u64>>,
        setup_time: Vec<Vec<Vec<u64>>>,
    ) -> Result<Self> {
        if processing_time.len() != jobs {
            return Err(FlowShopError::instance(format!(
                "expected {jobs} processing-time rows, got {}",
                processing_time.len()
            )));
        }
        if setup_time.len() != machines {
            return Err(FlowShopError::instance(format!(
                "expected {machines} setup-time matrices, got {}",
                setup_time.len()
            )));
        }

        let mut processing = Vec::with_capacity(jobs * machines);
        for (job, row) in processing_time.iter().enumerate() {
            if row.len() != machines {
                return Err(FlowShopError::instance(format!(
                    "job {job}: expected {machines} processing times, got {}",
                    row.len()
                )));
            }
            processing.extend_from_slice(row);
        }

        let mut setup = Vec::with_capacity(machines * jobs * jobs);
        for (machine, matrix) in setup_time.iter().enumerate() {
            if matrix.len() != jobs {
                return Err(FlowShopError::instance(format!(
                    "machine {machine}: expected {jobs} setup rows, got {}",
                    matrix.len()
                )));
            }
            for (prev, row) in matrix.iter().enumerate() {
                if row.len() != jobs {
                    return Err(FlowShopError::instance(format!(
                        "machine {machine}, previous job {prev}: expected {jobs} setup times, got {}",
                        row.len()
                    )));
                }
                setup.extend_from_slice(row);
            }
        }

        if makespan_bound(jobs, &processing, &setup).is_none() {
            return Err(FlowShopError::instance(
                "total processing and setup time does not fit in u64",
            ));
        }

        Ok(Self {
            jobs,
            machines,
            processing,
            setup,
        })
    }

    /// Builds an instance with all setup times zero (a classic PFSP).
    ///
    /// The machine count is taken from the first row; an empty table gives
    /// an empty instance.
    pub fn without_setup(processing_time: Vec<Vec<u64>>) -> Result<Self> {
        let jobs = processing_time.len();
        let machines = processing_time.first().map_or(0, Vec::len);
        let setup = vec![vec![vec![0; jobs]; jobs]; machines];
        Self::new(jobs, machines, processing_time, setup)
    }

    /// Number of jobs `N`.
    pub fn job_count(&self) -> usize {
        self.jobs
    }

    /// Number of machines `M`.
    pub fn machine_count(&self) -> usize {
        self.machines
    }

    /// Processing time of `job` on `machine`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn processing_time(&self, job: usize, machine: usize) -> u64 {
        assert!(
            job < self.jobs && machine < self.machines,
            "processing_time({job}, {machine}) out of range for {} jobs x {} machines",
            self.jobs,
            self.machines
        );
        self.processing[job * self.machines + machine]
    }

    /// Setup incurred on `machine` when `job` directly follows `prev`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn setup_time(&self, machine: usize, prev: usize, job: usize) -> u64 {
        assert!(
            machine < self.machines && prev < self.jobs && job < self.jobs,
            "setup_time({machine}, {prev}, {job}) out of range for {} machines x {} jobs",
            self.machines,
            self.jobs
        );
        self.setup[(machine * self.jobs + prev) * self.jobs + job]
    }

    /// Processing times of `job` across all machines.
    pub(crate) fn processing_row(&self, job: usize) -> &[u64] {
        let start = job * self.machines;
        &self.processing[start..start + self.machines]
    }

    /// Setup times on `machine` after `prev`, indexed by the following job.
    pub(crate) fn setup_row(&self, machine: usize, prev: usize) -> &[u64] {
        let start = (machine * self.jobs + prev) * self.jobs;
        &self.setup[start..start + self.jobs]
    }

    /// Sum of a job's processing times over all machines.
    pub fn total_processing_time(&self, job: usize) -> u64 {
        self.processing_row(job).iter().sum()
    }

    /// Makespan of `sequence` after validating it.
    ///
    /// The sequence may be partial (a subset of the jobs), but indices must
    /// be in range and distinct.
    ///
    /// # Errors
    ///
    /// [`FlowShopError::InvalidSchedule`] on an out-of-range or repeated index.
    pub fn evaluate(&self, sequence: &[usize]) -> Result<u64> {
        check_sequence(self.jobs, sequence)?;
        Ok(MakespanEvaluator::new(self).makespan(sequence))
    }

    /// Returns a copy of the tables in nested form.
    pub fn to_tables(&self) -> InstanceTables {
        let processing_time = if self.machines == 0 {
            vec![Vec::new(); self.jobs]
        } else {
            self.processing
                .chunks(self.machines)
                .map(<[u64]>::to_vec)
                .collect()
        };
        let setup_time = (0..self.machines)
            .map(|machine| {
                (0..self.jobs)
                    .map(|prev| self.setup_row(machine, prev).to_vec())
                    .collect()
            })
            .collect();

        InstanceTables {
            jobs: self.jobs,
            machines: self.machines,
            processing_time,
            setup_time,
        }
    }
}

/// Upper bound on the makespan of any sequence: every processing time plus,
/// per machine, `jobs` times its largest setup. `None` on overflow.
fn makespan_bound(jobs: usize, processing: &[u64], setup: &[u64]) -> Option<u64> {
    let mut bound = processing
        .iter()
        .try_fold(0u64, |acc, &time| acc.checked_add(time))?;
    if jobs > 0 {
        for matrix in setup.chunks(jobs * jobs) {
            let largest = matrix.iter().copied().max().unwrap_or(0);
            bound = bound.checked_add(largest.checked_mul(jobs as u64)?)?;
        }
    }
    Some(bound)
}

impl TryFrom<InstanceTables> for ProblemInstance {
    type Error = FlowShopError;

    fn try_from(tables: InstanceTables) -> Result<Self> {
        Self::new(
            tables.jobs,
            tables.machines,
            tables.processing_time,
            tables.setup_time,
        )
    }
}

impl From<ProblemInstance> for InstanceTables {
    fn from(instance: ProblemInstance) -> Self {
        instance.to_tables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ProblemInstance {
        ProblemInstance::new(
            2,
            2,
            vec![vec![4, 3], vec![2, 5]],
            vec![
                vec![vec![0, 1], vec![2, 0]],
                vec![vec![0, 3], vec![4, 0]],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let inst = small();
        assert_eq!(inst.job_count(), 2);
        assert_eq!(inst.machine_count(), 2);
        assert_eq!(inst.processing_time(1, 1), 5);
        assert_eq!(inst.setup_time(0, 1, 0), 2);
        assert_eq!(inst.setup_time(1, 0, 1), 3);
        assert_eq!(inst.total_processing_time(0), 7);
    }

    #[test]
    fn test_rejects_short_processing_row() {
        let err = ProblemInstance::new(2, 2, vec![vec![1, 2], vec![3]], vec![
            vec![vec![0; 2]; 2],
            vec![vec![0; 2]; 2],
        ])
        .unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidInstance(_)));
    }

    #[test]
    fn test_rejects_job_count_mismatch() {
        let err = ProblemInstance::new(3, 1, vec![vec![1], vec![2]], vec![vec![vec![0; 3]; 3]])
            .unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidInstance(_)));
    }

    #[test]
    fn test_rejects_setup_shape() {
        let err = ProblemInstance::new(2, 1, vec![vec![1], vec![2]], vec![vec![vec![0, 0]]])
            .unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidInstance(_)));

        let err = ProblemInstance::new(1, 2, vec![vec![1, 2]], vec![vec![vec![0]]]).unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidInstance(_)));
    }

    #[test]
    fn test_empty_instances() {
        let none = ProblemInstance::new(0, 0, vec![], vec![]).unwrap();
        assert_eq!(none.evaluate(&[]).unwrap(), 0);

        let no_machines = ProblemInstance::new(3, 0, vec![vec![]; 3], vec![]).unwrap();
        assert_eq!(no_machines.evaluate(&[2, 0, 1]).unwrap(), 0);
    }

    #[test]
    fn test_evaluate_rejects_bad_sequence() {
        let inst = small();
        assert!(matches!(
            inst.evaluate(&[0, 0]),
            Err(FlowShopError::InvalidSchedule(_))
        ));
        assert!(matches!(
            inst.evaluate(&[2]),
            Err(FlowShopError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_tables_round_trip() {
        let inst = small();
        let back = ProblemInstance::try_from(inst.to_tables()).unwrap();
        assert_eq!(back, inst);
    }

    #[test]
    fn test_rejects_durations_that_overflow() {
        let err = ProblemInstance::without_setup(vec![vec![u64::MAX / 2 + 1]; 2]).unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidInstance(_)));

        // 2 + 2 * (u64::MAX / 2) overflows through the setup term
        let setup = vec![vec![vec![0, u64::MAX / 2], vec![0, 0]]];
        assert!(ProblemInstance::new(2, 1, vec![vec![1], vec![1]], setup).is_err());
    }

    #[test]
    fn test_largest_fitting_durations_evaluate() {
        let inst = ProblemInstance::without_setup(vec![vec![u64::MAX / 2]; 2]).unwrap();
        assert_eq!(inst.evaluate(&[0, 1]).unwrap(), u64::MAX - 1);
        assert_eq!(inst.total_processing_time(1), u64::MAX / 2);
    }

    #[test]
    #[should_panic(expected = "setup_time(1, 0, 5) out of range")]
    fn test_setup_time_panics_with_indices() {
        small().setup_time(1, 0, 5);
    }
}
