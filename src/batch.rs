use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::scoring::ScoringModel;
use crate::traceback::PairwiseAlignment;
use crate::{Aligner, AlignerError, Sequence};

/// Runs independent alignments on a fixed pool of worker threads.
///
/// Every worker owns its own [`Aligner`] clone, so matrices are never shared.
pub struct BatchAligner {
    work_tx: Option<Sender<WorkItem>>,
    result_rx: Receiver<WorkResult>,
    workers: Vec<thread::JoinHandle<()>>,
}

struct WorkItem {
    index: usize,
    database: Sequence,
    query: Sequence,
}

struct WorkResult {
    index: usize,
    result: Result<Option<PairwiseAlignment>, AlignerError>,
}

impl BatchAligner {
    pub fn new<S>(aligner: Aligner<S>, workers: usize) -> Result<Self, AlignerError>
    where
        S: ScoringModel + Clone + Send + 'static,
    {
        if workers == 0 {
            return Err(AlignerError::InvalidParameter(
                "Batch aligner needs at least one worker".to_string(),
            ));
        }

        let (work_tx, work_rx) = unbounded::<WorkItem>();
        let (result_tx, result_rx) = unbounded::<WorkResult>();
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let aligner = aligner.clone();
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("aligner-{}", worker_id))
                .spawn(move || Self::worker(worker_id, aligner, work_rx, result_tx))
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
            handles.push(handle);
        }
        log::debug!("Started {} alignment workers", workers);

        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            workers: handles,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    fn worker<S: ScoringModel>(
        worker_id: usize,
        aligner: Aligner<S>,
        work_rx: Receiver<WorkItem>,
        result_tx: Sender<WorkResult>,
    ) {
        while let Ok(work) = work_rx.recv() {
            log::trace!("Worker {} aligning pair {}", worker_id, work.index);
            let result = aligner.align(&work.database, &work.query);
            if result_tx
                .send(WorkResult {
                    index: work.index,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    }

    /// Align every `(database, query)` pair. Results come back in input
    /// order; if any pair fails, the error of the first failing pair (in input
    /// order) is returned.
    pub fn align_all(
        &mut self,
        pairs: Vec<(Sequence, Sequence)>,
    ) -> Result<Vec<Option<PairwiseAlignment>>, AlignerError> {
        let work_tx = self
            .work_tx
            .as_ref()
            .ok_or_else(|| AlignerError::WorkerError("work channel closed".to_string()))?;

        let total = pairs.len();
        for (index, (database, query)) in pairs.into_iter().enumerate() {
            work_tx
                .send(WorkItem {
                    index,
                    database,
                    query,
                })
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
        }

        let mut slots: Vec<Option<Result<Option<PairwiseAlignment>, AlignerError>>> =
            (0..total).map(|_| None).collect();
        for _ in 0..total {
            let work_result = self
                .result_rx
                .recv()
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
            slots[work_result.index] = Some(work_result.result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(AlignerError::WorkerError(format!(
                        "no result for pair {}",
                        index
                    )))
                })
            })
            .collect()
    }
}

impl Drop for BatchAligner {
    fn drop(&mut self) {
        // Closing the work channel stops the workers.
        self.work_tx.take();

        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoreParams;

    fn aligner() -> Aligner<ScoreParams> {
        Aligner::new(ScoreParams::new(1.0, -1.0, 5.0, 1.0).unwrap())
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(
            BatchAligner::new(aligner(), 0),
            Err(AlignerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn results_keep_input_order() {
        let pairs: Vec<(Sequence, Sequence)> = vec![
            ("ACGT".into(), "ACGT".into()),
            ("AAAA".into(), "CCCC".into()),
            ("GATTACA".into(), "GATTACA".into()),
            ("ACGTACGT".into(), "ACGAACGT".into()),
        ];
        let sequential: Vec<_> = pairs
            .iter()
            .map(|(db, q)| aligner().align(db, q).unwrap())
            .collect();

        let mut batch = BatchAligner::new(aligner(), 3).unwrap();
        assert_eq!(batch.workers(), 3);
        let results = batch.align_all(pairs).unwrap();
        assert_eq!(results, sequential);
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().map(|a| a.score), Some(7.0));
    }

    #[test]
    fn first_failure_is_reported() {
        let pairs: Vec<(Sequence, Sequence)> = vec![
            ("ACGT".into(), "ACGT".into()),
            (Sequence::new(b""), "ACGT".into()),
        ];
        let mut batch = BatchAligner::new(aligner(), 2).unwrap();
        assert!(matches!(
            batch.align_all(pairs),
            Err(AlignerError::InvalidSequence(_))
        ));
        // the pool stays usable
        let again = batch
            .align_all(vec![("ACGT".into(), "ACGT".into())])
            .unwrap();
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn empty_batch_is_empty() {
        let mut batch = BatchAligner::new(aligner(), 1).unwrap();
        assert!(batch.align_all(Vec::new()).unwrap().is_empty());
    }
}
