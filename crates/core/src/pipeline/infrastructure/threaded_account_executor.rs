use std::thread::JoinHandle;

use crate::pipeline::account_executor::{
    failed, run_account, AccountBatch, AccountExecutor, AccountReport, UseCaseFactory,
};

/// Runs accounts on a fixed pool of worker threads.
///
/// Layout: `main -> jobs -> [worker x N] -> reports -> main`
///
/// Each worker builds its own use case per account, so accounts share no
/// mutable state. Reports are reordered to submission order before return.
pub struct ThreadedAccountExecutor {
    factory: UseCaseFactory,
    workers: usize,
}

impl ThreadedAccountExecutor {
    pub fn new(factory: UseCaseFactory, workers: usize) -> Self {
        Self {
            factory,
            workers: workers.max(1),
        }
    }
}

impl AccountExecutor for ThreadedAccountExecutor {
    fn run(&self, batches: Vec<AccountBatch>) -> Vec<AccountReport> {
        if batches.is_empty() {
            return Vec::new();
        }
        let workers = self.workers.min(batches.len());

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, AccountBatch)>();
        let (report_tx, report_rx) = crossbeam_channel::unbounded::<(usize, AccountReport)>();

        for job in batches.iter().cloned().enumerate() {
            // receivers outlive this loop
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let report_tx = report_tx.clone();
                let factory = self.factory.clone();
                std::thread::spawn(move || {
                    for (index, batch) in job_rx {
                        let report = run_account(&factory, &batch);
                        if report_tx.send((index, report)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(report_tx);

        let mut slots: Vec<Option<AccountReport>> = vec![None; batches.len()];
        for (index, report) in report_rx {
            slots[index] = Some(report);
        }

        for handle in handles {
            if handle.join().is_err() {
                log::error!("Account worker thread panicked");
            }
        }

        slots
            .into_iter()
            .zip(&batches)
            .map(|(slot, batch)| {
                slot.unwrap_or_else(|| failed(batch, "worker thread panicked".into()))
            })
            .collect()
    }
}
