use std::{
    any::Any,
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{
        mpsc::{self, Receiver, Sender, SyncSender},
        Arc,
    },
    thread,
};

/// Fixed-size worker pool. Jobs are queued on a bounded channel and handed to idle
/// workers by a mux thread; `terminate_and_join` returns once every queued job ran.
pub struct ThreadPool<Payload: 'static + Send> {
    queue_tx: SyncSender<Signal<Payload>>,
    term_rx: Receiver<()>,
}

impl<Payload: 'static + Send> ThreadPool<Payload> {
    pub fn spawn<JobRunner>(
        size: usize,
        queue_size: usize,
        job_runner: JobRunner,
    ) -> ThreadPool<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (queue_tx, queue_rx) = mpsc::sync_channel(queue_size);
        let (term_tx, term_rx) = mpsc::channel();

        WorkerMux::spawn(size.max(1), job_runner, queue_rx, term_tx);

        ThreadPool { queue_tx, term_rx }
    }

    pub fn enqueue(&self, payload: Payload) {
        if self.queue_tx.send(Signal::Job(payload)).is_err() {
            error!("Failed to enqueue job, worker mux has terminated");
        }
    }

    pub fn terminate_and_join(&self) {
        if self.queue_tx.send(Signal::Term).is_err() {
            error!("Failed to send termination signal, worker mux has terminated");
            return;
        }

        if self.term_rx.recv().is_err() {
            error!("Worker mux terminated without reporting");
        }
    }
}

struct WorkerMux {}

impl WorkerMux {
    fn spawn<JobRunner, Payload: 'static + Send>(
        size: usize,
        job_runner: JobRunner,
        queue_rx: Receiver<Signal<Payload>>,
        term_tx: Sender<()>,
    ) where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let job_runner_arc: Arc<JobRunner> = Arc::new(job_runner);

        let (mux_tx, mux_rx) = mpsc::channel();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::spawn(id, mux_tx.clone(), job_runner_arc.clone()));
        }

        thread::spawn(move || {
            let mut idle_workers: VecDeque<WorkerId> = VecDeque::new();

            loop {
                while idle_workers.is_empty() {
                    let report = WorkerMux::join_worker_report(&mux_rx);
                    if let WorkerStatus::Idle = report.status {
                        idle_workers.push_back(report.id);
                    }
                }

                match WorkerMux::join_job_queue(&queue_rx) {
                    Signal::Term => break,
                    Signal::Job(payload) => {
                        if let Some(worker_id) = idle_workers.pop_front() {
                            workers[worker_id].run_job(payload);
                        }
                    }
                }
            }

            for worker in &workers {
                worker.terminate();
            }

            let mut terminated_workers = 0;
            while terminated_workers < size {
                if let WorkerStatus::Term = WorkerMux::join_worker_report(&mux_rx).status {
                    terminated_workers += 1;
                }
            }

            trace!("Worker mux terminated {} workers", size);
            let _ = term_tx.send(());
        });
    }

    fn join_worker_report(mux_rx: &Receiver<WorkerReport>) -> WorkerReport {
        match mux_rx.recv() {
            Err(err) => panic!("Worker rx error on threadpool worker mux: {}", err),
            Ok(report) => report,
        }
    }

    fn join_job_queue<Payload: 'static + Send>(
        queue_rx: &Receiver<Signal<Payload>>,
    ) -> Signal<Payload> {
        match queue_rx.recv() {
            Err(err) => panic!("Job queue rx error on threadpool worker mux: {}", err),
            Ok(sig) => sig,
        }
    }
}

struct Worker<Payload: 'static + Send> {
    tx: Sender<Signal<Payload>>,
}

impl<Payload: 'static + Send> Worker<Payload> {
    fn spawn<JobRunner>(
        id: WorkerId,
        mux_tx: Sender<WorkerReport>,
        job_runner: Arc<JobRunner>,
    ) -> Worker<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let _ = mux_tx.send(WorkerReport {
                    id,
                    status: WorkerStatus::Idle,
                });

                match Worker::join_job(&rx, id) {
                    Signal::Term => break,
                    Signal::Job(payload) => {
                        let res = panic::catch_unwind(AssertUnwindSafe(|| job_runner(payload)));
                        if let Err(cause) = res {
                            error!(
                                "Job panicked on worker thread {}: {}",
                                id,
                                panic_message(&*cause)
                            );
                        }
                    }
                }
            }

            let _ = mux_tx.send(WorkerReport {
                id,
                status: WorkerStatus::Term,
            });
        });

        Worker { tx }
    }

    fn run_job(&self, payload: Payload) {
        let _ = self.tx.send(Signal::Job(payload));
    }

    fn terminate(&self) {
        let _ = self.tx.send(Signal::Term);
    }

    fn join_job(rx: &Receiver<Signal<Payload>>, id: WorkerId) -> Signal<Payload> {
        match rx.recv() {
            Err(err) => panic!("Mux rx error on worker thread {}: {}", id, err),
            Ok(sig) => sig,
        }
    }
}

/// Text of a panic payload, when it carries any.
pub fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

enum Signal<Payload: 'static + Send> {
    Term,
    Job(Payload),
}

struct WorkerReport {
    id: WorkerId,
    status: WorkerStatus,
}

type WorkerId = usize;

enum WorkerStatus {
    Term,
    Idle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn runs_every_job_before_join() {
        //setup
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let pool = ThreadPool::spawn(3, 2, move |job: usize| {
            seen_clone.lock().unwrap().push(job);
        });

        //exercise
        for job in 0..20 {
            pool.enqueue(job);
        }
        pool.terminate_and_join();

        //verify
        let mut res = seen.lock().unwrap().clone();
        res.sort();
        assert_eq!(res, (0..20).collect::<Vec<usize>>());
    }

    #[test]
    fn zero_size_pool_still_runs() {
        //setup
        let count: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        let pool = ThreadPool::spawn(0, 1, move |_: ()| {
            *count_clone.lock().unwrap() += 1;
        });

        //exercise
        pool.enqueue(());
        pool.enqueue(());
        pool.terminate_and_join();

        //verify
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn panicking_job_keeps_pool_alive() {
        //setup
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let pool = ThreadPool::spawn(2, 2, move |job: usize| {
            if job % 3 == 0 {
                panic!("job {} failed", job);
            }
            seen_clone.lock().unwrap().push(job);
        });

        //exercise
        for job in 0..10 {
            pool.enqueue(job);
        }
        pool.terminate_and_join();

        //verify
        let mut res = seen.lock().unwrap().clone();
        res.sort();
        assert_eq!(res, vec![1, 2, 4, 5, 7, 8]);
    }

    #[test]
    fn panic_messages() {
        //setup
        let literal = panic::catch_unwind(|| panic!("plain")).err().unwrap();
        let formatted = panic::catch_unwind(|| panic!("value {}", 7)).err().unwrap();
        let other = panic::catch_unwind(|| panic::panic_any(7usize)).err().unwrap();

        //exercise
        let res = vec![
            panic_message(&*literal),
            panic_message(&*formatted),
            panic_message(&*other),
        ];

        //verify
        assert_eq!(res, vec!["plain", "value 7", "unknown panic"]);
    }
}
