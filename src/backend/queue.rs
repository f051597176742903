//! Cola de trabajos con disciplina FIFO/LIFO y tope de ejecución.
//!
//! Modela la cola del servicio de trabajos: los envíos entran en
//! `pending`, `pop` saca hasta `max_running` trabajos en vuelo y `finish`
//! libera hueco. `max_running == 0` significa sin límite.
use std::collections::VecDeque;
use std::sync::Mutex;

use super::trait_backend::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Fifo,
    Lifo,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<JobId>,
    n_running: usize,
}

#[derive(Debug)]
pub struct JobQueue {
    kind: QueueKind,
    max_running: usize,
    state: Mutex<QueueState>,
}

impl JobQueue {
    pub fn new(kind: QueueKind, max_running: usize) -> Self {
        Self { kind, max_running, state: Mutex::new(QueueState::default()) }
    }

    fn capacity(&self) -> usize {
        if self.max_running == 0 {
            usize::MAX
        } else {
            self.max_running
        }
    }

    /// Encola un trabajo según la disciplina: FIFO al final, LIFO al
    /// principio (se extrae siempre por delante).
    pub fn add(&self, id: JobId) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        match self.kind {
            QueueKind::Fifo => state.pending.push_back(id),
            QueueKind::Lifo => state.pending.push_front(id),
        }
    }

    /// Extrae hasta `limit` trabajos respetando el tope de ejecución.
    pub fn pop(&self, limit: usize) -> Vec<JobId> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        let mut popped = Vec::new();
        while popped.len() < limit
            && state.n_running < self.capacity()
            && !state.pending.is_empty()
        {
            if let Some(id) = state.pending.pop_front() {
                state.n_running += 1;
                popped.push(id);
            }
        }
        popped
    }

    /// Marca un trabajo en vuelo como terminado y libera su hueco.
    pub fn finish(&self) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.n_running = state.n_running.saturating_sub(1);
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").pending.len()
    }

    pub fn running(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").n_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<JobId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_fifo_order() {
        let queue = JobQueue::new(QueueKind::Fifo, 0);
        let jobs = ids(3);
        for id in &jobs {
            queue.add(*id);
        }
        assert_eq!(queue.pop(3), jobs);
    }

    #[test]
    fn test_lifo_order() {
        let queue = JobQueue::new(QueueKind::Lifo, 0);
        let jobs = ids(3);
        for id in &jobs {
            queue.add(*id);
        }
        let mut reversed = jobs.clone();
        reversed.reverse();
        assert_eq!(queue.pop(3), reversed);
    }

    #[test]
    fn test_max_running_cap() {
        let queue = JobQueue::new(QueueKind::Fifo, 2);
        for id in ids(5) {
            queue.add(id);
        }
        assert_eq!(queue.pop(10).len(), 2);
        assert_eq!(queue.running(), 2);
        assert_eq!(queue.pending_len(), 3);
        // Sin hueco no sale nada más.
        assert!(queue.pop(10).is_empty());
        queue.finish();
        assert_eq!(queue.pop(10).len(), 1);
    }

    #[test]
    fn test_zero_cap_is_unlimited() {
        let queue = JobQueue::new(QueueKind::Fifo, 0);
        for id in ids(100) {
            queue.add(id);
        }
        assert_eq!(queue.pop(100).len(), 100);
    }

    #[test]
    fn test_finish_never_underflows() {
        let queue = JobQueue::new(QueueKind::Fifo, 1);
        queue.finish();
        assert_eq!(queue.running(), 0);
    }
}
