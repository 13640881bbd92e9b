//! Detached background work
//!
//! Cache writes that must not hold up the response. Tasks run on the `smol`
//! executor; [`BackgroundTasks::settle`] waits for whatever is still pending
//! and anything left when the owner is dropped keeps running detached.

use std::future::Future;

use smol::lock::Mutex;
use smol::Task;

#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Mutex<Vec<Task<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `work` without waiting for it. It must log its own failures.
    pub async fn spawn<Fut>(&self, work: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = smol::spawn(work);
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }

    /// Wait for every task spawned so far
    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *self.tasks.lock().await);
        for task in pending {
            task.await;
        }
    }

    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.detach();
        }
    }
}
