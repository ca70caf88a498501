use rayon::prelude::*;

/// Run `task` over `items` on a rayon pool of up to `workers` threads.
///
/// Results come back in item order. Every item is processed even if others
/// fail; the caller inspects each result.
pub(crate) fn run_pool<T, R, F>(items: &[T], workers: usize, task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 {
        return items.iter().map(&task).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| items.par_iter().map(&task).collect()),
        Err(err) => {
            tracing::warn!(workers, error = %err, "thread pool unavailable, running sequentially");
            items.iter().map(&task).collect()
        }
    }
}
