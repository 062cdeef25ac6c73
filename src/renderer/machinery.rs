use std::{
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use crate::util::color_to_bytes;

use super::RenderProgress;
use super::worker::{RenderState, Worker};

/// Renders all columns of the image into `buffer` on a pool of scoped worker threads.
///
/// Worker `i` renders columns `i`, `i + worker_count`, ... and copies each finished column
/// into the shared buffer. A worker that runs out of buffer stops.
pub fn render_columns(
    state: &RenderState<'_>,
    buffer: &mut [u8],
    progress_callback: &(dyn Fn(RenderProgress) + Sync),
) -> anyhow::Result<()> {
    let width = state.resolution.x as usize;
    let worker_count = state.settings.worker_count.get().min(width).max(1);
    let total = width;

    let buffer = Mutex::new(buffer);
    let finished = AtomicUsize::new(0);
    let cores = core_affinity::get_core_ids().unwrap_or_default();

    thread::scope(|scope| -> anyhow::Result<()> {
        let buffer = &buffer;
        let finished = &finished;
        let cores = &cores;

        let threads = (0..worker_count)
            .map(|worker_id| {
                thread::Builder::new()
                    .name(format!("worker{worker_id}"))
                    .spawn_scoped(scope, move || {
                        if !cores.is_empty() {
                            core_affinity::set_for_current(cores[worker_id % cores.len()]);
                        }

                        let mut worker = Worker::new(state);
                        for x in (worker_id..width).step_by(worker_count) {
                            let column = worker.render_column(x as u32);

                            let mut output = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                            for (y, color) in column.iter().enumerate().rev() {
                                let index = (y * width + x) * 3;
                                let Some(pixel) = output.get_mut(index..index + 3) else {
                                    log::warn!(
                                        "Pixel ({x}, {y}) is outside of the output buffer, worker{worker_id} stops"
                                    );
                                    return;
                                };
                                pixel.copy_from_slice(&color_to_bytes(*color));
                            }
                            drop(output);

                            let finished = finished.fetch_add(1, Ordering::AcqRel) + 1;
                            progress_callback(RenderProgress { finished, total });
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let panicked: Vec<_> = threads
            .into_iter()
            .enumerate()
            .filter_map(|(worker_id, handle)| handle.join().is_err().then_some(worker_id))
            .collect();
        if !panicked.is_empty() {
            anyhow::bail!("Workers {panicked:?} panicked");
        }
        Ok(())
    })
}
