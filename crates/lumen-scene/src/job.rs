//! Background rendering of a finalized scene.
//!
//! The scene is moved into a dedicated worker thread; the caller keeps a
//! [`RenderJob`] handle to poll progress, cancel, or wait for the image.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::JoinHandle;

use lumen_host::ImageData;
use lumen_mesh::MeshBuffer;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::error::RenderError;
use crate::light::Light;
use crate::scene::{MeshId, ObjectId, ObjectInstance, SceneSettings};

/// Cooperative cancellation flag shared between a job and its renderer.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a renderer sees of its job: cancellation and progress reporting.
#[derive(Clone, Debug, Default)]
pub struct JobControl {
    token: CancellationToken,
    /// `f32` progress stored as its bit pattern.
    progress: Arc<AtomicU32>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Progress is clamped to `0..=1`.
    pub fn set_progress(&self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.progress.store(progress.to_bits(), Ordering::Relaxed);
    }

    pub fn progress(&self) -> f32 {
        f32::from_bits(self.progress.load(Ordering::Relaxed))
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Err(Cancelled)` once cancellation was requested. Renderers call
    /// this between work units.
    pub fn check(&self) -> Result<(), RenderError> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Immutable scene owned by the render worker.
#[derive(Clone, Debug)]
pub struct FinalizedScene {
    pub settings: SceneSettings,
    pub camera: Camera,
    pub meshes: Vec<Arc<MeshBuffer>>,
    pub objects: Vec<ObjectInstance>,
    pub lights: Vec<Light>,
    pub bake_target: Option<ObjectId>,
}

impl FinalizedScene {
    pub fn mesh(&self, id: MeshId) -> Option<&Arc<MeshBuffer>> {
        self.meshes.get(id.0)
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.objects.get(id.0)
    }

    /// Bake modes need a target object to render onto.
    fn validate(&self) -> Result<(), RenderError> {
        let mode = self.settings.render_mode;
        if mode.is_bake_mode() && self.bake_target.is_none() {
            return Err(RenderError::MissingBakeTarget {
                mode: format!("{mode:?}"),
            });
        }
        Ok(())
    }
}

/// Output of a finished job.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    pub image: ImageData,
}

/// A path-tracing backend.
pub trait Renderer: Send + 'static {
    fn render(&self, scene: &FinalizedScene, control: &JobControl)
    -> Result<RenderOutput, RenderError>;
}

/// Handle to a scene rendering on a worker thread.
///
/// Dropping the handle cancels the job and joins the worker.
pub struct RenderJob {
    control: JobControl,
    result: crossbeam_channel::Receiver<Result<RenderOutput, RenderError>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderJob {
    pub(crate) fn spawn(scene: FinalizedScene, renderer: impl Renderer) -> Result<Self, RenderError> {
        let control = JobControl::new();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker_control = control.clone();
        let handle = std::thread::Builder::new()
            .name("lumen-render".into())
            .spawn(move || {
                let result = scene
                    .validate()
                    .and_then(|()| worker_control.check())
                    .and_then(|()| renderer.render(&scene, &worker_control));
                match &result {
                    Ok(_) => worker_control.set_progress(1.0),
                    Err(RenderError::Cancelled) => debug!("Render job cancelled"),
                    Err(e) => warn!("Render job failed: {e}"),
                }
                // The receiver is gone when the job handle was dropped.
                let _ = tx.send(result);
            })?;
        info!("Render job started");
        Ok(Self {
            control,
            result: rx,
            handle: Some(handle),
        })
    }

    /// Requests cancellation. The renderer stops at its next check.
    pub fn cancel(&self) {
        self.control.token().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    pub fn progress(&self) -> f32 {
        self.control.progress()
    }

    pub fn is_complete(&self) -> bool {
        !self.result.is_empty() || self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until the worker finishes.
    pub fn wait(mut self) -> Result<RenderOutput, RenderError> {
        let result = self.result.recv().unwrap_or(Err(RenderError::WorkerPanicked));
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            return Err(RenderError::WorkerPanicked);
        }
        result
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_config::RenderMode;
    use std::time::{Duration, Instant};

    fn scene(render_mode: RenderMode) -> FinalizedScene {
        FinalizedScene {
            settings: SceneSettings {
                render_mode,
                ..SceneSettings::default()
            },
            camera: Camera::default(),
            meshes: Vec::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            bake_target: None,
        }
    }

    struct Solid;

    impl Renderer for Solid {
        fn render(
            &self,
            scene: &FinalizedScene,
            control: &JobControl,
        ) -> Result<RenderOutput, RenderError> {
            control.set_progress(0.5);
            Ok(RenderOutput {
                image: ImageData::solid(scene.camera.width, scene.camera.height, [1.0; 4]),
            })
        }
    }

    /// Spins until cancelled.
    struct Endless;

    impl Renderer for Endless {
        fn render(&self, _: &FinalizedScene, control: &JobControl) -> Result<RenderOutput, RenderError> {
            let start = Instant::now();
            loop {
                control.check()?;
                if start.elapsed() > Duration::from_secs(10) {
                    return Err(RenderError::Renderer("never cancelled".into()));
                }
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    struct Panics;

    impl Renderer for Panics {
        fn render(&self, _: &FinalizedScene, _: &JobControl) -> Result<RenderOutput, RenderError> {
            panic!("renderer bug");
        }
    }

    #[test]
    fn test_job_completes_with_full_progress() {
        let job = RenderJob::spawn(scene(RenderMode::RenderImage), Solid).unwrap();
        let control = job.control.clone();
        let output = job.wait().unwrap();
        assert_eq!(output.image.width, 1280);
        assert_eq!(control.progress(), 1.0);
    }

    #[test]
    fn test_cancel_stops_renderer() {
        let job = RenderJob::spawn(scene(RenderMode::RenderImage), Endless).unwrap();
        job.cancel();
        assert!(job.is_cancelled());
        assert!(matches!(job.wait(), Err(RenderError::Cancelled)));
    }

    #[test]
    fn test_bake_without_target_fails() {
        let job = RenderJob::spawn(scene(RenderMode::BakeAmbientOcclusion), Solid).unwrap();
        assert!(matches!(
            job.wait(),
            Err(RenderError::MissingBakeTarget { .. })
        ));
    }

    #[test]
    fn test_panicking_renderer_is_reported() {
        let job = RenderJob::spawn(scene(RenderMode::RenderImage), Panics).unwrap();
        assert!(matches!(job.wait(), Err(RenderError::WorkerPanicked)));
    }

    #[test]
    fn test_progress_is_clamped() {
        let control = JobControl::new();
        control.set_progress(3.0);
        assert_eq!(control.progress(), 1.0);
        control.set_progress(-1.0);
        assert_eq!(control.progress(), 0.0);
    }

    #[test]
    fn test_is_complete_after_finish() {
        let job = RenderJob::spawn(scene(RenderMode::RenderImage), Solid).unwrap();
        let start = Instant::now();
        while !job.is_complete() && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(job.is_complete());
    }
}
