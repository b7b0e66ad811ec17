//! 片段組裝流程
//!
//! 依計畫向外部工具要求擷取每個片段，最後依索引順序合併。
//! 任一片段失敗即中止整個流程，不會留下不完整的預覽。

use super::planner::{ClipEntry, ClipPlan, SourceMedia};
use crate::error::{SamplerError, SamplerResult};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 外部媒體工具提供的能力
///
/// 核心只決定要擷取什麼、以什麼順序合併，實際的程序呼叫由實作者負責。
pub trait MediaToolkit {
    type Clip: Send;
    type Artifact;
    type Error: std::error::Error + Send + Sync + 'static;

    /// 影片長度（整數秒）
    fn probe_duration(&self, source: &Path) -> Result<u64, Self::Error>;

    /// 擷取單一片段；接近結尾時可回傳比要求短的片段
    fn extract_clip(&self, source: &Path, clip: &ClipEntry) -> Result<Self::Clip, Self::Error>;

    /// 依傳入順序合併片段
    fn concatenate(&self, clips: &[Self::Clip]) -> Result<Self::Artifact, Self::Error>;
}

/// 探測來源影片長度
pub fn probe_source<T: MediaToolkit>(toolkit: &T, path: &Path) -> SamplerResult<SourceMedia> {
    let seconds = toolkit
        .probe_duration(path)
        .map_err(|e| SamplerError::ProbeFailed {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    debug!("影片長度 {}: {seconds}s", path.display());
    SourceMedia::new(path, seconds as f64)
}

/// 片段擷取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// 依索引逐一擷取
    #[default]
    Sequential,
    /// 平行擷取，合併時仍依索引排序
    Parallel,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

type ClipObserver<'a> = Box<dyn Fn(&ClipEntry) + Send + Sync + 'a>;

enum ClipOutcome<C, E> {
    Extracted(C),
    Failed(E),
    Skipped,
}

pub struct AssemblyPipeline<'a, T> {
    toolkit: &'a T,
    mode: ExtractionMode,
    shutdown_signal: Arc<AtomicBool>,
    on_clip_extracted: Option<ClipObserver<'a>>,
}

impl<'a, T> AssemblyPipeline<'a, T>
where
    T: MediaToolkit + Sync,
{
    pub fn new(toolkit: &'a T, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            toolkit,
            mode: ExtractionMode::default(),
            shutdown_signal,
            on_clip_extracted: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// 每完成一個片段呼叫一次（平行模式下順序不固定）
    #[must_use]
    pub fn on_clip_extracted(mut self, observer: impl Fn(&ClipEntry) + Send + Sync + 'a) -> Self {
        self.on_clip_extracted = Some(Box::new(observer));
        self
    }

    /// 擷取並合併所有片段
    pub fn assemble(&self, source: &SourceMedia, plan: &ClipPlan) -> SamplerResult<T::Artifact> {
        if plan.is_empty() {
            info!("取樣計畫為空，略過擷取: {}", source.path().display());
            return Err(SamplerError::EmptyPlan);
        }

        info!(
            "開始擷取 {} 個片段（{}）: {}",
            plan.len(),
            self.mode,
            source.path().display()
        );

        let clips = match self.mode {
            ExtractionMode::Sequential => self.extract_sequential(source, plan)?,
            ExtractionMode::Parallel => self.extract_parallel(source, plan)?,
        };

        self.ensure_not_cancelled()?;

        debug!("合併 {} 個片段", clips.len());
        let artifact = self
            .toolkit
            .concatenate(&clips)
            .map_err(|e| SamplerError::ConcatenationFailed {
                source: Box::new(e),
            })?;

        info!("片段合併完成: {}", source.path().display());
        Ok(artifact)
    }

    fn extract_sequential(
        &self,
        source: &SourceMedia,
        plan: &ClipPlan,
    ) -> SamplerResult<Vec<T::Clip>> {
        let mut clips = Vec::with_capacity(plan.len());

        for entry in plan {
            self.ensure_not_cancelled()?;

            let clip = self.extract_one(source, entry).map_err(|e| {
                SamplerError::ClipExtractionFailed {
                    index: entry.index,
                    source: Box::new(e),
                }
            })?;

            self.notify(entry);
            clips.push(clip);
        }

        Ok(clips)
    }

    /// 平行擷取
    ///
    /// 一旦某個索引失敗，較大的索引不再啟動；較小的索引仍會執行，
    /// 因此回報的永遠是最小的失敗索引。
    fn extract_parallel(
        &self,
        source: &SourceMedia,
        plan: &ClipPlan,
    ) -> SamplerResult<Vec<T::Clip>> {
        let lowest_failure = AtomicUsize::new(usize::MAX);

        let outcomes: Vec<ClipOutcome<T::Clip, T::Error>> = plan
            .clips()
            .par_iter()
            .map(|entry| {
                if self.shutdown_signal.load(Ordering::SeqCst)
                    || entry.index > lowest_failure.load(Ordering::SeqCst)
                {
                    return ClipOutcome::Skipped;
                }

                match self.extract_one(source, entry) {
                    Ok(clip) => {
                        self.notify(entry);
                        ClipOutcome::Extracted(clip)
                    }
                    Err(e) => {
                        lowest_failure.fetch_min(entry.index, Ordering::SeqCst);
                        ClipOutcome::Failed(e)
                    }
                }
            })
            .collect();

        let mut clips = Vec::with_capacity(outcomes.len());
        for (entry, outcome) in plan.iter().zip(outcomes) {
            match outcome {
                ClipOutcome::Extracted(clip) => clips.push(clip),
                ClipOutcome::Failed(e) => {
                    return Err(SamplerError::ClipExtractionFailed {
                        index: entry.index,
                        source: Box::new(e),
                    });
                }
                ClipOutcome::Skipped => return Err(SamplerError::Cancelled),
            }
        }

        Ok(clips)
    }

    fn extract_one(&self, source: &SourceMedia, entry: &ClipEntry) -> Result<T::Clip, T::Error> {
        debug!(
            "擷取片段 {}: start={:.3}s, length={}s",
            entry.index, entry.start_offset_seconds, entry.length_seconds
        );

        let result = self.toolkit.extract_clip(source.path(), entry);
        if let Err(e) = &result {
            warn!("片段 {} 擷取失敗: {e}", entry.index);
        }
        result
    }

    fn notify(&self, entry: &ClipEntry) {
        if let Some(observer) = &self.on_clip_extracted {
            observer(entry);
        }
    }

    fn ensure_not_cancelled(&self) -> SamplerResult<()> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷訊號，停止組裝");
            return Err(SamplerError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::preview_sampler::planner::plan_clips;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("模擬失敗: clip {0}")]
    struct FakeError(usize);

    /// 記錄所有呼叫的假工具
    #[derive(Default)]
    struct FakeToolkit {
        failing: HashSet<usize>,
        extracted: Mutex<Vec<usize>>,
        concatenated: Mutex<Vec<Vec<usize>>>,
    }

    impl FakeToolkit {
        fn failing_at(indices: &[usize]) -> Self {
            Self {
                failing: indices.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl MediaToolkit for FakeToolkit {
        type Clip = usize;
        type Artifact = Vec<usize>;
        type Error = FakeError;

        fn probe_duration(&self, _source: &Path) -> Result<u64, FakeError> {
            Ok(600)
        }

        fn extract_clip(&self, _source: &Path, clip: &ClipEntry) -> Result<usize, FakeError> {
            self.extracted.lock().unwrap().push(clip.index);
            if self.failing.contains(&clip.index) {
                return Err(FakeError(clip.index));
            }
            Ok(clip.index)
        }

        fn concatenate(&self, clips: &[usize]) -> Result<Vec<usize>, FakeError> {
            self.concatenated.lock().unwrap().push(clips.to_vec());
            Ok(clips.to_vec())
        }
    }

    fn signal() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    fn source(duration: f64) -> SourceMedia {
        SourceMedia::new("/videos/source.mp4", duration).unwrap()
    }

    #[test]
    fn test_sequential_assembly_keeps_order() {
        let toolkit = FakeToolkit::default();
        let plan = plan_clips(600.0, 10, 0.10).unwrap();

        let artifact = AssemblyPipeline::new(&toolkit, signal())
            .assemble(&source(600.0), &plan)
            .unwrap();

        assert_eq!(artifact, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(*toolkit.extracted.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parallel_assembly_keeps_order() {
        let toolkit = FakeToolkit::default();
        let plan = plan_clips(3600.0, 5, 0.20).unwrap();

        let artifact = AssemblyPipeline::new(&toolkit, signal())
            .with_mode(ExtractionMode::Parallel)
            .assemble(&source(3600.0), &plan)
            .unwrap();

        let expected: Vec<usize> = (0..plan.len()).collect();
        assert_eq!(artifact, expected);
    }

    #[test]
    fn test_failure_stops_before_concatenation() {
        let toolkit = FakeToolkit::failing_at(&[2]);
        let plan = plan_clips(500.0, 10, 0.10).unwrap();
        assert_eq!(plan.len(), 5);

        let err = AssemblyPipeline::new(&toolkit, signal())
            .assemble(&source(500.0), &plan)
            .unwrap_err();

        assert!(matches!(err, SamplerError::ClipExtractionFailed { index: 2, .. }));
        assert_eq!(*toolkit.extracted.lock().unwrap(), vec![0, 1, 2]);
        assert!(toolkit.concatenated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parallel_reports_lowest_failing_index() {
        let plan = plan_clips(3600.0, 1, 0.01).unwrap();
        assert_eq!(plan.len(), 36);

        for _ in 0..20 {
            let toolkit = FakeToolkit::failing_at(&[7, 20, 31]);
            let err = AssemblyPipeline::new(&toolkit, signal())
                .with_mode(ExtractionMode::Parallel)
                .assemble(&source(3600.0), &plan)
                .unwrap_err();

            assert!(matches!(err, SamplerError::ClipExtractionFailed { index: 7, .. }));
            assert!(toolkit.concatenated.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn test_empty_plan_makes_no_calls() {
        let toolkit = FakeToolkit::default();
        let plan = plan_clips(0.0, 10, 0.10).unwrap();

        let err = AssemblyPipeline::new(&toolkit, signal())
            .assemble(&source(0.0), &plan)
            .unwrap_err();

        assert!(err.is_benign());
        assert!(toolkit.extracted.lock().unwrap().is_empty());
        assert!(toolkit.concatenated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let toolkit = FakeToolkit::default();
        let plan = plan_clips(600.0, 10, 0.10).unwrap();
        let shutdown = Arc::new(AtomicBool::new(true));

        for mode in [ExtractionMode::Sequential, ExtractionMode::Parallel] {
            let err = AssemblyPipeline::new(&toolkit, Arc::clone(&shutdown))
                .with_mode(mode)
                .assemble(&source(600.0), &plan)
                .unwrap_err();
            assert!(matches!(err, SamplerError::Cancelled));
        }
        assert!(toolkit.extracted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_observer_called_per_clip() {
        let toolkit = FakeToolkit::default();
        let plan = plan_clips(600.0, 10, 0.10).unwrap();
        let seen = AtomicUsize::new(0);

        AssemblyPipeline::new(&toolkit, signal())
            .with_mode(ExtractionMode::Parallel)
            .on_clip_extracted(|_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .assemble(&source(600.0), &plan)
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), plan.len());
    }

    #[test]
    fn test_probe_source() {
        let toolkit = FakeToolkit::default();
        let media = probe_source(&toolkit, Path::new("/videos/a.mp4")).unwrap();

        assert!((media.total_duration_seconds() - 600.0).abs() < f64::EPSILON);
        assert_eq!(media.path(), Path::new("/videos/a.mp4"));
    }
}
