//! Bounded, strategically distributed byte sampling.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::config::SampleConfig;
use crate::error::Result;

/// Share of the effective sample size given to the window at file start,
/// where BOMs and format cues concentrate.
const HEAD_SHARE_PCT: u64 = 35;
/// Share given to the window at end of file.
const TAIL_SHARE_PCT: u64 = 15;
/// Floor on middle-chunk size, preventing degenerate tiny reads.
const MIN_MIDDLE_CHUNK: u64 = 4096;
/// Cap on the number of middle chunks, bounding seek count on huge budgets.
const MAX_MIDDLE_CHUNKS: u64 = 64;

/// A single contiguous window of bytes read from a file.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Offset of the first byte within the source file.
    pub offset: u64,
    /// The window's bytes.
    pub bytes: Vec<u8>,
}

impl SampleWindow {
    /// Whether this window starts at the beginning of the file.
    pub fn is_head(&self) -> bool {
        self.offset == 0
    }
}

/// An ordered sequence of non-overlapping byte windows drawn from a file.
///
/// Immutable once produced; collectively bounded by the configured byte
/// budget. Serves as a proxy for the whole file's content during detection.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Size of the sampled file in bytes.
    pub file_size: u64,
    /// Windows ordered by file offset.
    pub windows: Vec<SampleWindow>,
}

impl Sample {
    /// Total number of sampled bytes across all windows.
    pub fn total_len(&self) -> usize {
        self.windows.iter().map(|w| w.bytes.len()).sum()
    }

    /// True when no bytes were sampled (empty file).
    pub fn is_empty(&self) -> bool {
        self.windows.iter().all(|w| w.bytes.is_empty())
    }

    /// The window starting at offset 0, if present.
    pub fn head(&self) -> Option<&SampleWindow> {
        self.windows.first().filter(|w| w.is_head())
    }

    /// All sampled bytes concatenated in file order.
    pub fn concat(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_len());
        for window in &self.windows {
            bytes.extend_from_slice(&window.bytes);
        }
        bytes
    }
}

/// Extract a bounded sample from the file at `path` using positioned reads.
///
/// 35% of the budget goes to a head window, 15% to a tail window, and the
/// remaining 50% to equal-sized chunks at uniform intervals across the
/// middle region. Files no larger than the budget are read whole as a
/// single window.
pub fn sample<P: AsRef<Path>>(path: P, config: &SampleConfig) -> Result<Sample> {
    config.validate()?;

    let mut file = File::open(path.as_ref())?;
    let file_size = file.metadata()?.len();
    if file_size == 0 {
        return Ok(Sample {
            file_size,
            windows: Vec::new(),
        });
    }

    let budget = config.effective_sample_size(file_size);
    let plan = plan_windows(file_size, budget);
    let mut windows = Vec::with_capacity(plan.len());
    for (offset, len) in plan {
        windows.push(read_window(&mut file, offset, len)?);
    }

    let total: usize = windows.iter().map(|w| w.bytes.len()).sum();
    debug!(
        file_size,
        budget,
        windows = windows.len(),
        sampled = total,
        "sampled file"
    );

    Ok(Sample { file_size, windows })
}

/// Compute the `(offset, length)` list for a file of `file_size` bytes and a
/// sampling budget of `budget` bytes. Windows never overlap and never cross
/// file bounds; their lengths sum to exactly `budget` in the distributed
/// case.
fn plan_windows(file_size: u64, budget: u64) -> Vec<(u64, u64)> {
    if budget >= file_size {
        return vec![(0, file_size)];
    }

    let tail_len = (budget * TAIL_SHARE_PCT / 100).max(1);
    let middle_budget = budget * (100 - HEAD_SHARE_PCT - TAIL_SHARE_PCT) / 100;

    let chunk_count = (middle_budget / MIN_MIDDLE_CHUNK).clamp(1, MAX_MIDDLE_CHUNKS);
    let chunk_len = middle_budget / chunk_count;
    let middle_total = if chunk_len == 0 { 0 } else { chunk_count * chunk_len };

    // Head takes its 35% share plus all rounding remainders, so the window
    // lengths sum to the budget exactly.
    let head_len = budget - tail_len - middle_total;
    if head_len + tail_len >= file_size {
        // Too small to hold disjoint head and tail windows.
        return vec![(0, file_size)];
    }

    let region_start = head_len;
    let region_end = file_size - tail_len;
    let region_len = region_end - region_start;

    let mut plan = Vec::with_capacity(chunk_count as usize + 2);
    if head_len > 0 {
        plan.push((0, head_len));
    }
    if chunk_len > 0 {
        // budget < file_size implies region_len > middle_total, so the
        // stride is at least chunk_len and chunks stay disjoint.
        let stride = region_len / chunk_count;
        for i in 0..chunk_count {
            plan.push((region_start + i * stride, chunk_len));
        }
    }
    plan.push((region_end, tail_len));
    plan
}

fn read_window(file: &mut File, offset: u64, len: u64) -> Result<SampleWindow> {
    file.seek(SeekFrom::Start(offset))?;
    let mut bytes = vec![0u8; len as usize];
    file.read_exact(&mut bytes)?;
    Ok(SampleWindow { offset, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).expect("create fixture");
        file.write_all(bytes).expect("write fixture");
        path
    }

    fn small_config() -> SampleConfig {
        SampleConfig {
            min_sample_size: 64,
            percentage_sample_size: 0.10,
            max_sample_size: None,
        }
    }

    #[test]
    fn test_small_file_is_single_whole_window() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_fixture(&dir, "small.txt", b"hello world");
        let sample = sample(&path, &SampleConfig::default()).expect("sample");
        assert_eq!(sample.windows.len(), 1);
        assert_eq!(sample.windows[0].offset, 0);
        assert_eq!(sample.windows[0].bytes, b"hello world");
    }

    #[test]
    fn test_empty_file_yields_empty_sample() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_fixture(&dir, "empty.txt", b"");
        let sample = sample(&path, &SampleConfig::default()).expect("sample");
        assert!(sample.is_empty());
        assert_eq!(sample.file_size, 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            sample(&missing, &SampleConfig::default()),
            Err(crate::error::Error::Io(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_io() {
        let config = SampleConfig {
            percentage_sample_size: 2.0,
            ..SampleConfig::default()
        };
        // The path does not exist; Config must win because it is checked first.
        assert!(matches!(
            sample("/nonexistent/charnorm-test", &config),
            Err(crate::error::Error::Config(_))
        ));
    }

    #[test]
    fn test_distributed_windows_are_ordered_and_disjoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = vec![b'a'; 100_000];
        let path = write_fixture(&dir, "large.txt", &data);

        let sample = sample(&path, &small_config()).expect("sample");
        // 10% of 100000 = 10000 byte budget, well under the file size.
        assert!(sample.windows.len() >= 3, "head, middle, tail expected");
        assert!(sample.windows[0].is_head());

        let mut prev_end = 0u64;
        for window in &sample.windows {
            assert!(window.offset >= prev_end, "windows overlap");
            prev_end = window.offset + window.bytes.len() as u64;
        }
        assert!(prev_end <= 100_000);
        // Tail window ends exactly at EOF.
        assert_eq!(prev_end, 100_000);
    }

    #[test]
    fn test_total_sampled_matches_budget() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = vec![0u8; 200_000];
        let path = write_fixture(&dir, "budget.txt", &data);

        let config = small_config();
        let budget = config.effective_sample_size(200_000);
        let sample = sample(&path, &config).expect("sample");
        assert_eq!(sample.total_len() as u64, budget);
    }

    #[test]
    fn test_max_sample_size_is_honored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = vec![0u8; 500_000];
        let path = write_fixture(&dir, "capped.txt", &data);

        let config = SampleConfig {
            min_sample_size: 64,
            percentage_sample_size: 0.5,
            max_sample_size: Some(8192),
        };
        let sample = sample(&path, &config).expect("sample");
        assert!(sample.total_len() <= 8192);
    }

    #[test]
    fn test_plan_lengths_sum_to_budget() {
        for (file_size, budget) in [(100, 99), (100_000, 10_000), (1 << 30, 1 << 20)] {
            let plan = plan_windows(file_size, budget);
            let total: u64 = plan.iter().map(|(_, len)| len).sum();
            assert_eq!(total, budget, "file {} budget {}", file_size, budget);

            let mut prev_end = 0u64;
            for &(offset, len) in &plan {
                assert!(offset >= prev_end, "overlap in plan");
                prev_end = offset + len;
            }
            assert!(prev_end <= file_size);
        }
    }
}
