//! Latency-aware audio write pacing
//!
//! Each loop iteration the pacer asks the playback device how much audio it
//! still holds and sizes this iteration's write so the device queue sits at
//! one write quantum: low enough that latency stays bounded, high enough
//! that the queue cannot drain before the next iteration refills it.

use thiserror::Error;

/// Interleaved stereo everywhere.
pub const CHANNEL_COUNT: usize = 2;

/// How many times one write is retried through underrun faults before the
/// iteration gives up and stays silent.
const RESUBMIT_LIMIT: u32 = 4;

/// Failure reported by a playback device on submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The device queue drained before this write. Recoverable: reprime the
    /// device and resubmit the same samples.
    #[error("playback queue underrun")]
    Underrun,
    /// Any other device-level failure. The iteration continues in silence.
    #[error("playback device error: {0}")]
    Device(String),
}

/// The audio-device collaborator boundary.
///
/// Implemented by the shell's real output backend and by scripted fakes in
/// tests.
pub trait PlaybackQueue {
    /// Stereo frames queued on the device but not yet played.
    fn queued_frames(&self) -> usize;

    /// Submit interleaved stereo samples. Returns the number of frames the
    /// device accepted.
    fn submit(&mut self, samples: &[f32]) -> Result<usize, SubmitError>;

    /// Reset device state after an underrun fault so the next submit can
    /// succeed.
    fn reprime(&mut self);
}

/// Borrowed view of the pacer's scratch buffer, filled by the update call.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    pub samples_per_second: u32,
    /// Stereo frames requested this iteration. May be zero.
    pub frame_count: usize,
    /// Interleaved stereo storage for exactly `frame_count` frames.
    pub samples: &'a mut [f32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacerState {
    Closed,
    Opened,
    Streaming,
}

/// Sizes and submits one audio write per loop iteration.
///
/// Lifecycle: `Closed` until a device is attached with
/// [`open`](Self::open), `Opened` until the first plan primes the queue
/// with a quantum of silence, then `Streaming` until shutdown. Without a
/// device every plan is zero frames and the loop runs silent.
pub struct AudioPacer<Q: PlaybackQueue> {
    queue: Option<Q>,
    state: PacerState,
    samples_per_second: u32,
    quantum_frames: usize,
    scratch: Vec<f32>,
}

impl<Q: PlaybackQueue> AudioPacer<Q> {
    /// `pace_hz` sets the write quantum: `samples_per_second / pace_hz`
    /// frames of queue occupancy to maintain.
    pub fn new(samples_per_second: u32, pace_hz: u32) -> Self {
        let quantum_frames = (samples_per_second / pace_hz.max(1)) as usize;
        Self {
            queue: None,
            state: PacerState::Closed,
            samples_per_second,
            quantum_frames,
            scratch: vec![0.0; quantum_frames * CHANNEL_COUNT],
        }
    }

    /// Attach an opened playback device.
    pub fn open(&mut self, queue: Q) {
        self.queue = Some(queue);
        self.state = PacerState::Opened;
    }

    /// Detach the device on shutdown.
    pub fn close(&mut self) {
        self.queue = None;
        self.state = PacerState::Closed;
    }

    pub fn samples_per_second(&self) -> u32 {
        self.samples_per_second
    }

    pub fn quantum_frames(&self) -> usize {
        self.quantum_frames
    }

    pub fn is_streaming(&self) -> bool {
        self.state == PacerState::Streaming
    }

    /// Decide this iteration's write size from the current device delay.
    ///
    /// Returns zero when the queue is already at or above the quantum, or
    /// when no device is attached.
    pub fn plan(&mut self) -> usize {
        if self.queue.is_none() {
            return 0;
        }
        if self.state == PacerState::Opened {
            self.start_streaming();
        }
        let queued = self.queue.as_ref().map_or(0, Q::queued_frames);
        self.quantum_frames
            .saturating_sub(queued)
            .min(self.scratch.len() / CHANNEL_COUNT)
    }

    /// Borrow scratch storage for the update call to fill.
    ///
    /// `frames` must come from this iteration's [`plan`](Self::plan).
    pub fn block(&mut self, frames: usize) -> AudioBlock<'_> {
        let samples = frames * CHANNEL_COUNT;
        AudioBlock {
            samples_per_second: self.samples_per_second,
            frame_count: frames,
            samples: &mut self.scratch[..samples],
        }
    }

    /// Submit the filled scratch to the device.
    ///
    /// A zero-frame commit is a skipped write. Underrun faults are recovered
    /// by repriming and resubmitting the same samples; any other fault is
    /// logged and this iteration's audio is dropped.
    pub fn commit(&mut self, frames: usize) {
        if frames == 0 {
            return;
        }
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        submit_with_reprime(queue, &self.scratch[..frames * CHANNEL_COUNT]);
    }

    /// Prime the device with one quantum of silence so playback starts with
    /// a full queue instead of an immediate underrun.
    fn start_streaming(&mut self) {
        self.scratch.fill(0.0);
        if let Some(queue) = self.queue.as_mut() {
            submit_with_reprime(queue, &self.scratch);
        }
        self.state = PacerState::Streaming;
    }
}

fn submit_with_reprime<Q: PlaybackQueue>(queue: &mut Q, samples: &[f32]) {
    for _ in 0..RESUBMIT_LIMIT {
        match queue.submit(samples) {
            Ok(accepted) => {
                let offered = samples.len() / CHANNEL_COUNT;
                if accepted < offered {
                    tracing::debug!(offered, accepted, "device accepted a short audio write");
                }
                return;
            }
            Err(SubmitError::Underrun) => {
                tracing::debug!("audio underrun fault, repriming device");
                queue.reprime();
            }
            Err(err) => {
                tracing::warn!("audio submit failed: {err}");
                return;
            }
        }
    }
    tracing::warn!("audio device kept faulting, dropping this iteration's samples");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted device: reports a fixed delay and fails per a schedule.
    struct FakeQueue {
        queued: usize,
        fail_next: Vec<SubmitError>,
        accepted: Vec<usize>,
        reprimes: u32,
    }

    impl FakeQueue {
        fn with_delay(queued: usize) -> Self {
            Self {
                queued,
                fail_next: Vec::new(),
                accepted: Vec::new(),
                reprimes: 0,
            }
        }
    }

    impl PlaybackQueue for FakeQueue {
        fn queued_frames(&self) -> usize {
            self.queued
        }

        fn submit(&mut self, samples: &[f32]) -> Result<usize, SubmitError> {
            if let Some(err) = self.fail_next.pop() {
                return Err(err);
            }
            let frames = samples.len() / CHANNEL_COUNT;
            self.accepted.push(frames);
            Ok(frames)
        }

        fn reprime(&mut self) {
            self.reprimes += 1;
        }
    }

    #[test]
    fn plan_tops_queue_up_to_one_quantum() {
        let mut pacer = AudioPacer::new(48_000, 15);
        assert_eq!(pacer.quantum_frames(), 3200);
        pacer.open(FakeQueue::with_delay(1200));

        let frames = pacer.plan();
        assert_eq!(frames, 2000);
        // Requested plus queued never exceeds the quantum.
        assert!(frames + 1200 <= pacer.quantum_frames());
    }

    #[test]
    fn plan_skips_write_when_queue_is_full() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(3200));
        assert_eq!(pacer.plan(), 0);

        let mut over = AudioPacer::new(48_000, 15);
        over.open(FakeQueue::with_delay(5000));
        assert_eq!(over.plan(), 0);
    }

    #[test]
    fn plan_without_device_is_always_zero() {
        let mut pacer: AudioPacer<FakeQueue> = AudioPacer::new(48_000, 15);
        assert_eq!(pacer.plan(), 0);
        assert!(!pacer.is_streaming());
    }

    #[test]
    fn first_plan_primes_one_quantum_of_silence() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(0));

        pacer.plan();
        assert!(pacer.is_streaming());
        let queue = pacer.queue.as_ref().unwrap();
        assert_eq!(queue.accepted, vec![3200]);
    }

    #[test]
    fn underrun_is_reprimed_and_resubmitted() {
        let mut pacer = AudioPacer::new(48_000, 15);
        let mut queue = FakeQueue::with_delay(0);
        queue.fail_next.push(SubmitError::Underrun);
        pacer.open(queue);
        pacer.plan(); // priming write hits the fault first

        let queue = pacer.queue.as_ref().unwrap();
        assert_eq!(queue.reprimes, 1);
        assert_eq!(queue.accepted, vec![3200]);
    }

    #[test]
    fn non_underrun_fault_drops_the_write_without_retry() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(0));
        pacer.plan();

        let queue = pacer.queue.as_mut().unwrap();
        queue.accepted.clear();
        queue.fail_next.push(SubmitError::Device("device unplugged".into()));

        pacer.commit(100);
        let queue = pacer.queue.as_ref().unwrap();
        assert!(queue.accepted.is_empty());
        assert_eq!(queue.reprimes, 0);
    }

    #[test]
    fn commit_zero_frames_is_a_skipped_write() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(0));
        pacer.plan();

        let queue = pacer.queue.as_mut().unwrap();
        queue.accepted.clear();
        pacer.commit(0);
        assert!(pacer.queue.as_ref().unwrap().accepted.is_empty());
    }

    #[test]
    fn block_exposes_exactly_the_planned_frames() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(3000));
        let frames = pacer.plan();
        assert_eq!(frames, 200);

        let block = pacer.block(frames);
        assert_eq!(block.frame_count, 200);
        assert_eq!(block.samples.len(), 200 * CHANNEL_COUNT);
        assert_eq!(block.samples_per_second, 48_000);
    }

    #[test]
    fn close_returns_to_silence() {
        let mut pacer = AudioPacer::new(48_000, 15);
        pacer.open(FakeQueue::with_delay(0));
        pacer.plan();
        assert!(pacer.is_streaming());

        pacer.close();
        assert!(!pacer.is_streaming());
        assert_eq!(pacer.plan(), 0);
    }
}
