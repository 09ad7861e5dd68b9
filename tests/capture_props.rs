//! Property-based tests for capture sessions
//!
//! Random operation sequences must never leak a device stream, and the
//! artifact pipelines must preserve chunk order and pixel layout.

use bytes::Bytes;
use crowdcam::photo::mirror_frame;
use crowdcam::recording::RecordingBuffer;
use crowdcam::testing::{synthetic_frame, SyntheticProvider};
use crowdcam::{CaptureMode, CaptureSession, CaptureStatus};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    StartPhoto,
    StartVideo,
    Select(Option<u8>),
    CapturePhoto,
    StartRecording,
    Chunk(Vec<u8>),
    StopRecording,
    Cancel,
    Acknowledge,
    Reset,
    Deny(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::StartPhoto),
        Just(Op::StartVideo),
        proptest::option::of(0u8..3).prop_map(Op::Select),
        Just(Op::CapturePhoto),
        Just(Op::StartRecording),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Op::Chunk),
        Just(Op::StopRecording),
        Just(Op::Cancel),
        Just(Op::Acknowledge),
        Just(Op::Reset),
        any::<bool>().prop_map(Op::Deny),
    ]
}

async fn apply(session: &CaptureSession, provider: &SyntheticProvider, op: Op) {
    // Results are irrelevant here; only the resulting state is checked.
    match op {
        Op::StartPhoto => drop(session.start_capture(CaptureMode::Photo).await),
        Op::StartVideo => drop(session.start_capture(CaptureMode::Video).await),
        Op::Select(device) => {
            drop(session.select_device(device.map(|n| format!("cam-{}", n))).await)
        }
        Op::CapturePhoto => drop(session.capture_photo()),
        Op::StartRecording => drop(session.start_recording()),
        Op::Chunk(data) => drop(session.push_chunk(Bytes::from(data))),
        Op::StopRecording => drop(session.stop_recording()),
        Op::Cancel => session.cancel(),
        Op::Acknowledge => session.acknowledge_failure(),
        Op::Reset => session.reset(),
        Op::Deny(true) => provider.deny("Permission denied"),
        Op::Deny(false) => provider.allow(),
    }
}

proptest! {
    /// Recorded output is the in-order concatenation of non-empty chunks.
    #[test]
    fn recording_preserves_chunk_order(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 0..20)
    ) {
        let mut buffer = RecordingBuffer::new();
        for chunk in &chunks {
            buffer.push(Bytes::from(chunk.clone()));
        }
        let (data, stats) = buffer.finish();

        let expected: Vec<u8> = chunks.iter().flatten().copied().collect();
        prop_assert_eq!(&data[..], &expected[..]);
        prop_assert_eq!(stats.chunks, chunks.iter().filter(|c| !c.is_empty()).count());
        prop_assert_eq!(stats.discarded_empty, chunks.iter().filter(|c| c.is_empty()).count() as u64);
    }

    /// Mirroring twice restores the frame and never changes its size.
    #[test]
    fn mirroring_is_an_involution(seed in any::<u64>(), width in 1u32..24, height in 1u32..24) {
        let frame = synthetic_frame(seed, width, height);
        let once = mirror_frame(frame.clone()).unwrap();
        prop_assert_eq!((once.width, once.height), (width, height));
        prop_assert_eq!(once.data.len(), frame.data.len());

        let twice = mirror_frame(once).unwrap();
        prop_assert_eq!(twice, frame);
    }

    /// A stream is open exactly when the session is previewing or recording,
    /// and never more than one at a time.
    #[test]
    fn sessions_never_leak_streams(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let provider = Arc::new(SyntheticProvider::new());
        let counters = provider.counters();
        let session = CaptureSession::new(provider.clone());

        futures::executor::block_on(async {
            for op in ops {
                apply(&session, &provider, op).await;

                let status = session.status();
                let expected_open = usize::from(status.holds_stream());
                assert_eq!(counters.open(), expected_open, "status {}", status);
                assert_eq!(session.has_active_stream(), status.holds_stream());
                assert_eq!(
                    session.artifact().is_some(),
                    status == CaptureStatus::Finalized
                );
            }
        });

        session.cancel();
        prop_assert_eq!(counters.open(), 0);
        prop_assert!(counters.peak() <= 1);
    }
}
