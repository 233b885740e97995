//! Custom assertions for extraction progress

use rom_launcher::ExtractionProgress;

/// Percentages never decrease, stay below 100 until the last sample, and the
/// last sample is exactly 100
pub fn assert_progress_well_formed(samples: &[ExtractionProgress]) {
    assert!(!samples.is_empty(), "expected at least one progress sample");

    for pair in samples.windows(2) {
        assert!(
            pair[1].percentage >= pair[0].percentage,
            "progress went backwards: {:?} -> {:?}",
            pair[0],
            pair[1]
        );
    }

    let (last, in_flight) = samples.split_last().unwrap();
    assert_eq!(last.percentage, 100.0);
    for sample in in_flight {
        assert!(sample.percentage < 100.0, "early completion: {sample:?}");
    }
}

/// Drain every sample currently queued on `rx`
pub fn drain(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<ExtractionProgress>,
) -> Vec<ExtractionProgress> {
    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }
    samples
}
