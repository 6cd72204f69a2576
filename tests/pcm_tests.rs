// Unit tests for PCM sample conversion.
//
// The conversion must reproduce the symmetric 32768 scale factor exactly for
// bit-comparable interop with the remote codec.

use vibeflow_hub::audio::pcm;

#[test]
fn test_scale_factor_is_exact() {
    assert_eq!(pcm::f32_to_i16(&[0.0]), vec![0]);
    assert_eq!(pcm::f32_to_i16(&[0.5]), vec![16384]);
    assert_eq!(pcm::f32_to_i16(&[-0.5]), vec![-16384]);
    assert_eq!(pcm::f32_to_i16(&[-1.0]), vec![-32768]);
}

#[test]
fn test_decode_scale_factor() {
    assert_eq!(pcm::i16_to_f32(&[16384]), vec![0.5]);
    assert_eq!(pcm::i16_to_f32(&[-32768]), vec![-1.0]);
    assert_eq!(pcm::i16_to_f32(&[0]), vec![0.0]);
}

#[test]
fn test_round_trip_within_one_quantization_step() {
    // For inputs within [-1.0, 1.0], encode-then-decode stays within
    // 1/32768 of the original.
    let step = 1.0 / 32768.0;
    let inputs: Vec<f32> = (-100..=100).map(|i| i as f32 / 100.0).collect();

    let decoded = pcm::i16_to_f32(&pcm::f32_to_i16(&inputs));

    for (original, restored) in inputs.iter().zip(decoded.iter()) {
        assert!(
            (original - restored).abs() <= step,
            "sample {} round-tripped to {}",
            original,
            restored
        );
    }
}

#[test]
fn test_out_of_range_saturates() {
    assert_eq!(pcm::f32_to_i16(&[1.5]), vec![i16::MAX]);
    assert_eq!(pcm::f32_to_i16(&[-1.5]), vec![i16::MIN]);
    // 1.0 * 32768 exceeds i16::MAX by one and saturates
    assert_eq!(pcm::f32_to_i16(&[1.0]), vec![i16::MAX]);
}

#[test]
fn test_byte_packing_is_little_endian() {
    let bytes = pcm::i16_to_le_bytes(&[0x0102, -2]);
    assert_eq!(bytes, vec![0x02, 0x01, 0xFE, 0xFF]);

    let samples = pcm::le_bytes_to_i16(&bytes);
    assert_eq!(samples, vec![0x0102, -2]);
}

#[test]
fn test_trailing_odd_byte_is_dropped() {
    let samples = pcm::le_bytes_to_i16(&[0x00, 0x01, 0xAB]);
    assert_eq!(samples, vec![256]);
}

#[test]
fn test_pipeline_helpers_compose() {
    let frame = vec![0.25f32, -0.75, 0.0];
    let bytes = pcm::f32_to_pcm_bytes(&frame);
    assert_eq!(bytes.len(), 6);

    let restored = pcm::pcm_bytes_to_f32(&bytes);
    for (a, b) in frame.iter().zip(restored.iter()) {
        assert!((a - b).abs() <= 1.0 / 32768.0);
    }
}

#[test]
fn test_duration() {
    assert!((pcm::duration_secs(2400, 24000) - 0.1).abs() < 1e-9);
    assert!((pcm::duration_secs(16000, 16000) - 1.0).abs() < 1e-9);
    assert_eq!(pcm::duration_secs(0, 24000), 0.0);
}
