//! PCM sample conversion.
//!
//! The voice endpoint exchanges 16-bit signed little-endian PCM. Internally
//! the hub works with floating-point samples; conversion uses the symmetric
//! 32768 scale factor on both directions so round-tripping an in-range sample
//! stays within one quantization step. Out-of-range input saturates at the
//! i16 bounds.

/// Convert floating-point samples to 16-bit signed PCM.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| (s * 32768.0) as i16).collect()
}

/// Convert 16-bit signed PCM to floating-point samples.
pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Pack i16 samples into little-endian bytes.
pub fn i16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Unpack little-endian bytes into i16 samples. A trailing odd byte is
/// dropped, matching how the remote codec frames whole samples.
pub fn le_bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Capture-side pipeline step: float frame to wire-ready PCM bytes.
pub fn f32_to_pcm_bytes(samples: &[f32]) -> Vec<u8> {
    i16_to_le_bytes(&f32_to_i16(samples))
}

/// Playback-side pipeline step: wire PCM bytes to float samples.
pub fn pcm_bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    i16_to_f32(&le_bytes_to_i16(bytes))
}

/// Duration in seconds of a mono sample buffer at the given rate.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    sample_count as f64 / sample_rate as f64
}
