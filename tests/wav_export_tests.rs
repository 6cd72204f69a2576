// Tests for WAV export of synthesized speech.

use vibeflow_hub::audio::wav;

#[test]
fn test_written_wav_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");

    let samples: Vec<i16> = (0..2400).map(|i| ((i % 200) * 100 - 10000) as i16).collect();
    wav::write_pcm_wav(&path, &samples, 24000).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24000);
    assert_eq!(spec.bits_per_sample, 16);

    let restored: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(restored, samples);
}

#[test]
fn test_empty_buffer_writes_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");

    wav::write_pcm_wav(&path, &[], 16000).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.len(), 0);
}
