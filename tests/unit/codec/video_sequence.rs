use super::*;

use crate::codec::tags::{read_tag_body, read_tag_header};

fn nal(payload: &[u8]) -> Vec<u8> {
    let mut bytes = START_CODE.to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

fn sample_sequence(with_ranges: bool) -> VideoSequence {
    VideoSequence {
        width: 111,
        height: 57,
        frame_rate: 24.0,
        alpha_start_x: 0,
        alpha_start_y: 58,
        sps: nal(&[0x67, 1, 2, 3]),
        pps: nal(&[0x68, 4]),
        frames: vec![
            VideoFrame {
                is_keyframe: true,
                timestamp: 0,
                bytes: nal(&[0x65, 9, 9]),
            },
            VideoFrame {
                is_keyframe: false,
                timestamp: 1,
                bytes: nal(&[0x41, 8]),
            },
            VideoFrame {
                is_keyframe: false,
                timestamp: 2,
                bytes: nal(&[0x41, 7, 7, 7]),
            },
        ],
        static_time_ranges: with_ranges.then(|| vec![TimeRange::new(1, 2)]),
        mp4_header: None,
    }
}

#[test]
fn body_roundtrip_with_alpha() {
    let sequence = sample_sequence(true);
    let mut writer = ByteWriter::new();
    write_video_sequence_body(&mut writer, &sequence, true).unwrap();
    let bytes = writer.finish();

    let back = read_video_sequence_body(&mut ByteReader::new(&bytes), true).unwrap();
    assert_eq!(back, sequence);
}

#[test]
fn alpha_offsets_are_elided_without_alpha() {
    let mut sequence = sample_sequence(true);
    let mut writer = ByteWriter::new();
    write_video_sequence_body(&mut writer, &sequence, false).unwrap();
    let bytes = writer.finish();

    let back = read_video_sequence_body(&mut ByteReader::new(&bytes), false).unwrap();
    // The offsets were never serialized, so they come back zeroed.
    sequence.alpha_start_y = 0;
    assert_eq!(back, sequence);
}

#[test]
fn streams_without_a_trailing_range_list_read_as_none() {
    let sequence = sample_sequence(false);
    let mut writer = ByteWriter::new();
    write_video_sequence_body(&mut writer, &sequence, true).unwrap();
    let bytes = writer.finish();

    let back = read_video_sequence_body(&mut ByteReader::new(&bytes), true).unwrap();
    assert_eq!(back.static_time_ranges, None);
}

#[test]
fn an_empty_range_list_still_roundtrips_as_present() {
    let mut sequence = sample_sequence(false);
    sequence.static_time_ranges = Some(Vec::new());
    let mut writer = ByteWriter::new();
    write_video_sequence_body(&mut writer, &sequence, true).unwrap();
    let bytes = writer.finish();

    let back = read_video_sequence_body(&mut ByteReader::new(&bytes), true).unwrap();
    assert_eq!(back.static_time_ranges, Some(Vec::new()));
}

#[test]
fn payloads_without_a_start_code_are_rejected() {
    let mut sequence = sample_sequence(true);
    sequence.sps = vec![0x67, 1, 2, 3];
    let mut writer = ByteWriter::new();
    let err = write_video_sequence_body(&mut writer, &sequence, true).unwrap_err();
    assert!(matches!(err, FramepackError::Validation(_)));
}

#[test]
fn start_codes_are_stripped_on_the_wire_and_restored_on_read() {
    let mut writer = ByteWriter::new();
    write_bytes_without_start_code(&mut writer, &nal(&[0x65, 42])).unwrap();
    let bytes = writer.finish();
    // Varint length 2, then the payload without its 4-byte prefix.
    assert_eq!(bytes, vec![2, 0x65, 42]);

    let back = read_bytes_with_start_code(&mut ByteReader::new(&bytes)).unwrap();
    assert_eq!(back, nal(&[0x65, 42]));
}

#[test]
fn framed_tag_roundtrip() {
    let sequence = sample_sequence(true);
    let mut writer = ByteWriter::new();
    write_video_sequence_tag(&mut writer, &sequence, true).unwrap();
    let bytes = writer.finish();

    let mut reader = ByteReader::new(&bytes);
    let header = read_tag_header(&mut reader).unwrap();
    assert_eq!(header.code(), Some(TagCode::VideoSequence));
    let body = read_tag_body(&mut reader, header).unwrap();
    let back = read_video_sequence_body(&mut ByteReader::new(body), true).unwrap();
    assert_eq!(back, sequence);
}
