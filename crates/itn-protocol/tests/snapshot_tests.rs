//! Snapshot tests for USB-ITN wire encodings and decode results.

use insta::assert_snapshot;
use opengauge_itn_protocol as itn;

#[test]
fn test_snapshot_request_reading_wire() {
    let cmd = itn::Command::request_reading();
    assert_snapshot!(format!("{:?}", cmd.as_bytes()));
}

#[test]
fn test_snapshot_request_device_info_wire() {
    let cmd = itn::Command::request_device_info();
    assert_snapshot!(format!("{:?}", cmd.as_bytes()));
}

#[test]
fn test_snapshot_decode_measurement_millimeters() {
    let decoder = itn::MessageDecoder::new(itn::UnitScale::Millimeters);
    let msg = decoder
        .decode(b"01A+00012.34")
        .expect("decode should succeed");
    assert_snapshot!(format!("{msg:?}"));
}

#[test]
fn test_snapshot_decode_measurement_micrometers() {
    let decoder = itn::MessageDecoder::new(itn::UnitScale::Micrometers);
    let msg = decoder
        .decode(b"01A+00012.34")
        .expect("decode should succeed");
    assert_snapshot!(format!("{msg:?}"));
}

#[test]
fn test_snapshot_decode_device_info() {
    let decoder = itn::MessageDecoder::default();
    let msg = decoder.decode(b"1IT-012AB").expect("decode should succeed");
    assert_snapshot!(format!("{msg:?}"));
}

#[test]
fn test_snapshot_decode_status() {
    let decoder = itn::MessageDecoder::default();
    let msg = decoder.decode(b"91").expect("decode should succeed");
    assert_snapshot!(format!("{msg:?}"));
}

#[test]
fn test_snapshot_decode_unrecognized() {
    let decoder = itn::MessageDecoder::default();
    let msg = decoder.decode(b"Zfoo").expect("decode should succeed");
    assert_snapshot!(format!("{msg:?}"));
}
