mod support;

use freewheel::{
    columns::{ActivityColumns, Status},
    decode_activity,
};

use support::*;

fn activity_document(samples: u32) -> Vec<u8> {
    let mut b = FitBuilder::new().definition(
        0,
        RECORD,
        &[(253, 4, UINT32), (5, 4, UINT32), (3, 1, UINT8)],
    );
    for i in 0..samples {
        let heart_rate = if i % 2 == 0 { 120 + i as u8 } else { 0xFF };
        b = b.data(
            0,
            &cat(&[&(500 + i).to_le_bytes(), &(i * 1000).to_le_bytes(), &[heart_rate]]),
        );
    }
    b.definition(1, LAP, &[(253, 4, UINT32), (9, 4, UINT32), (3, 4, SINT32)])
        .data(
            1,
            &cat(&[&900u32.to_le_bytes(), &250_000u32.to_le_bytes(), &i32::MAX.to_le_bytes()]),
        )
        .with_activity(1000, 3600)
        .build()
}

#[test]
fn columns_hold_decoded_values() {
    let activity = decode_activity(&activity_document(4)).unwrap();
    let columns = ActivityColumns::new(&activity, 8, 2);

    assert!(columns.is_success());

    let records = &columns.records;
    assert_eq!((records.written, records.total), (4, 4));
    assert_eq!(records.timestamp[..4], [500, 501, 502, 503].map(|t| t + 631_065_600));
    assert_eq!(records.distance[..4], [0.0, 10.0, 20.0, 30.0]);
    assert_eq!(records.heart_rate[0], 120.0);
    assert!(records.heart_rate[1].is_nan());
    assert_eq!(records.heart_rate[2], 122.0);

    // Unused slots and fields the document never supplied are NaN.
    assert!(records.distance[4..].iter().all(|x| x.is_nan()));
    assert!(records.latitude.iter().all(|x| x.is_nan()));
    assert_eq!(records.timestamp[4..], [0; 4]);

    let laps = &columns.laps;
    assert_eq!((laps.written, laps.total), (1, 1));
    assert_eq!(laps.total_distance[0], 2500.0);
    assert!(laps.start_latitude[0].is_nan());

    assert_eq!(columns.session.total_distance, 5000.0);
    assert!(columns.session.avg_heart_rate.is_nan());
    assert_eq!(columns.utc_timestamp, 1000 + 631_065_600);
    assert_eq!(columns.utc_offset, 3600);
}

#[test]
fn small_capacity_truncates() {
    let activity = decode_activity(&activity_document(10)).unwrap();
    let columns = ActivityColumns::new(&activity, 3, 0);

    assert_eq!(columns.records.distance.len(), 3);
    assert_eq!((columns.records.written, columns.records.total), (3, 10));
    assert_eq!(columns.records.distance, [0.0, 10.0, 20.0]);
    assert!(columns.laps.total_distance.is_empty());
    assert_eq!((columns.laps.written, columns.laps.total), (0, 1));
}

#[test]
fn failed_decode_yields_placeholders() {
    let mut data = activity_document(2);
    data[20] ^= 0x10;

    let result = decode_activity(&data);
    let columns = ActivityColumns::from_result(&result, 5, 5);

    let Status::Failed(message) = &columns.status else {
        panic!("expected failure, got {:?}", columns.status);
    };
    assert!(message.contains("CRC"), "{message}");
    assert!(!columns.is_success());
    assert_eq!(columns.records.distance.len(), 5);
    assert!(columns.records.distance.iter().all(|x| x.is_nan()));
    assert_eq!((columns.records.written, columns.records.total), (0, 0));
    assert!(columns.session.total_distance.is_nan());
    assert_eq!(columns.utc_offset, 0);
}
