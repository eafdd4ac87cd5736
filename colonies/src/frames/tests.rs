//! Tests for the time-series loader.

use super::*;

const HEADER: &str = "id,x,y,theta,volume,gfp,rfp,yfp,cfp";

fn csv_text(blocks: &[&[&str]]) -> String {
    let mut text = String::new();
    for block in blocks {
        text.push_str(HEADER);
        text.push('\n');
        for row in *block {
            text.push_str(row);
            text.push('\n');
        }
    }
    text
}

#[test]
fn test_blocks_split_on_header_repeat() {
    let text = csv_text(&[
        &["1,10,20,0.1,5,1,0,0,0", "2,30,40,0.2,6,0,2,0,0"],
        &["1,11,21,0.1,5,1,0,0,0"],
        &["1,12,22,0.1,5,1,0,0,0", "2,31,41,0.2,6,0,2,0,0", "3,50,60,0,1,0,0,3,0"],
    ]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames.frame(0).unwrap().len(), 2);
    assert_eq!(frames.frame(1).unwrap().len(), 1);
    assert_eq!(frames.frame(2).unwrap().len(), 3);
    for (i, frame) in frames.frames().iter().enumerate() {
        assert_eq!(frame.index, i);
    }
}

#[test]
fn test_observation_fields_parsed() {
    let text = csv_text(&[&["42, 12.5, -3.25, 1.57, 8.0, 0, 150, 0.5, 0"]]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();
    let obs = &frames.frame(0).unwrap().observations[0];

    assert_eq!(obs.id, "42");
    assert_eq!(obs.position, DVec2::new(12.5, -3.25));
    assert_eq!(obs.theta, 1.57);
    assert_eq!(obs.volume, 8.0);
    assert_eq!(obs.channels, [0.0, 150.0, 0.5, 0.0]);
}

#[test]
fn test_empty_block_keeps_index_alignment() {
    let text = csv_text(&[&["1,0,0,0,0,1,0,0,0"], &[], &["1,5,5,0,0,1,0,0,0"]]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();

    assert_eq!(frames.len(), 3);
    assert!(frames.frame(1).unwrap().is_empty());
    assert_eq!(frames.frame(2).unwrap().observations[0].position.x, 5.0);
}

#[test]
fn test_trailing_header_without_rows_adds_nothing() {
    let mut text = csv_text(&[&["1,0,0,0,0,1,0,0,0"]]);
    text.push_str(HEADER);
    text.push('\n');
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_first_row_always_skipped() {
    let text = "1,0,0,0,0,1,0,0,0\n2,1,1,0,0,1,0,0,0\nid,x,y\n3,2,2,0,0,1,0,0,0\n";
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();

    assert_eq!(frames.len(), 2);
    let ids: Vec<&str> = frames
        .frames()
        .iter()
        .flat_map(|f| f.observations.iter().map(|o| o.id.as_str()))
        .collect();
    assert_eq!(ids, vec!["2", "3"]);
}

#[test]
fn test_empty_input_has_no_frames() {
    let frames = FrameSet::from_reader("".as_bytes()).unwrap();
    assert!(frames.is_empty());
}

#[test]
fn test_non_numeric_field_is_malformed_row() {
    let text = csv_text(&[&["1,0,0,0,0,1,0,0,0", "2,abc,0,0,0,1,0,0,0"]]);
    let err = FrameSet::from_reader(text.as_bytes()).unwrap_err();
    match err {
        Error::MalformedRow { line, field, value } => {
            assert_eq!(line, 3);
            assert_eq!(field, "x");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_short_row_is_malformed_row() {
    let text = csv_text(&[&["1,0,0,0,0,1,0"]]);
    let err = FrameSet::from_reader(text.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MalformedRow { field: "ch3", .. }));
}

#[test]
fn test_non_finite_value_is_malformed_row() {
    let text = csv_text(&[&["1,NaN,0,0,0,1,0,0,0"]]);
    let err = FrameSet::from_reader(text.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MalformedRow { field: "x", .. }));
}

#[test]
fn test_frame_index_out_of_range_reports_len() {
    let text = csv_text(&[&["1,0,0,0,0,1,0,0,0"], &["1,0,0,0,0,1,0,0,0"]]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();
    let err = frames.frame(1500).unwrap_err();
    assert!(matches!(
        err,
        Error::IndexOutOfRange {
            index: 1500,
            len: 2
        }
    ));
    assert!(err.to_string().contains("0..2"));
}

#[test]
fn test_channel_filter_keeps_positive_in_order() {
    let text = csv_text(&[&[
        "1,0,0,0,0,3,0,0,0",
        "2,1,1,0,0,0,7,0,0",
        "3,2,2,0,0,1,1,0,0",
        "4,3,3,0,0,0,0,0,0",
    ]]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();
    let frame = frames.frame(0).unwrap();

    let gfp: Vec<&str> = frame
        .positive_in(Channel::Gfp)
        .iter()
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(gfp, vec!["1", "3"]);

    let rfp: Vec<&str> = frame
        .positive_in(Channel::Rfp)
        .iter()
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(rfp, vec!["2", "3"]);
}

#[test]
fn test_empty_channel_selection_is_reported() {
    let text = csv_text(&[&["1,0,0,0,0,3,0,0,0"]]);
    let frames = FrameSet::from_reader(text.as_bytes()).unwrap();
    let err = frames
        .frame(0)
        .unwrap()
        .select_positive(Channel::Cfp)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::EmptyChannelSelection {
            channel: Channel::Cfp,
            timepoint: 0
        }
    ));
}

#[test]
fn test_load_missing_file_reports_path() {
    let err = FrameSet::load(Path::new("does/not/exist.csv")).unwrap_err();
    match err {
        Error::Io { path, .. } => assert!(path.ends_with("exist.csv")),
        other => panic!("unexpected error: {other}"),
    }
}
