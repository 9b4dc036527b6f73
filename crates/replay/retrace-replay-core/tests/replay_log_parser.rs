use retrace_replay_core::{parse_replay_csv, TimestampUnit};

const HEADER: &str = "idPrefix,id,x,y,velocityScalar,orientation,timestamp,workstation,trajectoryId,start,goal";

#[test]
fn parses_fixture_in_file_order() {
    let text = retrace_test_fixtures::replay_csv("warehouse").expect("fixture");
    let report = parse_replay_csv(&text);
    assert_eq!(report.points.len(), 10);
    assert!(report.skipped.is_empty());

    let first = &report.points[0];
    assert_eq!(first.id_prefix, "agent");
    assert_eq!(first.id, "a-01");
    assert_eq!(first.position.x, 0.0);
    assert_eq!(first.position.y, 5.0);
    assert_eq!(first.velocity, 1.25);
    assert_eq!(first.orientation, 90.0);
    assert_eq!(first.timestamp, 1_000_000_000);
    assert_eq!(first.workstation, 3);
    assert_eq!(first.trajectory_id, "7");
    assert_eq!(first.start, 0.0);
    assert_eq!(first.goal, 12.5);

    // File order, no grouping by id.
    assert!(report
        .points
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp));
}

#[test]
fn short_line_is_skipped_not_fatal() {
    let text = retrace_test_fixtures::replay_csv("warehouse-bad-line").expect("fixture");
    let report = parse_replay_csv(&text);
    // Six data lines, one malformed: five points survive.
    assert_eq!(report.points.len(), 5);
    assert_eq!(report.skipped.len(), 1);

    let skip = &report.skipped[0];
    assert_eq!(skip.line, 5);
    assert!(skip.reason.contains("11 fields"));
    assert!(skip.raw.contains("2006000000"));
}

#[test]
fn numeric_garbage_skips_only_that_line() {
    let text = format!(
        "{HEADER}\n\
         agent,a,0.0,0.0,1.0,0.0,1000,1,7,0.0,1.0\n\
         agent,a,oops,0.0,1.0,0.0,2000,1,7,0.0,1.0\n\
         agent,a,0.2,0.0,1.0,0.0,3000,1,7,0.0,1.0\n"
    );
    let report = parse_replay_csv(&text);
    assert_eq!(report.points.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 3);
    assert!(report.skipped[0].reason.contains("oops"));
}

#[test]
fn scientific_notation_and_padding_are_tolerated() {
    let text = format!(
        "{HEADER}\n\
         agent,a,1.5e2, 2.5,1.0,0.0,1000,1,7,0.0,1.0\n"
    );
    let report = parse_replay_csv(&text);
    assert_eq!(report.points.len(), 1);
    assert_eq!(report.points[0].position.x, 150.0);
    assert_eq!(report.points[0].position.y, 2.5);
}

#[test]
fn header_only_input_yields_nothing() {
    let report = parse_replay_csv(&format!("{HEADER}\n"));
    assert!(report.points.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(report.timestamp_unit(), None);
}

#[test]
fn timestamp_unit_is_judged_from_the_first_two_points() {
    let text = retrace_test_fixtures::replay_csv("warehouse").expect("fixture");
    let report = parse_replay_csv(&text);
    // 2 ms between samples expressed in nanoseconds looks like microseconds
    // under the classification bands; the call is diagnostic only.
    assert_eq!(report.timestamp_unit(), Some(TimestampUnit::Microseconds));
}

#[test]
fn extra_fields_are_allowed() {
    let text = format!(
        "{HEADER},extra\n\
         agent,a,0.0,0.0,1.0,0.0,1000,1,7,0.0,1.0,ignored\n"
    );
    let report = parse_replay_csv(&text);
    assert_eq!(report.points.len(), 1);
    assert!(report.skipped.is_empty());
}
