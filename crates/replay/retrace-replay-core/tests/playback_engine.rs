use std::cell::RefCell;
use std::rc::Rc;

use retrace_replay_core::{PlaybackConfig, ReplayEvent, TrajectoryEngine};

type Collected = Rc<RefCell<Vec<ReplayEvent>>>;

fn engine_with_collector(fixture: &str) -> (TrajectoryEngine, Collected) {
    let collected: Collected = Rc::new(RefCell::new(Vec::new()));
    let mut engine = TrajectoryEngine::new(PlaybackConfig::default());
    let sink = Rc::clone(&collected);
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    let text = retrace_test_fixtures::trajectory_json(fixture).expect("fixture");
    engine.load_str(&text).expect("load");
    (engine, collected)
}

fn frame_changes(collected: &Collected) -> usize {
    collected
        .borrow()
        .iter()
        .filter(|event| matches!(event, ReplayEvent::FrameChanged { .. }))
        .count()
}

fn trajectory_changes_to(collected: &Collected, id: &str) -> usize {
    collected
        .borrow()
        .iter()
        .filter(
            |event| matches!(event, ReplayEvent::TrajectoryChanged { trajectory } if trajectory.as_str() == id),
        )
        .count()
}

#[test]
fn load_announces_first_trajectory() {
    let (engine, collected) = engine_with_collector("crossing");
    assert_eq!(engine.current_trajectory_id().map(|id| id.as_str()), Some("1"));
    let events = collected.borrow();
    assert!(matches!(
        &events[0],
        ReplayEvent::FrameChanged { frame } if frame.x == 0.5
    ));
    assert!(matches!(
        &events[1],
        ReplayEvent::TrajectoryChanged { trajectory } if trajectory.as_str() == "1"
    ));
}

#[test]
fn play_without_data_is_a_no_op() {
    let mut engine = TrajectoryEngine::new(PlaybackConfig::default());
    engine.play();
    assert!(!engine.is_playing());
    engine.update(1.0);
    assert!(engine.current_frame().is_none());
}

#[test]
fn speed_clamps_to_minimum_only() {
    let (mut engine, _collected) = engine_with_collector("crossing");
    engine.set_speed(0.01);
    assert_eq!(engine.speed(), 0.1);
    engine.set_speed(50.0);
    assert_eq!(engine.speed(), 50.0);
}

#[test]
fn update_advances_once_interval_accumulates() {
    let (mut engine, collected) = engine_with_collector("crossing");
    collected.borrow_mut().clear();
    engine.play();

    engine.update(0.05);
    assert_eq!(engine.frame_index(), 0);
    assert_eq!(frame_changes(&collected), 0);

    engine.update(0.06); // accumulated 0.11 >= 0.1
    assert_eq!(engine.frame_index(), 1);
    assert_eq!(frame_changes(&collected), 1);

    let events = collected.borrow();
    assert!(matches!(
        events.last(),
        Some(ReplayEvent::Progress { trajectory, frame: 2, total: 3 })
            if trajectory.as_str() == "1"
    ));
}

#[test]
fn one_catch_up_step_per_tick() {
    let (mut engine, collected) = engine_with_collector("crossing");
    collected.borrow_mut().clear();
    engine.play();
    // A long stall still advances a single frame.
    engine.update(0.75);
    assert_eq!(engine.frame_index(), 1);
    assert_eq!(frame_changes(&collected), 1);
}

#[test]
fn speed_scales_the_frame_interval() {
    let (mut engine, _collected) = engine_with_collector("crossing");
    engine.set_speed(2.0);
    engine.play();
    engine.update(0.06); // 0.06 >= 0.1 / 2.0
    assert_eq!(engine.frame_index(), 1);
}

#[test]
fn pause_freezes_the_cursor() {
    let (mut engine, _collected) = engine_with_collector("crossing");
    engine.play();
    engine.update(0.11);
    engine.pause();
    engine.update(10.0);
    assert_eq!(engine.frame_index(), 1);
    engine.toggle();
    assert!(engine.is_playing());
}

#[test]
fn set_trajectory_emits_even_while_paused() {
    let (mut engine, collected) = engine_with_collector("crossing");
    collected.borrow_mut().clear();
    engine.set_trajectory("2").expect("select");
    assert_eq!(engine.frame_index(), 0);
    let events = collected.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        ReplayEvent::FrameChanged { frame } if frame.x == -2.0
    ));
    assert!(matches!(
        &events[1],
        ReplayEvent::TrajectoryChanged { trajectory } if trajectory.as_str() == "2"
    ));
}

#[test]
fn set_trajectory_unknown_id_changes_nothing() {
    let (mut engine, collected) = engine_with_collector("crossing");
    collected.borrow_mut().clear();
    assert!(engine.set_trajectory("99").is_err());
    assert!(collected.borrow().is_empty());
    assert_eq!(engine.current_trajectory_id().map(|id| id.as_str()), Some("1"));
}

#[test]
fn looping_wraps_to_next_trajectory_with_one_switch_event() {
    let (mut engine, collected) = engine_with_collector("crossing");
    engine.play();
    engine.update(0.11); // frame 1
    engine.update(0.11); // frame 2 (last of trajectory "1")
    assert_eq!(engine.frame_index(), 2);

    collected.borrow_mut().clear();
    engine.update(0.11); // wraps to trajectory "2"
    assert_eq!(engine.current_trajectory_id().map(|id| id.as_str()), Some("2"));
    assert_eq!(engine.frame_index(), 0);
    assert_eq!(trajectory_changes_to(&collected, "2"), 1);
    assert!(engine.is_playing());

    let events = collected.borrow();
    assert!(matches!(
        &events[0],
        ReplayEvent::FrameChanged { frame } if frame.x == -2.0
    ));
}

#[test]
fn looping_wraps_from_last_trajectory_to_first() {
    let (mut engine, collected) = engine_with_collector("crossing");
    engine.set_trajectory("2").expect("select");
    engine.play();
    engine.update(0.11); // frame 1 (last of "2")
    collected.borrow_mut().clear();
    engine.update(0.11); // wraps back to "1"
    assert_eq!(engine.current_trajectory_id().map(|id| id.as_str()), Some("1"));
    assert_eq!(trajectory_changes_to(&collected, "1"), 1);
}

#[test]
fn end_without_looping_stops_and_clamps() {
    let (mut engine, collected) = engine_with_collector("crossing");
    engine.set_looping(false);
    engine.set_trajectory("2").expect("select");
    engine.play();
    engine.update(0.11);
    assert_eq!(engine.frame_index(), 1);

    collected.borrow_mut().clear();
    engine.update(0.11); // past the end
    assert!(!engine.is_playing());
    assert_eq!(engine.frame_index(), 1);
    // The clamped frame is not re-emitted.
    assert!(collected.borrow().is_empty());

    engine.update(0.11);
    assert_eq!(engine.frame_index(), 1);
}

#[test]
fn reload_via_source_path_replaces_data() {
    let (mut engine, collected) = engine_with_collector("crossing");
    collected.borrow_mut().clear();

    let dir = std::env::temp_dir().join("retrace-engine-reload-test");
    std::fs::create_dir_all(&dir).expect("tempdir");
    let path = dir.join("unsorted.json");
    std::fs::write(
        &path,
        retrace_test_fixtures::trajectory_json("unsorted-ids").expect("fixture"),
    )
    .expect("write");

    engine.set_source_path(&path).expect("reload");
    assert_eq!(engine.store().len(), 3);
    assert_eq!(engine.current_trajectory_id().map(|id| id.as_str()), Some("1"));
    assert_eq!(frame_changes(&collected), 1);

    assert!(engine
        .set_source_path(std::path::Path::new("/nonexistent/log.json"))
        .is_err());
    // Failed reload keeps the previous document.
    assert_eq!(engine.store().len(), 3);
}
