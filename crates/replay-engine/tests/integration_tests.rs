//! Integration tests for the replay engine

use netsim_replay_engine::{
    catalog, Direction, EngineSettings, EntitySnapshot, RangeRewindPolicy, ReplayEngine,
    ReplayError, SelectionBoard, SortOrder,
};
use netsim_replay_shared::{
    AppendCategoryValue, AppendLog, AppendPoint, AppendPoints, AxisRange, BoundMode, Category,
    CategoryAxis, CategorySeriesDef, ClearSeries, CollectionDef, LogStreamDef, Point,
    PointSeriesDef, Trace, TraceEvent, ValueAxis,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn axis(bound_mode: BoundMode, min: f64, max: f64) -> ValueAxis {
    ValueAxis {
        name: String::new(),
        bound_mode,
        range: AxisRange::new(min, max),
        ..Default::default()
    }
}

fn point_series(id: u32, name: &str, y_mode: BoundMode) -> PointSeriesDef {
    PointSeriesDef {
        id,
        name: name.to_string(),
        legend: String::new(),
        visible: true,
        color: None,
        x_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
        y_axis: axis(y_mode, 0.0, 10.0),
    }
}

fn state_series(id: u32, auto_advance: bool) -> CategorySeriesDef {
    CategorySeriesDef {
        id,
        name: "link state".to_string(),
        legend: String::new(),
        visible: true,
        color: None,
        x_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
        y_axis: CategoryAxis {
            name: "state".to_string(),
            values: vec![
                Category {
                    id: 1,
                    name: "down".to_string(),
                },
                Category {
                    id: 2,
                    name: "up".to_string(),
                },
            ],
        },
        auto_advance,
        advance_interval: 100,
        advance_increment: 1.0,
    }
}

fn append(entity_id: u32, time: i64, x: f64, y: f64) -> TraceEvent {
    AppendPoint {
        entity_id,
        time,
        point: Point::new(x, y),
    }
    .into()
}

fn category(entity_id: u32, time: i64, value: f64, category: u32) -> TraceEvent {
    AppendCategoryValue {
        entity_id,
        time,
        value,
        category,
    }
    .into()
}

fn log_line(entity_id: u32, time: i64, text: &str) -> TraceEvent {
    AppendLog {
        entity_id,
        time,
        text: text.to_string(),
    }
    .into()
}

/// Two tracked flows in a collection, a link state series and two node logs
fn mixed_trace() -> Trace {
    Trace {
        point_series: vec![
            point_series(1, "cwnd", BoundMode::TrackHighest),
            point_series(2, "rtt", BoundMode::Fixed),
        ],
        category_series: vec![state_series(3, true)],
        collections: vec![CollectionDef {
            id: 10,
            name: "flows".to_string(),
            members: vec![1, 2],
            x_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
            y_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
        }],
        log_streams: vec![
            LogStreamDef {
                id: 20,
                name: "Node 0".to_string(),
                visible: true,
                color: None,
            },
            LogStreamDef {
                id: 21,
                name: "Node 1".to_string(),
                visible: true,
                color: None,
            },
        ],
        events: vec![
            category(3, 0, 0.0, 2),
            append(1, 10, 1.0, 4.0),
            log_line(20, 15, "flow started\n"),
            append(2, 20, 2.0, 30.0),
            AppendPoints {
                entity_id: 1,
                time: 40,
                points: vec![Point::new(3.0, 12.0), Point::new(4.0, 18.0)],
            }
            .into(),
            log_line(21, 60, "loss detected\nretransmitting\n"),
            category(3, 150, 5.0, 1),
            ClearSeries {
                entity_id: 2,
                time: 180,
            }
            .into(),
            append(2, 220, 6.0, 3.0),
            append(1, 320, 7.0, 40.0),
            log_line(20, 400, "flow finished\n"),
        ],
    }
}

fn settings(rewind: RangeRewindPolicy) -> EngineSettings {
    EngineSettings {
        range_rewind: rewind,
        ..Default::default()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_scenario_a_monotone_range_survives_rewind() {
    init_logging();
    let trace = Trace {
        point_series: vec![point_series(1, "cwnd", BoundMode::TrackHighest)],
        events: vec![append(1, 5, 1.0, 15.0)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();

    engine.set_time(5).unwrap();
    let series = engine.registry().point_series(1).unwrap();
    assert_eq!(series.samples(), &[Point::new(1.0, 15.0)]);
    assert!(close(series.y_range().min, 0.0));
    assert!(close(series.y_range().max, 15.75));

    let report = engine.set_time(0).unwrap();
    assert_eq!(report.direction, Direction::Backward);
    assert_eq!(report.inverted, 1);

    let series = engine.registry().point_series(1).unwrap();
    assert!(series.samples().is_empty());
    assert!(close(series.y_range().max, 15.75));
}

#[test]
fn test_scenario_b_one_synthetic_per_interval() {
    init_logging();
    let trace = Trace {
        category_series: vec![state_series(3, true)],
        events: vec![category(3, 0, 0.0, 2)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();
    engine.set_time(0).unwrap();

    let report = engine.set_time(250).unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.synthesized, 2);

    let series = engine.registry().category_series(3).unwrap();
    let samples: Vec<(f64, u32)> = series.samples().iter().map(|s| (s.x, s.category)).collect();
    assert_eq!(samples, vec![(0.0, 2), (1.0, 2), (2.0, 2)]);
    assert_eq!(series.last_updated(), 200);
    assert_eq!(series.current_category_name(), Some("up"));

    let records: Vec<i64> = engine.undo_stack().iter().map(|r| r.time()).collect();
    assert_eq!(records, vec![0, 100, 200]);

    // Same call again coasts no further
    assert!(engine.set_time(250).unwrap().is_noop());
}

#[test]
fn test_scenario_b_rewind_discards_synthetic() {
    init_logging();
    let trace = Trace {
        category_series: vec![state_series(3, true)],
        events: vec![category(3, 0, 0.0, 2)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();
    engine.set_time(250).unwrap();

    let report = engine.set_time(150).unwrap();
    assert_eq!(report.discarded_synthetic, 1);
    assert_eq!(report.inverted, 0);
    assert_eq!(engine.pending_events(), 0);

    let series = engine.registry().category_series(3).unwrap();
    assert_eq!(series.samples().len(), 2);
    assert_eq!(series.last_updated(), 100);

    // Coasting resumes from the restored update time
    engine.set_time(300).unwrap();
    let series = engine.registry().category_series(3).unwrap();
    assert_eq!(series.samples().len(), 4);
    assert_eq!(series.last_updated(), 300);
}

#[test]
fn test_synthetic_events_can_be_disabled() {
    let trace = Trace {
        category_series: vec![state_series(3, true)],
        events: vec![category(3, 0, 0.0, 2)],
        ..Default::default()
    };
    let settings = EngineSettings {
        synthetic_events: false,
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, settings).unwrap();

    let report = engine.set_time(1_000).unwrap();
    assert_eq!(report.synthesized, 0);
    assert_eq!(engine.registry().category_series(3).unwrap().samples().len(), 1);
}

#[test]
fn test_recorded_event_resets_idle_clock() {
    let trace = Trace {
        category_series: vec![state_series(3, true)],
        events: vec![category(3, 0, 0.0, 2), category(3, 100, 5.0, 1)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();

    // The recorded sample at 100 wins the tie with the keep-alive due at 100
    let report = engine.set_time(199).unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.synthesized, 0);

    engine.set_time(200).unwrap();
    let last = *engine.registry().category_series(3).unwrap().samples().last().unwrap();
    assert_eq!((last.x, last.category), (6.0, 1));
}

#[test]
fn test_scenario_c_collection_widens_for_fixed_member() {
    init_logging();
    let trace = Trace {
        point_series: vec![
            point_series(1, "a", BoundMode::Fixed),
            point_series(2, "b", BoundMode::Fixed),
        ],
        collections: vec![CollectionDef {
            id: 10,
            name: "a+b".to_string(),
            members: vec![1, 2],
            x_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
            y_axis: axis(BoundMode::TrackHighest, 0.0, 10.0),
        }],
        events: vec![append(1, 5, 1.0, 20.0)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();
    engine.set_time(5).unwrap();

    let member = engine.registry().point_series(1).unwrap();
    assert_eq!(member.y_range(), AxisRange::new(0.0, 10.0));

    let collection = engine.registry().collection(10).unwrap();
    assert!(close(collection.y_range().max, 21.0));
    assert_eq!(collection.x_range(), AxisRange::new(0.0, 10.0));
}

#[test]
fn test_scenario_d_clear_restores_original_samples() {
    init_logging();
    let trace = Trace {
        point_series: vec![point_series(1, "cwnd", BoundMode::TrackHighest)],
        events: vec![
            append(1, 1, 1.0, 3.0),
            append(1, 2, 2.0, 1.0),
            append(1, 3, 3.0, 2.0),
            ClearSeries {
                entity_id: 1,
                time: 4,
            }
            .into(),
        ],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();

    engine.set_time(4).unwrap();
    assert!(engine.registry().point_series(1).unwrap().samples().is_empty());

    engine.set_time(3).unwrap();
    assert_eq!(
        engine.registry().point_series(1).unwrap().samples(),
        &[
            Point::new(1.0, 3.0),
            Point::new(2.0, 1.0),
            Point::new(3.0, 2.0)
        ]
    );
}

#[test]
fn test_idempotent_set_time() {
    let mut engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();
    engine.set_time(180).unwrap();
    let before = engine.snapshot();

    let report = engine.set_time(180).unwrap();
    assert!(report.is_noop());
    assert_eq!(report.direction, Direction::Forward);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_empty_drains_are_not_errors() {
    let mut engine = ReplayEngine::load(Trace::default(), EngineSettings::default()).unwrap();
    assert!(engine.set_time(100).unwrap().is_noop());
    assert!(engine.set_time(-100).unwrap().is_noop());
    assert_eq!(engine.current_time(), -100);
}

#[test]
fn test_conservation_across_scrubbing() {
    let mut engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();
    let total = engine.total_events();
    assert_eq!(total, 11);

    for time in [0, 45, 10, 400, 199, 60, -5, 1_000, 150, 150, 0] {
        engine.set_time(time).unwrap();
        assert_eq!(
            engine.pending_events() + engine.applied_events(),
            total,
            "conservation broken at {}",
            time
        );

        // Pending and applied are split by the cursor, so no event is in both
        assert!(engine.forward_queue().iter().all(|e| e.time() > time));
        assert!(engine.undo_stack().iter().all(|r| r.time() <= time));
    }
}

#[test]
fn test_undo_stack_stays_time_ordered() {
    let mut engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();
    engine.set_time(120).unwrap();
    engine.set_time(500).unwrap();

    let times: Vec<i64> = engine.undo_stack().iter().map(|r| r.time()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let report = engine.set_time(0).unwrap();
    assert_eq!(report.inverted, engine.total_events() - 1);
    let queued: Vec<i64> = engine.forward_queue().iter().map(TraceEvent::time).collect();
    assert!(queued.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(queued.first(), Some(&10));
}

#[test]
fn test_round_trip_exact_under_restore_policy() {
    let mut engine =
        ReplayEngine::load(mixed_trace(), settings(RangeRewindPolicy::Restore)).unwrap();

    let mut first_visits = Vec::new();
    for time in [0, 45, 150, 230, 400] {
        engine.set_time(time).unwrap();
        first_visits.push(engine.snapshot());
    }

    engine.set_time(1_000).unwrap();
    for expected in first_visits.iter().rev() {
        engine.set_time(expected.time).unwrap();
        assert_eq!(&engine.snapshot(), expected, "diverged at {}", expected.time);
    }
}

#[test]
fn test_round_trip_samples_under_monotone_policy() {
    let mut engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();
    engine.set_time(45).unwrap();
    let first = engine.snapshot();

    engine.set_time(1_000).unwrap();
    engine.set_time(45).unwrap();
    let second = engine.snapshot();

    for (before, after) in first.entities.iter().zip(&second.entities) {
        match (before, after) {
            (
                EntitySnapshot::PointSeries {
                    samples: a,
                    y_range: ra,
                    ..
                },
                EntitySnapshot::PointSeries {
                    samples: b,
                    y_range: rb,
                    ..
                },
            ) => {
                assert_eq!(a, b);
                assert!(rb.min <= ra.min && rb.max >= ra.max);
            }
            (
                EntitySnapshot::Collection { y_range: ra, .. },
                EntitySnapshot::Collection { y_range: rb, .. },
            ) => assert!(rb.max >= ra.max),
            (a, b) => {
                if let (
                    EntitySnapshot::CategorySeries { samples: sa, .. },
                    EntitySnapshot::CategorySeries { samples: sb, .. },
                ) = (a, b)
                {
                    assert_eq!(sa, sb);
                } else {
                    assert_eq!(a, b);
                }
            }
        }
    }

    // Collection saw cwnd=40 at t=320 and never shrinks
    let collection = engine.registry().collection(10).unwrap();
    assert!(close(collection.y_range().max, 42.0));
}

#[test]
fn test_log_streams_follow_cursor() {
    let mut engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();

    engine.set_time(60).unwrap();
    assert_eq!(
        engine.registry().render_unified_log(),
        "[Node 0]: flow started\n[Node 1]: loss detected\n[Node 1]: retransmitting\n"
    );

    engine.set_time(500).unwrap();
    assert_eq!(engine.registry().log_stream(20).unwrap().entries().len(), 2);

    engine.set_time(59).unwrap();
    assert_eq!(engine.registry().unified_log().len(), 1);
    assert_eq!(
        engine.registry().log_stream(20).unwrap().text(),
        "flow started\n"
    );
    assert!(engine.registry().log_stream(21).unwrap().entries().is_empty());
}

#[test]
fn test_unknown_entity_rejected_at_load() {
    init_logging();
    let mut trace = mixed_trace();
    trace.events.push(append(77, 500, 0.0, 0.0));

    let err = ReplayEngine::load(trace, EngineSettings::default()).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownEntity { id: 77, time: 500 }));
    assert!(err.is_integrity_violation());
}

#[test]
fn test_unknown_member_rejected_at_load() {
    let mut trace = mixed_trace();
    trace.collections[0].members.push(99);

    let err = ReplayEngine::load(trace, EngineSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::UnknownMember {
            collection: 10,
            member: 99
        }
    ));
}

#[test]
fn test_undefined_category_rejected_at_load() {
    let mut trace = mixed_trace();
    trace.events.push(category(3, 500, 9.0, 7));

    let err = ReplayEngine::load(trace, EngineSettings::default()).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownCategory { id: 3, category: 7 }));
}

#[test]
fn test_event_kind_mismatch_rejected_at_load() {
    let mut trace = mixed_trace();
    trace.events.push(log_line(1, 500, "not a log"));

    let err = ReplayEngine::load(trace, EngineSettings::default()).unwrap_err();
    assert!(matches!(err, ReplayError::EventKindMismatch { id: 1, .. }));
}

#[test]
fn test_selection_against_loaded_trace() {
    let engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();
    let mut board = SelectionBoard::new();
    let left = board.add_view();
    let right = board.add_view();

    board.select(engine.registry(), left, 2).unwrap();
    let cleared = board.select(engine.registry(), right, 10).unwrap();
    assert_eq!(cleared, vec![left]);

    let err = board.select(engine.registry(), left, 404).unwrap_err();
    assert!(matches!(err, ReplayError::NotFound { id: 404 }));
    assert_eq!(board.selected(right).unwrap(), Some(10));
}

#[test]
fn test_catalog_of_loaded_trace() {
    let engine = ReplayEngine::load(mixed_trace(), EngineSettings::default()).unwrap();

    let names: Vec<String> = catalog(engine.registry(), SortOrder::Alphabetical)
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["cwnd", "flows", "link state", "rtt"]);
}

#[test]
fn test_trace_loaded_from_json() {
    let json = r#"{
        "pointSeries": [{
            "id": 1,
            "name": "Throughput",
            "xAxis": {"min": 0, "max": 10},
            "yAxis": {"boundMode": "trackHighest", "min": 0, "max": 10}
        }],
        "events": [
            {"type": "appendPoint", "entityId": 1, "time": 20, "point": {"x": 2, "y": 40}},
            {"type": "appendPoint", "entityId": 1, "time": 5, "point": {"x": 1, "y": 15}}
        ]
    }"#;
    let trace = Trace::from_json_str(json).unwrap();
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();

    assert_eq!(engine.forward_queue().front_time(), Some(5));
    engine.set_time(10).unwrap();
    assert_eq!(
        engine.registry().point_series(1).unwrap().samples(),
        &[Point::new(1.0, 15.0)]
    );

    let json = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(json["pendingEvents"], 1);
    assert_eq!(json["entities"][0]["kind"], "pointSeries");
}

#[test]
fn test_demo_trace_with_demo_config() {
    init_logging();
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let config = netsim_replay_config::ReplayConfig::load(demos.join("replay.yaml")).unwrap();
    assert_eq!(config.engine.range_rewind, RangeRewindPolicy::Restore);

    let trace = Trace::from_file(demos.join("two_flows.json")).unwrap();
    let mut engine = ReplayEngine::load(trace, config.engine.clone()).unwrap();
    let initial = engine.snapshot();

    engine.set_time(5_000_000_000).unwrap();
    assert_eq!(engine.pending_events(), 0);
    assert!(engine.registry().point_series(2).unwrap().samples().is_empty());
    // Keep-alives at 1s, 2s and 3s, then 4.5s after the recorded update at 3.5s
    assert_eq!(engine.synthetic_events(), 4);

    let listings = catalog(engine.registry(), config.catalog.sort_order);
    assert_eq!(listings[0].id, 10);

    engine.set_time(-1).unwrap();
    assert_eq!(engine.applied_events(), 0);
    assert_eq!(engine.synthetic_events(), 0);
    assert_eq!(engine.snapshot().entities, initial.entities);
}

#[test]
fn test_negative_time_event_applied_on_first_rewind_target() {
    let trace = Trace {
        point_series: vec![point_series(1, "cwnd", BoundMode::TrackHighest)],
        events: vec![append(1, -20, 1.0, 5.0)],
        ..Default::default()
    };
    let mut engine = ReplayEngine::load(trace, EngineSettings::default()).unwrap();

    engine.set_time(-10).unwrap();
    let first = engine.snapshot();
    assert_eq!(engine.registry().point_series(1).unwrap().samples().len(), 1);
    assert_eq!(engine.pending_events(), 0);

    engine.set_time(100).unwrap();
    engine.set_time(-10).unwrap();
    assert_eq!(engine.snapshot(), first);

    engine.set_time(-30).unwrap();
    assert!(engine.registry().point_series(1).unwrap().samples().is_empty());
    assert_eq!(engine.pending_events(), 1);
    assert_eq!(engine.forward_queue().front().map(TraceEvent::time), Some(-20));
}
