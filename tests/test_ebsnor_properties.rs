//! Behavioural tests for the EBSnoR filter
//!
//! Hand-built scenes covering isolation, matching, the window variants,
//! the ablation switches and the ordering guarantees of the output.

use ebsnor::ev_core::{Event, Events, NEGATIVE, POSITIVE};
use ebsnor::ev_filtering::{
    classify_snow_events, filter_snow, CameraDims, EbsnorConfig, EbsnorFilter,
};
use ebsnor::ev_simulation::{generate_snowfall, SnowfallConfig};

const THRESHOLD: u64 = 10_000;

fn config() -> EbsnorConfig {
    EbsnorConfig::new(THRESHOLD, CameraDims::new(64, 64))
}

/// True when `subset` appears in `full` in the same relative order
fn is_stable_subsequence(full: &[Event], subset: &[Event]) -> bool {
    let mut remaining = full.iter();
    subset
        .iter()
        .all(|wanted| remaining.any(|candidate| candidate == wanted))
}

#[test]
fn test_single_flake_is_removed() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(5, 5, 50, POSITIVE),
        Event::new(5, 5, 200, NEGATIVE),
    ];

    let classification = classify_snow_events(&events, &config()).unwrap();
    assert_eq!(classification.is_isolated, vec![true, false, true]);
    assert_eq!(classification.trailing_links.get(0), &[1]);
    assert_eq!(classification.is_snow, vec![true, true, true]);

    assert!(filter_snow(&events, &config()).unwrap().is_empty());
}

#[test]
fn test_isolation_rules() {
    let events = vec![
        // First event at the pixel, then a quick repeat
        Event::new(3, 3, 0, POSITIVE),
        Event::new(3, 3, 100, POSITIVE),
        // Long gap
        Event::new(3, 3, 100 + THRESHOLD + 1, POSITIVE),
        // Polarity change, then a quick repeat
        Event::new(3, 3, 20_200, NEGATIVE),
        Event::new(3, 3, 20_210, NEGATIVE),
        // Other pixel
        Event::new(4, 3, 20_220, NEGATIVE),
    ];

    let classification = classify_snow_events(&events, &config()).unwrap();
    assert_eq!(
        classification.is_isolated,
        vec![true, false, true, true, false, true]
    );
    assert_eq!(classification.trailing_links.get(0), &[1]);
    assert_eq!(classification.trailing_links.get(3), &[4]);
    assert!(classification.trailing_links.get(2).is_empty());
}

#[test]
fn test_gap_equal_to_threshold_is_trailing() {
    let events = vec![
        Event::new(1, 1, 0, POSITIVE),
        Event::new(1, 1, THRESHOLD, POSITIVE),
    ];
    let classification = classify_snow_events(&events, &config()).unwrap();
    assert_eq!(classification.is_isolated, vec![true, false]);
}

#[test]
fn test_time_window_is_strict() {
    let late = vec![
        Event::new(2, 2, 0, POSITIVE),
        Event::new(2, 2, THRESHOLD, NEGATIVE),
    ];
    assert_eq!(filter_snow(&late, &config()).unwrap(), late);

    let in_time = vec![
        Event::new(2, 2, 0, POSITIVE),
        Event::new(2, 2, THRESHOLD - 1, NEGATIVE),
    ];
    assert!(filter_snow(&in_time, &config()).unwrap().is_empty());
}

#[test]
fn test_negative_before_positive_is_kept() {
    let events = vec![
        Event::new(7, 7, 0, NEGATIVE),
        Event::new(7, 7, 100, POSITIVE),
    ];
    assert_eq!(filter_snow(&events, &config()).unwrap(), events);
}

#[test]
fn test_per_pixel_mode_ignores_neighbours() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(6, 5, 10, NEGATIVE),
    ];
    assert_eq!(filter_snow(&events, &config()).unwrap(), events);

    let windowed = config().with_spatial_window_radius(1);
    assert!(filter_snow(&events, &windowed).unwrap().is_empty());
}

#[test]
fn test_window_radius_bounds_matches() {
    let events = vec![
        Event::new(10, 10, 0, POSITIVE),
        Event::new(13, 10, 10, NEGATIVE),
    ];
    let radius_two = config().with_spatial_window_radius(2);
    assert_eq!(filter_snow(&events, &radius_two).unwrap().len(), 2);

    let radius_three = config().with_spatial_window_radius(3);
    assert!(filter_snow(&events, &radius_three).unwrap().is_empty());
}

#[test]
fn test_adaptive_window_prefers_same_cell() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(6, 5, 5, POSITIVE),
        Event::new(5, 5, 10, NEGATIVE),
    ];

    let full = config().with_spatial_window_radius(1);
    let classification = classify_snow_events(&events, &full).unwrap();
    assert_eq!(classification.is_snow, vec![true, true, true]);

    let adaptive = full.with_adaptive_window(true);
    let classification = classify_snow_events(&events, &adaptive).unwrap();
    assert_eq!(classification.is_snow, vec![true, false, true]);
}

#[test]
fn test_adaptive_window_falls_back_to_neighbours() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(6, 6, 10, NEGATIVE),
    ];
    let adaptive = config()
        .with_spatial_window_radius(1)
        .with_adaptive_window(true);
    assert!(filter_snow(&events, &adaptive).unwrap().is_empty());
}

#[test]
fn test_sensor_edges_with_window() {
    let config = config().with_spatial_window_radius(2);
    let events = vec![
        Event::new(0, 0, 0, POSITIVE),
        Event::new(1, 0, 10, NEGATIVE),
        Event::new(63, 63, 20, POSITIVE),
        Event::new(62, 63, 30, NEGATIVE),
    ];
    assert!(filter_snow(&events, &config).unwrap().is_empty());
}

#[test]
fn test_trailing_cap() {
    let events = vec![
        Event::new(8, 8, 0, POSITIVE),
        Event::new(8, 8, 10, POSITIVE),
        Event::new(8, 8, 20, POSITIVE),
        Event::new(8, 8, 30, POSITIVE),
        Event::new(8, 8, 40, NEGATIVE),
    ];
    let config = config().with_te_depth(2);

    let classification = classify_snow_events(&events, &config).unwrap();
    assert_eq!(classification.trailing_links.get(0), &[1, 2]);
    assert!(!classification.is_isolated[3]);

    // The repeat beyond the cap is never reached by propagation
    let filtered = filter_snow(&events, &config).unwrap();
    assert_eq!(filtered, vec![Event::new(8, 8, 30, POSITIVE)]);
}

#[test]
fn test_without_label_propagation() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(5, 5, 50, POSITIVE),
        Event::new(5, 5, 200, NEGATIVE),
        Event::new(5, 5, 210, NEGATIVE),
    ];
    let config = config().with_label_propagation(false);
    let filtered = filter_snow(&events, &config).unwrap();
    assert_eq!(
        filtered,
        vec![Event::new(5, 5, 50, POSITIVE), Event::new(5, 5, 210, NEGATIVE)]
    );
}

#[test]
fn test_without_isolation_filter() {
    let events = vec![
        Event::new(5, 5, 0, POSITIVE),
        Event::new(5, 5, 50, POSITIVE),
        Event::new(5, 5, 200, NEGATIVE),
    ];
    let config = config().with_isolation_filter(false);

    let classification = classify_snow_events(&events, &config).unwrap();
    assert_eq!(classification.isolated_count(), 3);
    assert!(classification.trailing_links.get(0).is_empty());

    // Only the most recent positive at the cell is remembered
    let filtered = filter_snow(&events, &config).unwrap();
    assert_eq!(filtered, vec![Event::new(5, 5, 0, POSITIVE)]);
}

#[test]
fn test_clean_scene_passes_unchanged() {
    let events = vec![
        Event::new(1, 1, 0, NEGATIVE),
        Event::new(1, 1, 20, NEGATIVE),
        Event::new(9, 4, 40, POSITIVE),
        Event::new(1, 1, 60, POSITIVE),
        Event::new(30, 30, 80, NEGATIVE),
        Event::new(9, 4, 20_000, NEGATIVE),
    ];
    let config = config().with_spatial_window_radius(1);
    let mut filter = EbsnorFilter::new(config.clone()).unwrap();

    let mut once = filter.process(&events).unwrap();
    config.restore_coordinates(&mut once);
    assert_eq!(once, events);

    let mut twice = filter.process(&once).unwrap();
    config.restore_coordinates(&mut twice);
    assert_eq!(twice, once);
}

#[test]
fn test_filtered_snowfall_is_idempotent() {
    let sensor = CameraDims::new(640, 480);

    for seed in 0..5 {
        let snowfall = SnowfallConfig::new(sensor, 10_000_000)
            .with_flakes(200)
            .with_background(2_000)
            .with_seed(seed);
        let batch = generate_snowfall(&snowfall).unwrap();

        for radius in 0..3 {
            for adaptive in [false, true] {
                let config = config()
                    .with_camera_dimensions(sensor)
                    .with_time_threshold(1_000)
                    .with_spatial_window_radius(radius)
                    .with_adaptive_window(adaptive);

                let mut once = filter_snow(&batch.events, &config).unwrap();
                config.restore_coordinates(&mut once);
                assert!(once.len() < batch.len(), "nothing removed: {}", config.description());

                // Removing snow must not expose new snow
                let rerun = classify_snow_events(&once, &config).unwrap();
                assert_eq!(rerun.snow_count(), 0, "seed {seed}: {}", config.description());
            }
        }
    }
}

#[test]
fn test_output_is_ordered_subsequence() {
    let snowfall = SnowfallConfig::new(CameraDims::new(64, 64), 200_000)
        .with_flakes(300)
        .with_background(2_000)
        .with_seed(11);
    let batch = generate_snowfall(&snowfall).unwrap();

    for radius in 0..3 {
        let config = config()
            .with_time_threshold(1_000)
            .with_spatial_window_radius(radius);
        let mut filtered: Events = filter_snow(&batch.events, &config).unwrap();
        config.restore_coordinates(&mut filtered);

        assert!(filtered.len() <= batch.events.len());
        assert!(is_stable_subsequence(&batch.events, &filtered));
    }
}

#[test]
fn test_output_matches_classification() {
    let batch = generate_snowfall(
        &SnowfallConfig::new(CameraDims::new(64, 64), 100_000)
            .with_flakes(100)
            .with_background(500)
            .with_seed(3),
    )
    .unwrap();
    let config = config().with_time_threshold(1_000);

    let classification = classify_snow_events(&batch.events, &config).unwrap();
    let filtered = filter_snow(&batch.events, &config).unwrap();
    assert_eq!(filtered.len(), batch.len() - classification.snow_count());

    let kept: Events = batch
        .events
        .iter()
        .zip(&classification.is_snow)
        .filter(|&(_, &snow)| !snow)
        .map(|(event, _)| *event)
        .collect();
    assert_eq!(filtered, kept);
}
