//! Demonstration session driving the tracker against mock sensors

use qibla_compass::{
    CompassConfig, GeoCoordinate, HeadingReference, MockHeadingSource, MockPositionProvider,
    QiblaTracker, RetryPolicy, RotationFormatter, TextFormatter,
};

fn main() {
    println!("Qibla Compass Core Demonstration");
    println!("================================\n");

    // A device in London with a magnetic compass (declination ~0.3°E)
    let config = CompassConfig {
        position_timeout_ms: 8_000,
        retry: RetryPolicy::new(2, 250),
        magnetic_declination_deg: 0.3,
        ..Default::default()
    };

    let provider = MockPositionProvider::with_fix(GeoCoordinate::new(51.5074, -0.1278));
    let source = MockHeadingSource::new().with_reference(HeadingReference::MagneticNorth);

    let mut tracker = match QiblaTracker::new(config, provider, source) {
        Ok(tracker) => tracker,
        Err(e) => {
            eprintln!("tracker setup failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Acquiring position...");
    let formatter = TextFormatter::new();
    if let Err(e) = tracker.start() {
        println!("{}", formatter.format_unavailable(&e));
        std::process::exit(1);
    }

    println!(
        "Position fixed. Bearing to the Kaaba: {:.2}°, distance {:.0} km\n",
        tracker.bearing().unwrap_or(0.0),
        tracker.distance_km().unwrap_or(0.0),
    );

    tracker.register_callback(Box::new(move |update| {
        println!("{}", TextFormatter::new().format_update(update));
    }));

    // Simulate the user turning in place; one blank event in the middle
    // exercises the "no update" path
    let sweep = [0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0];
    for (i, heading) in sweep.iter().enumerate() {
        if i == 3 {
            tracker.heading_source_mut().push_blank();
        }
        tracker.heading_source_mut().push_heading(*heading);
    }

    if let Err(e) = tracker.pump() {
        eprintln!("pump failed: {}", e);
    }

    let stats = tracker.stats();
    println!(
        "\nSession: {} events, {} skipped, {} updates published",
        stats.events_received, stats.events_skipped, stats.updates_published
    );

    tracker.shutdown();
    println!("Tracker shut down.");
}
