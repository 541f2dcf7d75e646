use chart_lens::api::{ChartConfig, FrameBuilder, HeatMapBuilder, PieChartBuilder};
use chart_lens::core::{DataPoint, FieldValue, Point, Series};
use chart_lens::interaction::{HoverTracker, hit_test};
use chart_lens::render::{Datum, Primitive, Shape, VisualState};
use proptest::prelude::*;

const DAYS: [&str; 4] = ["Mon", "Tue", "Wed", "Thu"];
const SLOTS: [&str; 3] = ["Morning", "Afternoon", "Evening"];

fn heat_series(values: &[f64]) -> Series {
    let points = SLOTS
        .iter()
        .flat_map(|slot| DAYS.iter().map(move |day| (*day, *slot)))
        .zip(values)
        .map(|((day, slot), value)| {
            DataPoint::new()
                .with_category("x", day)
                .with_category("y", slot)
                .with_number("v", *value)
        })
        .collect();
    Series::new(points).expect("valid series")
}

fn pie_series(values: &[f64]) -> Series {
    let points = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            DataPoint::new()
                .with_category("label", format!("slice-{index}"))
                .with_number("value", *value)
        })
        .collect();
    Series::new(points).expect("valid series")
}

fn rect_center(primitive: &Primitive) -> Point {
    match primitive.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            ..
        } => Point::new(x + width / 2.0, y + height / 2.0),
        ref other => panic!("expected rect, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn heat_map_build_is_deterministic(
        values in proptest::collection::vec(0.0f64..1_000.0, 12),
        width in 200u32..1_600,
        height in 120u32..900
    ) {
        let series = heat_series(&values);
        let config = ChartConfig::heat_map().with_size(width, height);
        let builder = HeatMapBuilder::new();

        let first = builder.build(&series, &config).expect("first build");
        let second = builder.build(&series, &config).expect("second build");

        prop_assert_eq!(&first, &second);
        prop_assert!(first.frame.validate().is_ok());
    }

    #[test]
    fn every_heat_cell_center_hits_its_own_cell(
        values in proptest::collection::vec(0.0f64..1_000.0, 12),
        width in 200u32..1_600,
        height in 120u32..900
    ) {
        let series = heat_series(&values);
        let config = ChartConfig::heat_map().with_size(width, height);
        let scene = HeatMapBuilder::new().build(&series, &config).expect("build");
        let cells = scene.frame.series();

        prop_assert_eq!(cells.len(), 12);
        for (index, cell) in cells.iter().enumerate() {
            prop_assert_eq!(hit_test(cells, rect_center(cell)), Some(index));
        }
    }

    #[test]
    fn pie_percents_cover_the_whole(
        values in proptest::collection::vec(0.5f64..500.0, 1..12)
    ) {
        let series = pie_series(&values);
        let scene = PieChartBuilder::new()
            .build(&series, &ChartConfig::pie_chart())
            .expect("build");

        let total: f64 = scene
            .frame
            .series()
            .iter()
            .filter_map(|primitive| primitive.datum.as_ref())
            .filter_map(|datum| match datum.context.get("percent") {
                Some(FieldValue::Number(percent)) => Some(*percent),
                _ => None,
            })
            .sum();
        let tolerance = values.len() as f64 * 0.5;
        prop_assert!((total - 100.0).abs() <= tolerance, "total {total}");
    }

    #[test]
    fn pie_points_inside_radius_hit_exactly_one_slice(
        values in proptest::collection::vec(0.5f64..500.0, 1..12),
        angle in 0.0f64..std::f64::consts::TAU,
        distance in 10.0f64..120.0
    ) {
        let series = pie_series(&values);
        let scene = PieChartBuilder::new()
            .build(&series, &ChartConfig::pie_chart())
            .expect("build");
        let slices = scene.frame.series();
        // Pie centered at (320, 150) with radius 142.
        let point = Point::new(320.0 + distance * angle.sin(), 150.0 - distance * angle.cos());

        let containing = slices
            .iter()
            .filter(|primitive| primitive.shape.contains(point))
            .count();
        prop_assert!(containing <= 2, "point {point:?} in {containing} slices");
        prop_assert!(hit_test(slices, point).is_some());
    }

    #[test]
    fn hover_tracker_keeps_at_most_one_primitive_hovered(
        targets in proptest::collection::vec(proptest::option::of(0usize..10), 1..40)
    ) {
        let mut primitives: Vec<Primitive> = (0..8)
            .map(|index| {
                let primitive = Primitive::rect(index as f64 * 10.0, 0.0, 10.0, 10.0);
                if index == 3 {
                    primitive
                } else {
                    primitive.with_datum(Datum::new(index, DataPoint::new()))
                }
            })
            .collect();
        let mut tracker = HoverTracker::default();

        for target in targets {
            tracker.update(&mut primitives, target);
            let hovered: Vec<usize> = primitives
                .iter()
                .enumerate()
                .filter(|(_, primitive)| primitive.state == VisualState::Hovered)
                .map(|(index, _)| index)
                .collect();

            prop_assert!(hovered.len() <= 1);
            prop_assert_eq!(hovered.first().copied(), tracker.hovered());
            if let Some(index) = tracker.hovered() {
                prop_assert!(primitives[index].is_interactive());
            }
        }
    }
}
