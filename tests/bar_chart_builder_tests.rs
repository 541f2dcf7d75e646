use approx::assert_relative_eq;
use chart_lens::ChartError;
use chart_lens::api::{
    BAR_CHART_TOOLTIP, BarChartBuilder, ChartConfig, Dataset, FrameBuilder,
    GROUPED_BAR_CHART_TOOLTIP, format_tooltip, primary_gradient,
};
use chart_lens::core::color::channel_palette;
use chart_lens::core::{Color, DataPoint, Series};
use chart_lens::render::{Fill, LayerKind, Primitive, Shape};

fn quarter(label: &str, value: f64) -> DataPoint {
    DataPoint::new()
        .with_category("label", label)
        .with_number("value", value)
}

fn quarterly() -> Series {
    Series::new(vec![
        quarter("Q1", 3200.0),
        quarter("Q2", 6400.0),
        quarter("Q3", 9600.0),
        quarter("Q4", 12800.0),
    ])
    .expect("valid series")
}

fn bar_geometry(primitive: &Primitive) -> (f64, f64, f64, f64, f64) {
    match primitive.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        } => (x, y, width, height, corner_radius),
        ref other => panic!("expected rect, got {other:?}"),
    }
}

fn texts(primitives: &[Primitive]) -> Vec<&str> {
    primitives
        .iter()
        .filter_map(|primitive| match &primitive.shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn bars_spread_edge_to_edge_with_fixed_width() {
    let scene = BarChartBuilder::new()
        .build(&quarterly(), &ChartConfig::bar_chart())
        .expect("build");
    let bars = scene.frame.series();
    assert_eq!(bars.len(), 4);

    // 760 x 208 plot at (40, 8).
    let (first_x, _, width, _, radius) = bar_geometry(&bars[0]);
    assert_relative_eq!(first_x, 40.0);
    assert_relative_eq!(width, 60.8, epsilon = 1e-9);
    assert_relative_eq!(radius, 6.0);

    let (last_x, _, last_width, _, _) = bar_geometry(&bars[3]);
    assert_relative_eq!(last_x + last_width, 800.0, epsilon = 1e-9);

    let (second_x, _, _, _, _) = bar_geometry(&bars[1]);
    let (third_x, _, _, _, _) = bar_geometry(&bars[2]);
    assert_relative_eq!(second_x - first_x, third_x - second_x, epsilon = 1e-9);
}

#[test]
fn bar_heights_scale_from_zero_to_max() {
    let scene = BarChartBuilder::new()
        .build(&quarterly(), &ChartConfig::bar_chart())
        .expect("build");
    let bars = scene.frame.series();

    let (_, q1_y, _, q1_height, _) = bar_geometry(&bars[0]);
    assert_relative_eq!(q1_height, 52.0, epsilon = 1e-9);
    assert_relative_eq!(q1_y, 164.0, epsilon = 1e-9);

    let (_, q4_y, _, q4_height, _) = bar_geometry(&bars[3]);
    assert_relative_eq!(q4_y, 8.0, epsilon = 1e-9);
    assert_relative_eq!(q4_height, 208.0, epsilon = 1e-9);
}

#[test]
fn grid_and_value_labels_split_domain_in_quarters() {
    let scene = BarChartBuilder::new()
        .build(&quarterly(), &ChartConfig::bar_chart())
        .expect("build");

    assert_eq!(scene.frame.layer(LayerKind::Grid).len(), 4);
    assert_eq!(
        texts(scene.frame.layer(LayerKind::Axis)),
        vec!["0", "3200", "6400", "9600", "12800", "Q1", "Q2", "Q3", "Q4"]
    );
}

#[test]
fn palette_drives_bar_fill() {
    let gradient = BarChartBuilder::new()
        .build(&quarterly(), &ChartConfig::bar_chart())
        .expect("gradient build");
    match &gradient.frame.series()[0].fill {
        Fill::HorizontalGradient(stops) => {
            let colors: Vec<Color> = stops.iter().map(|stop| stop.color).collect();
            assert_eq!(colors, primary_gradient());
            assert_eq!(stops[1].offset, 1.0);
        }
        other => panic!("expected gradient, got {other:?}"),
    }

    let teal = Color::from_hex("#14b8a6").expect("hex");
    let solid = BarChartBuilder::new()
        .build(
            &quarterly(),
            &ChartConfig::bar_chart().with_palette(vec![teal]),
        )
        .expect("solid build");
    assert_eq!(solid.frame.series()[0].fill, Fill::Solid(teal));
}

#[test]
fn negative_values_clamp_to_baseline() {
    let series = Series::new(vec![quarter("Up", 10.0), quarter("Down", -5.0)])
        .expect("valid series");

    let scene = BarChartBuilder::new()
        .build(&series, &ChartConfig::bar_chart())
        .expect("build");

    let (_, y, _, height, _) = bar_geometry(&scene.frame.series()[1]);
    assert_relative_eq!(height, 0.0);
    assert_relative_eq!(y, 216.0);
    assert_eq!(scene.diagnostics.dropped_count(), 0);
}

#[test]
fn all_zero_series_falls_back_to_default_domain() {
    let series = Series::new(vec![quarter("Q1", 0.0), quarter("Q2", 0.0)])
        .expect("valid series");

    let scene = BarChartBuilder::new()
        .build(&series, &ChartConfig::bar_chart())
        .expect("build");

    assert!(scene.diagnostics.used_default_domain);
    assert_eq!(
        &texts(scene.frame.layer(LayerKind::Axis))[..5],
        &["0", "25", "50", "75", "100"]
    );
}

#[test]
fn bars_bind_tooltip_fields() {
    let scene = BarChartBuilder::new()
        .build(&quarterly(), &ChartConfig::bar_chart())
        .expect("build");

    let datum = scene.frame.series()[0].datum.as_ref().expect("datum");
    assert_eq!(format_tooltip(BAR_CHART_TOOLTIP, datum), "Q1 — Value: 3200");
    assert!(scene.frame.series()[0].stroke.is_none());
    assert!(scene.frame.series()[0].hover_stroke.is_some());
}

#[test]
fn single_bar_starts_at_left_margin() {
    let series = Series::new(vec![quarter("Only", 5.0)]).expect("valid series");

    let scene = BarChartBuilder::new()
        .build(&series, &ChartConfig::bar_chart())
        .expect("build");

    let (x, y, _, height, _) = bar_geometry(&scene.frame.series()[0]);
    assert_relative_eq!(x, 40.0);
    assert_relative_eq!(y, 8.0);
    assert_relative_eq!(height, 208.0);
}

#[test]
fn numeric_label_field_is_rejected() {
    let series = Series::new(vec![
        DataPoint::new()
            .with_number("label", 1.0)
            .with_number("value", 2.0),
    ])
    .expect("valid series");

    let err = BarChartBuilder::new()
        .build(&series, &ChartConfig::bar_chart())
        .expect_err("numeric label");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

fn age_band(label: &str, male: f64, female: f64, other: f64) -> DataPoint {
    DataPoint::new()
        .with_category("label", label)
        .with_number("male", male)
        .with_number("female", female)
        .with_number("other", other)
}

fn audience_chart() -> BarChartBuilder {
    BarChartBuilder::new().with_datasets(vec![
        Dataset::new("male", "Male"),
        Dataset::new("female", "Female"),
        Dataset::new("other", "Other"),
    ])
}

fn audience() -> Series {
    Series::new(vec![
        age_band("18-24", 8.0, 10.0, 2.0),
        age_band("25-34", 22.0, 25.0, 4.0),
    ])
    .expect("valid series")
}

#[test]
fn datasets_group_bars_per_label() {
    let config = ChartConfig::bar_chart().with_palette(channel_palette());
    let scene = audience_chart().build(&audience(), &config).expect("build");
    let bars = scene.frame.series();
    assert_eq!(bars.len(), 6);

    // 760 x 180 plot at (40, 36) below the legend; 380 px slots, 80% groups.
    let (x, _, width, _, _) = bar_geometry(&bars[0]);
    assert_relative_eq!(x, 78.0, epsilon = 1e-9);
    assert_relative_eq!(width, 304.0 / 3.0, epsilon = 1e-9);
    let (second_group_female, y, _, height, _) = bar_geometry(&bars[4]);
    assert_relative_eq!(second_group_female, 420.0 + 38.0 + 304.0 / 3.0, epsilon = 1e-9);
    // Domain rounds 25 up to 32.
    assert_relative_eq!(y, 75.375, epsilon = 1e-9);
    assert_relative_eq!(y + height, 216.0, epsilon = 1e-9);

    assert_eq!(bars[1].fill, Fill::Solid(config.palette[1]));
    assert_eq!(bars[5].fill, Fill::Solid(config.palette[2]));
}

#[test]
fn grouped_bars_carry_legend_axis_and_dataset_tooltips() {
    let builder = audience_chart();
    let scene = builder
        .build(&audience(), &ChartConfig::bar_chart())
        .expect("build");

    assert_eq!(
        texts(scene.frame.layer(LayerKind::Legend)),
        vec!["Male", "Female", "Other"]
    );
    assert_eq!(
        texts(scene.frame.layer(LayerKind::Axis)),
        vec!["0", "8", "16", "24", "32", "18-24", "25-34"]
    );
    assert_eq!(builder.default_tooltip_template(), GROUPED_BAR_CHART_TOOLTIP);
    let datum = scene.frame.series()[4].datum.as_ref().expect("datum");
    assert_eq!(
        format_tooltip(GROUPED_BAR_CHART_TOOLTIP, datum),
        "Female — 25-34: 25"
    );
    assert_eq!(datum.series_index, 1);
}

#[test]
fn grouped_mode_rejects_non_numeric_dataset_fields() {
    let err = BarChartBuilder::new()
        .with_datasets(vec![Dataset::new("label", "Label")])
        .build(&audience(), &ChartConfig::bar_chart())
        .expect_err("category dataset");
    assert!(matches!(err, ChartError::InvalidData(_)));
}
