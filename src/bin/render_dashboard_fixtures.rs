use std::fs;
use std::path::PathBuf;

use chart_lens::api::{
    BarChartBuilder, ChartConfig, ChartController, ColorMode, Dataset, FrameBuilder,
    GeoMapBuilder, HeatMapBuilder, LineChartBuilder, PieChartBuilder,
};
use chart_lens::core::color::channel_palette;
use chart_lens::core::{DataPoint, GeoPolygon, GeoShape, Series, ShapeCollection};
use chart_lens::interaction::TooltipRegistry;
use chart_lens::render::SvgRenderer;

const DEFAULT_OUTPUT_ROOT: &str = "target/dashboard_fixtures";

struct CliArgs {
    output_root: PathBuf,
    only_fixture_id: Option<String>,
    color_mode: ColorMode,
    log_filter: Option<String>,
}

struct Fixture {
    id: &'static str,
    description: &'static str,
    series: Series,
    config: ChartConfig,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let _ = match args.log_filter.as_deref() {
        Some(directives) => chart_lens::telemetry::init_tracing_with_filter(directives),
        None => chart_lens::telemetry::init_default_tracing(),
    };
    fs::create_dir_all(&args.output_root).map_err(|err| {
        format!(
            "failed to create output dir `{}`: {err}",
            args.output_root.display()
        )
    })?;

    let registry = TooltipRegistry::new();
    let shapes = sample_us_states().map_err(|err| format!("sample shapes: {err}"))?;
    let mut generated_count = 0usize;

    for (fixture, builder) in fixtures(args.color_mode, shapes)? {
        if args
            .only_fixture_id
            .as_ref()
            .is_some_and(|id| id != fixture.id)
        {
            continue;
        }

        let document = render_fixture(builder, &fixture, &registry)
            .map_err(|err| format!("fixture `{}` render failed: {err}", fixture.id))?;
        let output_path = args.output_root.join(format!("{}.svg", fixture.id));
        fs::write(&output_path, document).map_err(|err| {
            format!("failed to write svg `{}`: {err}", output_path.display())
        })?;

        generated_count += 1;
        println!(
            "generated {} [{}] -> {}",
            fixture.id,
            fixture.description,
            output_path.display()
        );
    }

    println!("done: generated {generated_count} fixture svg(s)");
    Ok(())
}

fn render_fixture(
    builder: Box<dyn FrameBuilder>,
    fixture: &Fixture,
    registry: &TooltipRegistry,
) -> chart_lens::ChartResult<String> {
    let mut controller = ChartController::new(builder, SvgRenderer::factory(), registry.clone());
    controller.render(fixture.series.clone(), fixture.config.clone())?;
    let dropped = controller.diagnostics().dropped_count();
    if dropped > 0 {
        println!("  {dropped} datum(s) not painted in {}", fixture.id);
    }
    Ok(controller
        .renderer()
        .map(|renderer| renderer.document().to_owned())
        .unwrap_or_default())
}

type FixtureEntry = (Fixture, Box<dyn FrameBuilder>);

fn entry(fixture: Fixture, builder: impl FrameBuilder + 'static) -> FixtureEntry {
    (fixture, Box::new(builder))
}

fn fixtures(mode: ColorMode, shapes: ShapeCollection) -> Result<Vec<FixtureEntry>, String> {
    let series = |points: Vec<DataPoint>| Series::new(points).map_err(|err| err.to_string());

    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let engagement = [
        ("Morning", [22.0, 28.0, 25.0, 30.0, 24.0, 15.0, 12.0]),
        ("Afternoon", [38.0, 40.0, 42.0, 48.0, 40.0, 35.0, 30.0]),
        ("Evening", [65.0, 70.0, 75.0, 78.0, 68.0, 60.0, 55.0]),
    ];
    let heat_points = engagement
        .iter()
        .flat_map(|(slot, values)| {
            days.iter().zip(values).map(move |(day, value)| {
                DataPoint::new()
                    .with_category("x", *day)
                    .with_category("y", *slot)
                    .with_number("v", *value)
            })
        })
        .collect();

    let geo_points = [
        ("US-OR", 65.0),
        ("US-WA", 15.0),
        ("US-CA", 10.0),
        ("US-ID", 5.0),
        ("US-NV", 3.0),
    ]
    .into_iter()
    .map(|(id, value)| DataPoint::new().with_id("id", id).with_number("value", value))
    .collect();

    let labeled = |rows: &[(&str, f64)]| -> Vec<DataPoint> {
        rows.iter()
            .map(|(label, value)| {
                DataPoint::new()
                    .with_category("label", *label)
                    .with_number("value", *value)
            })
            .collect()
    };
    let monthly = labeled(&[
        ("Jan", 5400.0),
        ("Feb", 6200.0),
        ("Mar", 7800.0),
        ("Apr", 6800.0),
        ("May", 9200.0),
        ("Jun", 8400.0),
        ("Jul", 7900.0),
        ("Aug", 8700.0),
        ("Sep", 10200.0),
        ("Oct", 9800.0),
        ("Nov", 11500.0),
        ("Dec", 12800.0),
    ]);
    let weekly = labeled(&[
        ("Mon", 1200.0),
        ("Tue", 1800.0),
        ("Wed", 2400.0),
        ("Thu", 1900.0),
        ("Fri", 2700.0),
        ("Sat", 1600.0),
        ("Sun", 1100.0),
    ]);
    let channels = labeled(&[
        ("Website", 35000.0),
        ("Print", 28000.0),
        ("Newsletter", 15000.0),
        ("Social", 22000.0),
        ("Events", 18000.0),
        ("Podcasts", 12000.0),
    ]);
    let devices = labeled(&[("Mobile", 58.0), ("Desktop", 32.0), ("Tablet", 10.0)]);

    let months = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let revenue_2025 = [
        12500.0, 14200.0, 15800.0, 16300.0, 18500.0, 19200.0, 21000.0, 22500.0, 24100.0,
        25600.0, 27200.0, 29800.0,
    ];
    let revenue_2024 = [
        10200.0, 11500.0, 12800.0, 13900.0, 15200.0, 16800.0, 18100.0, 19500.0, 20800.0,
        22100.0, 23500.0, 25200.0,
    ];
    let revenue_trend = months
        .iter()
        .zip(revenue_2025.iter().zip(revenue_2024))
        .map(|(month, (current, previous))| {
            DataPoint::new()
                .with_category("label", *month)
                .with_number("revenue_2025", *current)
                .with_number("revenue_2024", previous)
        })
        .collect();

    let audience = [
        ("18-24", 8.0, 10.0, 2.0),
        ("25-34", 22.0, 25.0, 4.0),
        ("35-44", 18.0, 20.0, 3.0),
        ("45-54", 15.0, 14.0, 2.0),
        ("55-64", 12.0, 10.0, 1.0),
        ("65+", 8.0, 7.0, 1.0),
    ]
    .into_iter()
    .map(|(band, male, female, other)| {
        DataPoint::new()
            .with_category("label", band)
            .with_number("male", male)
            .with_number("female", female)
            .with_number("other", other)
    })
    .collect();

    Ok(vec![
        entry(
            Fixture {
                id: "engagement_heat_map",
                description: "engagement by day and time slot",
                series: series(heat_points)?,
                config: ChartConfig::heat_map().with_color_mode(mode),
            },
            HeatMapBuilder::new()
                .with_categories(days, ["Morning", "Afternoon", "Evening"]),
        ),
        entry(
            Fixture {
                id: "audience_geo_map",
                description: "audience distribution by state",
                series: series(geo_points)?,
                config: ChartConfig::geo_map().with_color_mode(mode),
            },
            GeoMapBuilder::new(shapes),
        ),
        entry(
            Fixture {
                id: "revenue_monthly_bar",
                description: "monthly revenue overview",
                series: series(monthly)?,
                config: ChartConfig::bar_chart().with_color_mode(mode),
            },
            BarChartBuilder::new(),
        ),
        entry(
            Fixture {
                id: "revenue_weekly_bar",
                description: "weekly revenue overview",
                series: series(weekly)?,
                config: ChartConfig::bar_chart().with_color_mode(mode),
            },
            BarChartBuilder::new(),
        ),
        entry(
            Fixture {
                id: "revenue_trend_line",
                description: "monthly revenue, this year against last",
                series: series(revenue_trend)?,
                config: ChartConfig::line_chart().with_color_mode(mode),
            },
            LineChartBuilder::new()
                .with_datasets(vec![
                    Dataset::new("revenue_2025", "Revenue 2025"),
                    Dataset::new("revenue_2024", "Revenue 2024"),
                ])
                .with_tick_prefix("$"),
        ),
        entry(
            Fixture {
                id: "audience_age_bar",
                description: "audience by age band and gender",
                series: series(audience)?,
                config: ChartConfig::bar_chart()
                    .with_size(800, 300)
                    .with_palette(vec![
                        channel_palette()[0],
                        channel_palette()[2],
                        channel_palette()[1],
                    ])
                    .with_color_mode(mode),
            },
            BarChartBuilder::new()
                .with_datasets(vec![
                    Dataset::new("male", "Male"),
                    Dataset::new("female", "Female"),
                    Dataset::new("other", "Other"),
                ])
                .with_corner_radius(0.0),
        ),
        entry(
            Fixture {
                id: "channel_performance_pie",
                description: "revenue share by channel",
                series: series(channels)?,
                config: ChartConfig::pie_chart().with_color_mode(mode),
            },
            PieChartBuilder::new(),
        ),
        entry(
            Fixture {
                id: "device_usage_pie",
                description: "sessions by device",
                series: series(devices)?,
                config: ChartConfig::pie_chart().with_color_mode(mode),
            },
            PieChartBuilder::new(),
        ),
    ])
}

fn sample_us_states() -> chart_lens::ChartResult<ShapeCollection> {
    let state = |id: &str, name: &str, ring: [(f64, f64); 4]| {
        GeoShape::new(id, name, vec![GeoPolygon::from_ring(ring.to_vec())])
    };
    ShapeCollection::from_shapes([
        state(
            "US-WA",
            "Washington",
            [(-125.0, 49.0), (-117.0, 49.0), (-117.0, 45.5), (-125.0, 45.5)],
        ),
        state(
            "US-OR",
            "Oregon",
            [(-125.0, 46.0), (-117.0, 46.0), (-117.0, 42.0), (-125.0, 42.0)],
        ),
        state(
            "US-CA",
            "California",
            [(-125.0, 42.0), (-114.0, 42.0), (-114.0, 32.0), (-125.0, 32.0)],
        ),
    ])
}

fn parse_args() -> Result<CliArgs, String> {
    let mut output_root = PathBuf::from(DEFAULT_OUTPUT_ROOT);
    let mut only_fixture_id: Option<String> = None;
    let mut color_mode = ColorMode::Light;
    let mut log_filter: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output-root" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output-root".to_owned())?;
                output_root = PathBuf::from(value);
            }
            "--only" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --only".to_owned())?;
                only_fixture_id = Some(value);
            }
            "--dark" => color_mode = ColorMode::Dark,
            "--log" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --log".to_owned())?;
                log_filter = Some(value);
            }
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`\n\n{}", usage_message()));
            }
        }
    }

    Ok(CliArgs {
        output_root,
        only_fixture_id,
        color_mode,
        log_filter,
    })
}

fn usage_message() -> String {
    format!(
        "Usage: cargo run --bin render_dashboard_fixtures -- [options]\n\nOptions:\n  --output-root <path>   Output directory (default: {DEFAULT_OUTPUT_ROOT})\n  --only <fixture-id>    Render a single fixture by id\n  --dark                 Use the dark color mode\n  --log <directives>     Tracing filter, e.g. `debug` (default: RUST_LOG or info)\n  -h, --help             Show this message"
    )
}
