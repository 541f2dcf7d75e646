use chart_lens::ChartError;
use chart_lens::api::{ChartConfig, ChartController, HeatMapBuilder, LifecycleState};
use chart_lens::core::{DataPoint, Point, Series, Viewport};
use chart_lens::error::ChartResult;
use chart_lens::interaction::{HoverTransition, TooltipRegistry};
use chart_lens::render::NullRenderer;

type NullFactory = fn(Viewport) -> ChartResult<NullRenderer>;

fn null_factory(viewport: Viewport) -> ChartResult<NullRenderer> {
    Ok(NullRenderer::with_viewport(viewport))
}

fn heat_controller(registry: &TooltipRegistry) -> ChartController<HeatMapBuilder, NullFactory> {
    ChartController::new(
        HeatMapBuilder::new(),
        null_factory as NullFactory,
        registry.clone(),
    )
}

fn engagement(morning_monday: f64) -> Series {
    let rows = [
        ("Morning", [morning_monday, 28.0, 25.0]),
        ("Evening", [65.0, 70.0, 75.0]),
    ];
    let points = rows
        .iter()
        .flat_map(|(slot, values)| {
            ["Mon", "Tue", "Wed"]
                .into_iter()
                .zip(*values)
                .map(move |(day, value)| {
                    DataPoint::new()
                        .with_category("x", day)
                        .with_category("y", *slot)
                        .with_number("v", value)
                })
        })
        .collect();
    Series::new(points).expect("valid series")
}

fn paint_count<B, F>(controller: &ChartController<B, F>) -> u64
where
    B: chart_lens::api::FrameBuilder,
    F: chart_lens::render::RendererFactory + 'static,
{
    controller
        .surface_handle()
        .and_then(|handle| controller.surfaces().paint_count(handle))
        .expect("mounted surface")
}

#[test]
fn mount_builds_paints_and_registers() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);

    chart
        .mount(engagement(22.0), ChartConfig::heat_map())
        .expect("mount");

    assert_eq!(chart.state(), LifecycleState::Ready);
    assert!(chart.is_mounted());
    assert_eq!(paint_count(&chart), 1);
    assert_eq!(chart.frame().expect("frame").series().len(), 6);
    assert!(registry.is_registered(chart.id()));
    let renderer = chart.renderer().expect("renderer");
    assert_eq!(renderer.viewport, Some(Viewport::new(800, 300)));
    assert_eq!(renderer.last_interactive_count, 6);
}

#[test]
fn empty_series_renders_blank_surface_without_error() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);

    chart
        .render(Series::empty(), ChartConfig::heat_map())
        .expect("empty render is not an error");

    assert_eq!(chart.state(), LifecycleState::Ready);
    assert!(chart.frame().is_none());
    assert_eq!(paint_count(&chart), 0);
    assert_eq!(chart.surfaces().live_count(), 1);
}

#[test]
fn empty_series_update_keeps_last_painted_state() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");
    let painted = chart.frame().map(|frame| frame.clone());

    chart
        .render(Series::empty(), ChartConfig::heat_map())
        .expect("empty update");

    assert_eq!(chart.frame().map(|frame| frame.clone()), painted);
    assert_eq!(paint_count(&chart), 1);
    assert_eq!(chart.state(), LifecycleState::Ready);
}

#[test]
fn unchanged_input_skips_repaint() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");

    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("same input");

    assert_eq!(paint_count(&chart), 1);
}

#[test]
fn changed_series_or_size_rebuilds_on_same_surface() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");
    let handle = chart.surface_handle();

    chart
        .render(engagement(40.0), ChartConfig::heat_map())
        .expect("new series");
    chart
        .render(engagement(40.0), ChartConfig::heat_map().with_size(640, 300))
        .expect("new width");

    assert_eq!(chart.surface_handle(), handle);
    assert_eq!(paint_count(&chart), 3);
    assert_eq!(chart.frame().expect("frame").viewport, Viewport::new(640, 300));
    assert_eq!(
        chart.renderer().expect("renderer").viewport,
        Some(Viewport::new(640, 300))
    );
}

#[test]
fn zero_size_mount_fails_without_leaking() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);

    let err = chart
        .mount(engagement(22.0), ChartConfig::heat_map().with_size(0, 300))
        .expect_err("zero width");

    assert!(matches!(err, ChartError::Mount { width: 0, height: 300 }));
    assert_eq!(chart.state(), LifecycleState::Unmounted);
    assert_eq!(chart.surfaces().live_count(), 0);
    assert_eq!(registry.registration_count(), 0);
    assert!(chart.surface_handle().is_none());

    chart
        .mount(engagement(22.0), ChartConfig::heat_map())
        .expect("mount after failure");
    assert_eq!(chart.state(), LifecycleState::Ready);
}

#[test]
fn build_failure_rolls_back_mount() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    let no_value = Series::new(vec![
        DataPoint::new()
            .with_category("x", "Mon")
            .with_category("y", "Morning"),
    ])
    .expect("valid series");

    let err = chart
        .mount(no_value, ChartConfig::heat_map())
        .expect_err("missing value field");

    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(chart.state(), LifecycleState::Unmounted);
    assert_eq!(chart.surfaces().live_count(), 0);
    assert_eq!(registry.registration_count(), 0);
}

#[test]
fn factory_failure_rolls_back_mount() {
    let registry = TooltipRegistry::new();
    let failing = |_viewport: Viewport| -> ChartResult<NullRenderer> {
        Err(ChartError::Backend("no display".to_owned()))
    };
    let mut chart = ChartController::new(HeatMapBuilder::new(), failing, registry.clone());

    let err = chart
        .mount(engagement(22.0), ChartConfig::heat_map())
        .expect_err("factory failure");

    assert!(matches!(err, ChartError::Backend(_)));
    assert_eq!(chart.state(), LifecycleState::Unmounted);
    assert_eq!(registry.registration_count(), 0);
}

#[test]
fn invalid_update_keeps_previous_frame() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");
    let painted = chart.frame().map(|frame| frame.clone());

    let err = chart
        .update(engagement(30.0), ChartConfig::heat_map().with_palette(Vec::new()))
        .expect_err("empty palette");

    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(chart.state(), LifecycleState::Ready);
    assert_eq!(chart.frame().map(|frame| frame.clone()), painted);
}

#[test]
fn unmount_is_idempotent_and_releases_everything() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");

    chart.unmount();
    chart.unmount();

    assert_eq!(chart.state(), LifecycleState::Unmounted);
    assert_eq!(chart.surfaces().live_count(), 0);
    assert!(chart.frame().is_none());
    assert_eq!(registry.registration_count(), 0);
}

#[test]
fn drop_unmounts() {
    let registry = TooltipRegistry::new();
    {
        let mut chart = heat_controller(&registry);
        chart
            .render(engagement(22.0), ChartConfig::heat_map())
            .expect("render");
        assert_eq!(registry.registration_count(), 1);
    }
    assert_eq!(registry.registration_count(), 0);
}

#[test]
fn remount_after_unmount_gets_fresh_surface() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);
    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render");
    let first = chart.surface_handle();
    chart.unmount();

    chart
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("render again");

    assert_ne!(chart.surface_handle(), first);
    assert_eq!(paint_count(&chart), 1);
    assert!(registry.is_registered(chart.id()));
}

#[test]
fn pointer_input_is_ignored_while_unmounted() {
    let registry = TooltipRegistry::new();
    let mut chart = heat_controller(&registry);

    let transition = chart
        .pointer_move(Point::new(100.0, 100.0))
        .expect("ignored");
    assert_eq!(transition, HoverTransition::Unchanged);
    assert_eq!(
        chart.pointer_leave().expect("ignored"),
        HoverTransition::Unchanged
    );
    assert!(!registry.overlay_exists());
}

#[test]
fn redraw_is_deterministic_across_charts() {
    let registry = TooltipRegistry::new();
    let mut first = heat_controller(&registry);
    let mut second = heat_controller(&registry);

    first
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("first");
    second
        .render(engagement(22.0), ChartConfig::heat_map())
        .expect("second");

    assert_eq!(first.frame().as_deref(), second.frame().as_deref());
}
