use std::cell::RefCell;
use std::rc::Rc;

use chart_lens::ChartError;
use chart_lens::api::{
    ChartConfig, ChartController, ChartEvent, ChartEventKind, ChartEventListener, HeatMapBuilder,
};
use chart_lens::core::{DataPoint, Point, Series, Viewport};
use chart_lens::error::ChartResult;
use chart_lens::interaction::{HoverTransition, TooltipRegistry, VisualState};
use chart_lens::render::{NullRenderer, Shape};

type NullFactory = fn(Viewport) -> ChartResult<NullRenderer>;
type HeatChart = ChartController<HeatMapBuilder, NullFactory>;

fn null_factory(viewport: Viewport) -> ChartResult<NullRenderer> {
    Ok(NullRenderer::with_viewport(viewport))
}

fn mounted_heat_chart(registry: &TooltipRegistry, config: ChartConfig) -> HeatChart {
    let mut chart = ChartController::new(
        HeatMapBuilder::new().with_categories(["Mon", "Tue"], ["Morning", "Afternoon"]),
        null_factory as NullFactory,
        registry.clone(),
    );
    let points = vec![
        cell("Mon", "Morning", 22.0),
        cell("Tue", "Morning", 28.0),
        cell("Mon", "Afternoon", 38.0),
        cell("Tue", "Afternoon", 40.0),
    ];
    chart
        .render(Series::new(points).expect("valid series"), config)
        .expect("render");
    chart
}

fn cell(day: &str, slot: &str, value: f64) -> DataPoint {
    DataPoint::new()
        .with_category("x", day)
        .with_category("y", slot)
        .with_number("v", value)
}

fn hovered_primitive_count(chart: &HeatChart) -> usize {
    chart.frame().map_or(0, |frame| {
        frame
            .series()
            .iter()
            .filter(|primitive| primitive.state == VisualState::Hovered)
            .count()
    })
}

/// Center of the series-layer cell bound to `(day, slot)`.
fn cell_center(chart: &HeatChart, day: &str, slot: &str) -> (usize, Point) {
    let frame = chart.frame().expect("painted frame");
    frame
        .series()
        .iter()
        .enumerate()
        .find_map(|(index, primitive)| {
            let datum = primitive.datum.as_ref()?;
            if datum.point.text("x") != Some(day) || datum.point.text("y") != Some(slot) {
                return None;
            }
            match primitive.shape {
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => Some((index, Point::new(x + width / 2.0, y + height / 2.0))),
                _ => None,
            }
        })
        .expect("cell exists")
}

#[derive(Clone)]
struct RecordingListener {
    id: String,
    events: Rc<RefCell<Vec<ChartEvent>>>,
}

impl RecordingListener {
    fn new(id: impl Into<String>, events: Rc<RefCell<Vec<ChartEvent>>>) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }
}

impl ChartEventListener for RecordingListener {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &ChartEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[test]
fn hover_shows_formatted_tooltip_at_pointer_offset() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (index, center) = cell_center(&chart, "Mon", "Morning");

    let transition = chart.pointer_move(center).expect("pointer move");

    assert_eq!(transition, HoverTransition::Entered { index });
    let overlay = registry.overlay().expect("overlay created");
    assert_eq!(overlay.content, "Mon, Morning — Value: 22");
    assert_eq!(overlay.left, center.x + 10.0);
    assert_eq!(overlay.top, center.y - 28.0);
    assert_eq!(overlay.opacity, 1.0);
    assert_eq!(chart.hovered(), Some(index));
}

#[test]
fn hovered_primitive_uses_hover_stroke_and_repaints() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (index, center) = cell_center(&chart, "Tue", "Afternoon");

    chart.pointer_move(center).expect("pointer move");

    let frame = chart.frame().expect("frame");
    let primitive = &frame.series()[index];
    assert_eq!(primitive.state, VisualState::Hovered);
    let stroke = primitive.effective_stroke().expect("hover stroke");
    assert_eq!(stroke.width, 2.0);
    assert_eq!(stroke.color.to_hex(), "#2563eb");
    let renderer = chart.renderer().expect("renderer");
    assert_eq!(renderer.paint_count, 2);
    assert_eq!(renderer.last_hovered_count, 1);
}

#[test]
fn pointer_leave_hides_tooltip_but_keeps_node() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (index, center) = cell_center(&chart, "Mon", "Morning");
    chart.pointer_move(center).expect("enter");

    let transition = chart.pointer_leave().expect("leave");

    assert_eq!(transition, HoverTransition::Left { index });
    let overlay = registry.overlay().expect("node retained");
    assert_eq!(overlay.opacity, 0.0);
    assert_eq!(chart.hovered(), None);
    assert_eq!(
        chart.frame().expect("frame").series()[index].state,
        VisualState::Default
    );
}

#[test]
fn moving_between_cells_switches_hover_and_rewrites_content() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (from, mon) = cell_center(&chart, "Mon", "Morning");
    let (to, tue) = cell_center(&chart, "Tue", "Morning");

    chart.pointer_move(mon).expect("enter");
    let transition = chart.pointer_move(tue).expect("switch");

    assert_eq!(transition, HoverTransition::Switched { from, to });
    assert_eq!(
        registry.overlay().expect("overlay").content,
        "Tue, Morning — Value: 28"
    );
    assert_eq!(
        chart.pointer_move(tue).expect("same cell"),
        HoverTransition::Unchanged
    );
}

#[test]
fn pointer_over_margin_is_a_miss() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());

    let transition = chart.pointer_move(Point::new(2.0, 2.0)).expect("miss");

    assert_eq!(transition, HoverTransition::Unchanged);
    assert!(!registry.overlay_exists());
}

#[test]
fn pointer_enter_targets_primitive_directly() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (index, _) = cell_center(&chart, "Tue", "Afternoon");

    let transition = chart
        .pointer_enter(index, Point::new(300.0, 40.0))
        .expect("enter");

    assert_eq!(transition, HoverTransition::Entered { index });
    let overlay = registry.overlay().expect("overlay");
    assert_eq!((overlay.left, overlay.top), (310.0, 12.0));
    assert_eq!(
        chart.pointer_enter(99, Point::new(0.0, 0.0)).expect("out of range"),
        HoverTransition::Unchanged
    );
}

#[test]
fn config_template_and_offset_override_defaults() {
    let registry = TooltipRegistry::new();
    let config = ChartConfig::heat_map()
        .with_tooltip_template("{y} on {x}: {v} ({missing})")
        .with_tooltip_offset(0.0, 12.0);
    let mut chart = mounted_heat_chart(&registry, config);
    let (_, center) = cell_center(&chart, "Mon", "Afternoon");

    chart.pointer_move(center).expect("enter");

    let overlay = registry.overlay().expect("overlay");
    assert_eq!(overlay.content, "Afternoon on Mon: 38 ()");
    assert_eq!((overlay.left, overlay.top), (center.x, center.y + 12.0));
}

#[test]
fn newer_chart_preempts_tooltip_and_older_chart_reverts() {
    let registry = TooltipRegistry::new();
    let mut a = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let mut b = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (a_index, a_center) = cell_center(&a, "Mon", "Morning");
    let (b_index, b_center) = cell_center(&b, "Tue", "Afternoon");
    let events = Rc::new(RefCell::new(Vec::new()));
    a.register_listener(Box::new(RecordingListener::new("a", events.clone())))
        .expect("register");

    a.pointer_move(a_center).expect("a enters");
    b.pointer_move(b_center).expect("b enters");

    assert_eq!(a.hovered(), None);
    assert_eq!(b.hovered(), Some(b_index));
    assert_eq!(registry.owner(), Some(b.id()));
    // A reverted and repainted when B took the tooltip.
    assert_eq!(hovered_primitive_count(&a), 0);
    assert_eq!(
        a.frame().expect("frame").series()[a_index].state,
        VisualState::Default
    );
    assert_eq!(a.renderer().expect("renderer").last_hovered_count, 0);
    let kinds: Vec<_> = events.borrow().iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![ChartEventKind::Hover, ChartEventKind::Leave]);

    a.pointer_move(a_center).expect("a operates again");

    // A re-entered and took the tooltip back; B reverted in turn.
    let kinds: Vec<_> = events.borrow().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![ChartEventKind::Hover, ChartEventKind::Leave, ChartEventKind::Hover]
    );
    assert_eq!(a.hovered(), Some(a_index));
    assert_eq!(b.hovered(), None);
    assert_eq!(hovered_primitive_count(&b), 0);
}

#[test]
fn at_most_one_chart_reports_hover() {
    let registry = TooltipRegistry::new();
    let mut charts: Vec<_> = (0..3)
        .map(|_| mounted_heat_chart(&registry, ChartConfig::heat_map()))
        .collect();

    for step in 0..6 {
        let target = step % charts.len();
        let (_, center) = cell_center(&charts[target], "Mon", "Afternoon");
        charts[target].pointer_move(center).expect("enter");

        let hovered = charts
            .iter()
            .filter(|chart| chart.hovered().is_some())
            .count();
        assert_eq!(hovered, 1, "step {step}");
        let painted: usize = charts.iter().map(hovered_primitive_count).sum();
        assert_eq!(painted, 1, "step {step}");
    }
}

#[test]
fn unmounting_other_chart_leaves_active_tooltip_visible() {
    let registry = TooltipRegistry::new();
    let mut a = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let mut b = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (_, center) = cell_center(&b, "Tue", "Morning");
    b.pointer_move(center).expect("b enters");
    let before = registry.overlay().expect("overlay");

    a.unmount();

    let after = registry.overlay().expect("overlay survives");
    assert_eq!(after, before);
    assert!(after.is_visible());
    assert_eq!((after.left, after.top), (center.x + 10.0, center.y - 28.0));
    assert!(b.hovered().is_some());
}

#[test]
fn unmounting_owner_hides_and_last_unmount_destroys_overlay() {
    let registry = TooltipRegistry::new();
    let mut a = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let mut b = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (_, center) = cell_center(&a, "Mon", "Morning");
    a.pointer_move(center).expect("a enters");

    a.unmount();
    assert!(!registry.overlay().expect("node retained").is_visible());

    b.unmount();
    assert!(!registry.overlay_exists());
}

#[test]
fn update_clears_hover_and_hides_tooltip() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let (_, center) = cell_center(&chart, "Mon", "Morning");
    chart.pointer_move(center).expect("enter");

    chart
        .render(
            Series::new(vec![cell("Mon", "Morning", 90.0)]).expect("series"),
            ChartConfig::heat_map(),
        )
        .expect("update");

    assert_eq!(chart.hovered(), None);
    assert!(!registry.overlay().expect("overlay").is_visible());
    assert!(
        chart
            .frame()
            .expect("frame")
            .series()
            .iter()
            .all(|primitive| primitive.state == VisualState::Default)
    );
}

#[test]
fn listeners_receive_hover_and_leave_payloads() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let events = Rc::new(RefCell::new(Vec::new()));
    chart
        .register_listener(Box::new(RecordingListener::new("recorder", events.clone())))
        .expect("register");
    let (_, center) = cell_center(&chart, "Tue", "Morning");

    chart.pointer_move(center).expect("enter");
    chart.pointer_leave().expect("leave");

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, ChartEventKind::Hover);
    assert_eq!(events[1].kind, ChartEventKind::Leave);
    assert_eq!(events[0].chart, chart.id());
    assert_eq!(events[0].series_index, 1);
    assert_eq!(events[0].datum.number("v"), Some(28.0));
}

#[test]
fn listener_registry_rejects_empty_and_duplicate_ids() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let events = Rc::new(RefCell::new(Vec::new()));

    let err = chart
        .register_listener(Box::new(RecordingListener::new("", events.clone())))
        .expect_err("empty id");
    assert!(matches!(err, ChartError::InvalidData(_)));

    chart
        .register_listener(Box::new(RecordingListener::new("dup", events.clone())))
        .expect("first");
    let err = chart
        .register_listener(Box::new(RecordingListener::new("dup", events)))
        .expect_err("duplicate id");
    assert!(matches!(err, ChartError::InvalidData(_)));

    assert_eq!(chart.listener_count(), 1);
    assert!(chart.unregister_listener("dup"));
    assert!(!chart.unregister_listener("dup"));
    assert!(!chart.has_listener("dup"));
}

#[test]
fn unmount_detaches_listeners() {
    let registry = TooltipRegistry::new();
    let mut chart = mounted_heat_chart(&registry, ChartConfig::heat_map());
    let events = Rc::new(RefCell::new(Vec::new()));
    chart
        .register_listener(Box::new(RecordingListener::new("recorder", events)))
        .expect("register");

    chart.unmount();

    assert_eq!(chart.listener_count(), 0);
}
