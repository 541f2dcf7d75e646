use std::cell::RefCell;
use std::rc::Rc;

use chart_lens::ChartError;
use chart_lens::core::{DataPoint, Viewport};
use chart_lens::error::ChartResult;
use chart_lens::render::{
    Color, Datum, LayerKind, NullRenderer, Primitive, RenderFrame, Renderer, SurfaceManager,
};

#[derive(Debug, Default)]
struct Journal {
    created: usize,
    renders: usize,
    resizes: Vec<Viewport>,
    releases: usize,
}

struct RecordingRenderer {
    journal: Rc<RefCell<Journal>>,
    fail_render: bool,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, _frame: &RenderFrame) -> ChartResult<()> {
        if self.fail_render {
            return Err(ChartError::Backend("render refused".to_owned()));
        }
        self.journal.borrow_mut().renders += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.journal.borrow_mut().resizes.push(viewport);
        Ok(())
    }

    fn release(&mut self) {
        self.journal.borrow_mut().releases += 1;
    }
}

fn recording_manager(
    fail_render: bool,
) -> (
    SurfaceManager<impl FnMut(Viewport) -> ChartResult<RecordingRenderer>>,
    Rc<RefCell<Journal>>,
) {
    let journal = Rc::new(RefCell::new(Journal::default()));
    let shared = Rc::clone(&journal);
    let manager = SurfaceManager::new(move |_viewport| {
        shared.borrow_mut().created += 1;
        Ok(RecordingRenderer {
            journal: Rc::clone(&shared),
            fail_render,
        })
    });
    (manager, journal)
}

fn frame(width: u32, height: u32) -> RenderFrame {
    RenderFrame::new(Viewport::new(width, height), Color::WHITE).with(
        LayerKind::Series,
        Primitive::rect(10.0, 10.0, 20.0, 20.0)
            .with_solid_fill(Color::BLACK)
            .with_datum(Datum::new(0, DataPoint::new().with_number("v", 1.0))),
    )
}

#[test]
fn first_paint_allocates_and_later_paints_update_in_place() {
    let mut manager = SurfaceManager::new(NullRenderer::factory());

    let handle = manager
        .create_or_update(None, &frame(400, 300))
        .expect("first paint");
    let same = manager
        .create_or_update(Some(handle), &frame(400, 300))
        .expect("second paint");

    assert_eq!(handle, same);
    assert_eq!(manager.live_count(), 1);
    assert_eq!(manager.paint_count(handle), Some(2));
    let renderer = manager.renderer(handle).expect("live renderer");
    assert_eq!(renderer.paint_count, 2);
    assert_eq!(renderer.last_primitive_count, 1);
    assert_eq!(renderer.last_interactive_count, 1);
}

#[test]
fn allocate_leaves_surface_blank() {
    let mut manager = SurfaceManager::new(NullRenderer::factory());

    let handle = manager.allocate(Viewport::new(200, 100)).expect("allocate");

    assert_eq!(manager.paint_count(handle), Some(0));
    assert_eq!(manager.viewport(handle), Some(Viewport::new(200, 100)));
}

#[test]
fn zero_viewport_is_a_mount_error() {
    let mut manager = SurfaceManager::new(NullRenderer::factory());

    let err = manager
        .allocate(Viewport::new(0, 300))
        .expect_err("zero width");
    assert!(matches!(err, ChartError::Mount { width: 0, height: 300 }));

    let err = manager
        .create_or_update(None, &frame(640, 0))
        .expect_err("zero height");
    assert!(matches!(err, ChartError::Mount { width: 640, height: 0 }));
    assert_eq!(manager.live_count(), 0);
}

#[test]
fn viewport_change_resizes_backend_before_repaint() {
    let (mut manager, journal) = recording_manager(false);

    let handle = manager.create_or_update(None, &frame(400, 300)).expect("paint");
    manager
        .create_or_update(Some(handle), &frame(400, 300))
        .expect("repaint");
    manager
        .create_or_update(Some(handle), &frame(800, 300))
        .expect("resize");

    let journal = journal.borrow();
    assert_eq!(journal.created, 1);
    assert_eq!(journal.renders, 3);
    assert_eq!(journal.resizes, vec![Viewport::new(800, 300)]);
    assert_eq!(manager.viewport(handle), Some(Viewport::new(800, 300)));
}

#[test]
fn destroy_is_idempotent_and_releases_once() {
    let (mut manager, journal) = recording_manager(false);
    let handle = manager.create_or_update(None, &frame(100, 100)).expect("paint");

    assert!(manager.destroy(handle));
    assert!(!manager.destroy(handle));
    assert!(!manager.contains(handle));
    assert_eq!(manager.live_count(), 0);
    assert_eq!(journal.borrow().releases, 1);
}

#[test]
fn stale_handle_allocates_a_new_surface() {
    let mut manager = SurfaceManager::new(NullRenderer::factory());
    let handle = manager.create_or_update(None, &frame(100, 100)).expect("paint");
    manager.destroy(handle);

    let fresh = manager
        .create_or_update(Some(handle), &frame(100, 100))
        .expect("repaint after destroy");

    assert_ne!(handle, fresh);
    assert_eq!(manager.live_count(), 1);
}

#[test]
fn failed_first_paint_does_not_leak_surface() {
    let (mut manager, journal) = recording_manager(true);

    let err = manager
        .create_or_update(None, &frame(100, 100))
        .expect_err("backend refuses");

    assert!(matches!(err, ChartError::Backend(_)));
    assert_eq!(manager.live_count(), 0);
    assert_eq!(journal.borrow().releases, 1);
}

#[test]
fn factory_errors_propagate() {
    let mut manager = SurfaceManager::new(|_viewport: Viewport| -> ChartResult<NullRenderer> {
        Err(ChartError::Backend("no display".to_owned()))
    });

    let err = manager
        .allocate(Viewport::new(10, 10))
        .expect_err("factory failure");
    assert!(matches!(err, ChartError::Backend(_)));
    assert_eq!(manager.live_count(), 0);
}

#[test]
fn surfaces_are_independent() {
    let mut manager = SurfaceManager::new(NullRenderer::factory());
    let first = manager.create_or_update(None, &frame(100, 100)).expect("first");
    let second = manager.create_or_update(None, &frame(200, 100)).expect("second");

    assert_ne!(first, second);
    assert!(manager.destroy(first));
    assert!(manager.contains(second));
    assert_eq!(manager.paint_count(second), Some(1));
}
