use std::f64::consts::{FRAC_PI_2, PI};
use std::io::Write;

use cairo::{Context, Format, ImageSurface, LinearGradient};
use pango::FontDescription;

use crate::core::{ScreenPath, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Fill, Primitive, RenderFrame, Renderer, Shape, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub shapes_filled: usize,
    pub shapes_stroked: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo raster backend over an offscreen image surface.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(viewport: Viewport) -> ChartResult<Self> {
        Ok(Self {
            surface: create_surface(viewport)?,
            last_stats: CairoRenderStats::default(),
        })
    }

    /// Factory for `SurfaceManager` and `ChartController`.
    pub fn factory() -> impl FnMut(Viewport) -> ChartResult<Self> {
        Self::new
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    pub fn write_png<W: Write>(&self, writer: &mut W) -> ChartResult<()> {
        self.surface
            .write_to_png(writer)
            .map_err(|err| ChartError::Backend(format!("failed to encode png: {err}")))
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, frame.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for primitive in frame.paint_order() {
            draw_primitive(context, primitive, &mut stats)?;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.surface = create_surface(viewport)?;
        Ok(())
    }

    fn release(&mut self) {
        self.surface.finish();
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn create_surface(viewport: Viewport) -> ChartResult<ImageSurface> {
    viewport.ensure_mountable()?;
    let width = i32::try_from(viewport.width)
        .map_err(|_| ChartError::Backend("surface width exceeds i32".to_owned()))?;
    let height = i32::try_from(viewport.height)
        .map_err(|_| ChartError::Backend("surface height exceeds i32".to_owned()))?;
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn draw_primitive(
    context: &Context,
    primitive: &Primitive,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    if let Shape::Text {
        text,
        x,
        y,
        font_size_px,
        h_align,
    } = &primitive.shape
    {
        let layout = pangocairo::functions::create_layout(context);
        let font_description = FontDescription::from_string(&format!("Sans {font_size_px}"));
        layout.set_font_description(Some(&font_description));
        layout.set_text(text);

        let (text_width, text_height) = layout.pixel_size();
        let left = match h_align {
            TextHAlign::Left => *x,
            TextHAlign::Center => x - f64::from(text_width) / 2.0,
            TextHAlign::Right => x - f64::from(text_width),
        };
        if let Fill::Solid(color) = primitive.fill {
            apply_color(context, color);
        }
        // Anchor y is the text baseline; pango lays out from the top edge.
        context.move_to(left, y - f64::from(text_height) * 0.8);
        pangocairo::functions::show_layout(context, &layout);
        stats.texts_drawn += 1;
        return Ok(());
    }

    append_shape_path(context, &primitive.effective_shape());
    match &primitive.fill {
        Fill::None => {}
        Fill::Solid(color) => {
            apply_color(context, *color);
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill shape", err))?;
            stats.shapes_filled += 1;
        }
        Fill::HorizontalGradient(stops) => {
            let (left, right) = horizontal_extent(&primitive.shape);
            let gradient = LinearGradient::new(left, 0.0, right, 0.0);
            for stop in stops {
                let color = stop.color;
                gradient.add_color_stop_rgba(
                    stop.offset,
                    color.red,
                    color.green,
                    color.blue,
                    color.alpha,
                );
            }
            context
                .set_source(&gradient)
                .map_err(|err| map_backend_error("failed to set gradient source", err))?;
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill gradient", err))?;
            stats.shapes_filled += 1;
        }
    }

    if let Some(stroke) = primitive.effective_stroke() {
        let color = stroke.color;
        context.set_source_rgba(
            color.red,
            color.green,
            color.blue,
            color.alpha * stroke.opacity,
        );
        context.set_line_width(stroke.width);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke shape", err))?;
        stats.shapes_stroked += 1;
    } else {
        context.new_path();
    }
    Ok(())
}

fn append_shape_path(context: &Context, shape: &Shape) {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        } => append_rect_path(context, *x, *y, *width, *height, *corner_radius),
        Shape::Path(path) => append_screen_path(context, path),
        Shape::Circle { cx, cy, radius } => {
            context.new_sub_path();
            context.arc(*cx, *cy, *radius, 0.0, 2.0 * PI);
        }
        Shape::Line { x1, y1, x2, y2 } => {
            context.move_to(*x1, *y1);
            context.line_to(*x2, *y2);
        }
        Shape::Text { .. } => {}
    }
}

fn append_screen_path(context: &Context, path: &ScreenPath) {
    context.set_fill_rule(cairo::FillRule::EvenOdd);
    for ring in &path.rings {
        let mut points = ring.iter();
        if let Some(first) = points.next() {
            context.move_to(first.x, first.y);
            for point in points {
                context.line_to(point.x, point.y);
            }
            context.close_path();
        }
    }
}

fn append_rect_path(context: &Context, x: f64, y: f64, width: f64, height: f64, corner_radius: f64) {
    if corner_radius <= 0.0 {
        context.rectangle(x, y, width, height);
        return;
    }

    let radius = corner_radius.min(width * 0.5).min(height * 0.5);
    let right = x + width;
    let bottom = y + height;

    context.new_sub_path();
    context.arc(right - radius, y + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(x + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(x + radius, y + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn horizontal_extent(shape: &Shape) -> (f64, f64) {
    match shape {
        Shape::Rect { x, width, .. } => (*x, x + width),
        Shape::Path(path) => path
            .bounds()
            .map_or((0.0, 1.0), |(min, max)| (min.x, max.x)),
        Shape::Circle { cx, radius, .. } => (cx - radius, cx + radius),
        Shape::Line { x1, x2, .. } => (x1.min(*x2), x1.max(*x2)),
        Shape::Text { x, .. } => (*x, x + 1.0),
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
