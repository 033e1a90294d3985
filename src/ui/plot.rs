use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points, Polygon,
};

use crate::chart::{
    BarChartSpec, BoxPlotSpec, ChartBody, ChartSpec, HistogramSpec, PieSpec, ScatterSpec,
};
use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Chart panel
// ---------------------------------------------------------------------------

/// Render a chart description with its subheading.
pub fn chart_panel(ui: &mut Ui, id: &str, spec: &ChartSpec, height: f32) {
    ui.label(RichText::new(spec.subheading).heading());
    ui.label(RichText::new(spec.title).weak());

    let plot = Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    match &spec.body {
        ChartBody::Bar(bar) => grouped_bars(plot, ui, bar),
        ChartBody::Histogram(hist) => histogram(plot, ui, hist),
        ChartBody::Box(b) => box_plot(plot, ui, b),
        ChartBody::Pie(pie) => pie_chart(plot, ui, pie),
        ChartBody::Scatter(scatter) => scatter_plot(plot, ui, scatter),
    }
}

fn grouped_bars(plot: Plot<'_>, ui: &mut Ui, spec: &BarChartSpec) {
    let colors = ColorMap::new(spec.subjects.iter().map(|s| s.column()));
    let n = spec.subjects.len().max(1) as f64;
    let width = 0.8 / n;

    plot.x_axis_label(spec.group_by.column())
        .y_axis_label("Average Score")
        .show(ui, |plot_ui| {
            for (k, subject) in spec.subjects.iter().enumerate() {
                let offset = (k as f64 - (n - 1.0) / 2.0) * width;
                let bars: Vec<Bar> = spec
                    .groups
                    .iter()
                    .zip(spec.series(*subject))
                    .enumerate()
                    .map(|(i, (group, value))| {
                        Bar::new(i as f64 + offset, value)
                            .width(width)
                            .name(format!("{group}: {subject}"))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(subject.column())
                        .color(colors.color_for(subject.column())),
                );
            }
        });
}

fn histogram(plot: Plot<'_>, ui: &mut Ui, spec: &HistogramSpec) {
    let colors = ColorMap::new(spec.series.iter().map(|s| s.name.as_str()));
    let n = spec.series.len().max(1) as f64;

    plot.x_axis_label(spec.value.column())
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            for (k, series) in spec.series.iter().enumerate() {
                let color = colors.color_for(&series.name);
                let bars: Vec<Bar> = spec
                    .edges
                    .windows(2)
                    .zip(&series.counts)
                    .map(|(edge, &count)| {
                        let width = (edge[1] - edge[0]) / n;
                        Bar::new(edge[0] + width * (k as f64 + 0.5), count as f64).width(width)
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&series.name)
                        .color(color.gamma_multiply(0.7)),
                );
            }
        });
}

fn box_plot(plot: Plot<'_>, ui: &mut Ui, spec: &BoxPlotSpec) {
    let colors = ColorMap::new(spec.groups.iter().map(|g| g.name.as_str()));

    plot.x_axis_label(spec.group_by.column())
        .y_axis_label(spec.value.column())
        .show(ui, |plot_ui| {
            for (i, stats) in spec.groups.iter().enumerate() {
                let color = colors.color_for(&stats.name);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        stats.lower_whisker,
                        stats.q1,
                        stats.median,
                        stats.q3,
                        stats.upper_whisker,
                    ),
                )
                .name(&stats.name)
                .box_width(0.5)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&stats.name));

                if spec.notched {
                    let (lo, hi) = stats.notch;
                    let notch = vec![[i as f64 - 0.25, lo], [i as f64 - 0.25, hi]];
                    plot_ui.points(
                        Points::new(PlotPoints::from(notch))
                            .color(color)
                            .radius(2.0)
                            .name(format!("{} notch", stats.name)),
                    );
                }
                if !stats.outliers.is_empty() {
                    let outliers: PlotPoints = stats.outliers.iter().map(|&v| [i as f64, v]).collect();
                    plot_ui.points(Points::new(outliers).color(color).radius(3.0).name(&stats.name));
                }
            }
        });
}

/// Vertices of a pie wedge from angle `start` to `end` (radians).
fn wedge(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = ((end - start) / TAU * 64.0).ceil().max(1.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    for s in 0..=steps {
        let a = start + (end - start) * s as f64 / steps as f64;
        points.push([a.cos(), a.sin()]);
    }
    points
}

fn pie_chart(plot: Plot<'_>, ui: &mut Ui, spec: &PieSpec) {
    let colors = ColorMap::pastel(spec.slices.iter().map(|s| s.label.as_str()));

    plot.data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            let mut start = std::f64::consts::FRAC_PI_2;
            for slice in &spec.slices {
                let end = start - slice.fraction * TAU;
                let color = colors.color_for(&slice.label);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge(end, start)))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::BLACK))
                        .name(format!("{} ({:.1}%)", slice.label, slice.fraction * 100.0)),
                );
                start = end;
            }
        });
}

fn scatter_plot(plot: Plot<'_>, ui: &mut Ui, spec: &ScatterSpec) {
    let colors = ColorMap::new(spec.series.iter().map(|s| s.name.as_str()));

    plot.x_axis_label(spec.x.column())
        .y_axis_label(spec.y.column())
        .show(ui, |plot_ui| {
            for series in &spec.series {
                let points: PlotPoints = series.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(colors.color_for(&series.name))
                        .radius(2.5),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedge_starts_at_centre_and_stays_on_unit_circle() {
        let pts = wedge(0.0, TAU / 4.0);
        assert_eq!(pts[0], [0.0, 0.0]);
        for p in &pts[1..] {
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.0).abs() < 1e-12);
        }
        let last = pts.last().unwrap();
        assert!(last[0].abs() < 1e-12 && (last[1] - 1.0).abs() < 1e-12);
    }
}
