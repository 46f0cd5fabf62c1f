use eframe::egui::{self, Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::{correlation_color, generate_palette, heat_color};
use crate::data::aggregate::{self, TOP_FACTORS, TOP_VEHICLE_TYPES};
use crate::data::model::{CollisionTable, NumericColumn};
use crate::data::query::{self, TOP_STREETS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central dashboard
// ---------------------------------------------------------------------------

/// Render every dashboard view, top to bottom. All values are recomputed
/// from the shared table each frame; the data layer is pure, so the views
/// stay consistent with the widgets with no extra bookkeeping.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("The collision dataset is empty.");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            injury_map(ui, state);
            hour_map(ui, state);
            minute_breakdown(ui, state);
            dangerous_streets(ui, state);
            hourly_heatmap(ui, &state.table);
            borough_chart(ui, &state.table);
            severity_map(ui, &state.table);
            factor_chart(ui, &state.table);
            correlation_heatmap(ui, &state.table);
            vehicle_type_chart(ui, &state.table);
            if state.show_raw {
                raw_table(ui, &state.table);
            }
        });
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

fn collision_points(table: &CollisionTable) -> PlotPoints {
    table
        .iter()
        .map(|r| [r.longitude, r.latitude])
        .collect()
}

fn injury_map(ui: &mut Ui, state: &AppState) {
    ui.heading("Where are the most people injured?");
    ui.label(format!(
        "Collisions with at least {} injured persons",
        state.min_injured
    ));
    Plot::new("injury_map")
        .height(320.0)
        .data_aspect(1.0)
        .x_axis_label("longitude")
        .y_axis_label("latitude")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(collision_points(&state.injured_view))
                    .radius(2.0)
                    .color(Color32::from_rgb(220, 70, 70)),
            );
        });
    ui.separator();
}

fn hour_map(ui: &mut Ui, state: &AppState) {
    ui.heading(format!(
        "Collisions between {}:00 and {}:00",
        state.hour,
        (state.hour + 1) % 24
    ));
    let midpoint = aggregate::midpoint(&state.hour_view);
    Plot::new("hour_map")
        .height(320.0)
        .data_aspect(1.0)
        .x_axis_label("longitude")
        .y_axis_label("latitude")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(collision_points(&state.hour_view))
                    .radius(2.0)
                    .color(Color32::from_rgb(80, 140, 220)),
            );
            // Mark the mean position the original map centered on.
            if let Some((lat, lon)) = midpoint {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[lon, lat]]))
                        .radius(5.0)
                        .shape(egui_plot::MarkerShape::Cross)
                        .color(Color32::YELLOW),
                );
            }
        });
    ui.separator();
}

fn severity_map(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Map of accident severity");
    let sites = aggregate::severity_by_site(table);
    let max_injured = sites.iter().map(|s| s.total_injured).max().unwrap_or(0);
    Plot::new("severity_map")
        .height(320.0)
        .data_aspect(1.0)
        .x_axis_label("longitude")
        .y_axis_label("latitude")
        .show(ui, |plot_ui| {
            for site in &sites {
                let t = if max_injured == 0 {
                    0.0
                } else {
                    site.total_injured as f32 / max_injured as f32
                };
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[site.longitude, site.latitude]]))
                        .radius(2.0 + 6.0 * t.sqrt())
                        .color(heat_color(t)),
                );
            }
        });
    ui.separator();
}

// ---------------------------------------------------------------------------
// Time-of-day views
// ---------------------------------------------------------------------------

fn minute_breakdown(ui: &mut Ui, state: &AppState) {
    ui.heading(format!(
        "Breakdown by minute between {}:00 and {}:00",
        state.hour,
        (state.hour + 1) % 24
    ));
    let bins = aggregate::minute_histogram(&state.hour_view);
    let bars: Vec<Bar> = bins
        .iter()
        .enumerate()
        .map(|(minute, &count)| Bar::new(minute as f64, count as f64).width(0.9))
        .collect();
    Plot::new("minute_breakdown")
        .height(240.0)
        .x_axis_label("minute")
        .y_axis_label("crashes")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(100, 160, 220)));
        });
    ui.separator();
}

fn hourly_heatmap(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Heatmap of collisions over time (hourly)");
    let counts = aggregate::hourly_counts(table);
    let max = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
    Plot::new("hourly_heatmap")
        .height(90.0)
        .show_axes([true, false])
        .x_axis_label("hour of the day")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for &(hour, count) in &counts {
                let t = count as f32 / max.max(1) as f32;
                plot_ui.polygon(
                    cell(hour as f64, 0.0, 1.0, 1.0)
                        .fill_color(heat_color(t))
                        .stroke(Stroke::NONE),
                );
            }
        });
    ui.separator();
}

// ---------------------------------------------------------------------------
// Rankings and breakdowns
// ---------------------------------------------------------------------------

fn dangerous_streets(ui: &mut Ui, state: &AppState) {
    ui.heading("Top 5 dangerous streets by affected class");
    let top = query::top_streets_by_category(&state.table, state.category, TOP_STREETS);
    if top.is_empty() {
        ui.label(format!("No {} injuries recorded.", state.category));
    } else {
        egui::Grid::new("dangerous_streets")
            .striped(true)
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.strong("Street");
                ui.strong(format!("{} injured", state.category));
                ui.end_row();
                for (street, count) in &top {
                    ui.label(street);
                    ui.label(count.to_string());
                    ui.end_row();
                }
            });
    }
    ui.separator();
}

fn borough_chart(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Number of collisions by borough");
    let counts = aggregate::counts_by_borough(table);
    let palette = generate_palette(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .zip(&palette)
        .enumerate()
        .map(|(i, ((borough, count), &color))| {
            Bar::new(i as f64, *count as f64)
                .width(0.8)
                .fill(color)
                .name(borough)
        })
        .collect();
    Plot::new("borough_chart")
        .height(240.0)
        .legend(Legend::default())
        .y_axis_label("collisions")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
    ui.separator();
}

fn factor_chart(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Top contributing factors for collisions");
    let factors = aggregate::top_factors(table, TOP_FACTORS);
    // Horizontal bars, most frequent factor at the top.
    let bars: Vec<Bar> = factors
        .iter()
        .enumerate()
        .map(|(rank, (factor, count))| {
            Bar::new((factors.len() - rank) as f64, *count as f64)
                .width(0.8)
                .name(factor)
        })
        .collect();
    Plot::new("factor_chart")
        .height(360.0)
        .show_axes([true, false])
        .x_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(120, 180, 120)),
            );
            for (rank, (factor, _)) in factors.iter().enumerate() {
                plot_ui.text(Text::new(
                    PlotPoint::new(0.0, (factors.len() - rank) as f64),
                    format!("  {factor}"),
                ));
            }
        });
    ui.separator();
}

fn vehicle_type_chart(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Breakdown of collisions by vehicle type");
    let types = aggregate::top_vehicle_types(table, TOP_VEHICLE_TYPES);
    let palette = generate_palette(types.len());
    let bars: Vec<Bar> = types
        .iter()
        .zip(&palette)
        .enumerate()
        .map(|(i, ((name, count), &color))| {
            Bar::new(i as f64, *count as f64)
                .width(0.8)
                .fill(color)
                .name(name)
        })
        .collect();
    Plot::new("vehicle_type_chart")
        .height(240.0)
        .legend(Legend::default())
        .y_axis_label("collisions")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
    ui.separator();
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, table: &CollisionTable) {
    ui.heading("Correlation heatmap");
    let columns = NumericColumn::SEVERITY;
    let matrix = aggregate::correlation_matrix(table, &columns);
    let n = columns.len();
    Plot::new("correlation_heatmap")
        .height(320.0)
        .data_aspect(1.0)
        .show_axes([false, false])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, row) in matrix.iter().enumerate() {
                for (j, &r) in row.iter().enumerate() {
                    // Row 0 at the top.
                    let y = (n - 1 - i) as f64;
                    plot_ui.polygon(
                        cell(j as f64, y, 1.0, 1.0)
                            .fill_color(correlation_color(r))
                            .stroke(Stroke::new(1.0, Color32::DARK_GRAY)),
                    );
                    let label = if r.is_nan() {
                        "n/a".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    plot_ui.text(Text::new(PlotPoint::new(j as f64 + 0.5, y + 0.5), label));
                }
            }
            for (j, col) in columns.iter().enumerate() {
                plot_ui.text(Text::new(
                    PlotPoint::new(j as f64 + 0.5, n as f64 + 0.3),
                    col.label(),
                ));
            }
            for (i, col) in columns.iter().enumerate() {
                plot_ui.text(Text::new(
                    PlotPoint::new(-0.7, (n - 1 - i) as f64 + 0.5),
                    col.label(),
                ));
            }
        });
    ui.separator();
}

/// Unit heatmap cell with its lower-left corner at (x, y).
fn cell(x: f64, y: f64, w: f64, h: f64) -> Polygon<'static> {
    Polygon::new(PlotPoints::from(vec![
        [x, y],
        [x + w, y],
        [x + w, y + h],
        [x, y + h],
    ]))
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

fn raw_table(ui: &mut Ui, table: &CollisionTable) {
    use egui_extras::{Column, TableBuilder};

    ui.heading("Raw data");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(80.0), 4)
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in [
                "date_time",
                "latitude",
                "longitude",
                "injured",
                "borough",
                "on street",
                "off street",
            ] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let rec = &table.records[row.index()];
                row.col(|ui| {
                    ui.label(
                        rec.date_time
                            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "—".to_string()),
                    );
                });
                row.col(|ui| {
                    ui.label(format!("{:.5}", rec.latitude));
                });
                row.col(|ui| {
                    ui.label(format!("{:.5}", rec.longitude));
                });
                row.col(|ui| {
                    ui.label(
                        rec.persons_injured
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "—".to_string()),
                    );
                });
                row.col(|ui| {
                    ui.label(rec.borough.as_deref().unwrap_or("—"));
                });
                row.col(|ui| {
                    ui.label(rec.on_street.as_deref().unwrap_or("—"));
                });
                row.col(|ui| {
                    ui.label(rec.off_street.as_deref().unwrap_or("—"));
                });
            });
        });
}
