use eframe::egui::{self, Align2, FontId, Rect, Sense, Ui, vec2};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot, Points};

use crate::analysis::correlation::CorrelationReport;
use crate::analysis::summary::{Histogram, SummaryReport};
use crate::analysis::{
    AnomalyOutcome, AnomalyProjection, AnomalyReport, CorrelationOutcome, PairPanel,
    SummaryOutcome,
};
use crate::color;
use crate::data::model::Table;
use crate::state::{ActiveView, AppState};

const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Central panel – active analysis result
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyse  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_view {
            ActiveView::Preview => preview(ui, table),
            ActiveView::Summary => match &state.summary {
                Some(outcome) => summary_view(ui, outcome),
                None => hint(ui, "Press \"Run summary\" to summarise the table."),
            },
            ActiveView::Correlation => match &state.correlation {
                Some(outcome) => correlation_view(ui, outcome),
                None => hint(ui, "Press \"Run correlation\" to visualise pairwise relationships."),
            },
            ActiveView::Anomalies => match &state.anomalies {
                Some(outcome) => anomaly_view(ui, table, outcome),
                None => hint(ui, "Press \"Detect anomalies\" to label the rows."),
            },
        });
}

fn hint(ui: &mut Ui, text: &str) {
    ui.label(text);
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

fn preview(ui: &mut Ui, table: &Table) {
    ui.heading("Data preview");
    ui.label(format!("Number of rows: {}", table.n_rows()));
    ui.add_space(4.0);

    let rows: Vec<usize> = (0..table.n_rows().min(PREVIEW_ROWS)).collect();
    cell_table(ui, "preview_table", table, &rows);
}

/// Render the given table rows with `egui_extras` table widgets.
fn cell_table(ui: &mut Ui, salt: &str, table: &Table, rows: &[usize]) {
    ui.push_id(salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), table.n_cols() + 1)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("row");
                });
                for col in table.columns() {
                    header.col(|ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|mut body| {
                for &r in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(r.to_string());
                        });
                        for cell in table.row(r) {
                            row.col(|ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Summary view
// ---------------------------------------------------------------------------

fn summary_view(ui: &mut Ui, outcome: &SummaryOutcome) {
    let report = match outcome {
        SummaryOutcome::NoNumericColumns => {
            ui.label("No numeric columns available for EDA.");
            return;
        }
        SummaryOutcome::Summary(report) => report,
    };

    ui.heading("Basic statistics");
    stats_table(ui, report);
    ui.add_space(8.0);

    ui.heading("Missing values and column kinds");
    columns_table(ui, report);
    ui.add_space(8.0);

    ui.heading("Correlation matrix");
    matrix_table(ui, report);
    ui.add_space(8.0);

    ui.heading("Histograms");
    let palette = color::generate_palette(report.histograms.len());
    egui::Grid::new("histogram_grid").show(ui, |ui: &mut Ui| {
        for (i, hist) in report.histograms.iter().enumerate() {
            histogram_plot(ui, hist, palette[i], format!("summary_hist_{i}"), 260.0, 180.0);
            if (i + 1) % 3 == 0 {
                ui.end_row();
            }
        }
    });
}

fn stats_table(ui: &mut Ui, report: &SummaryReport) {
    let headers = [
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ];
    ui.push_id("stats_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), headers.len())
            .header(20.0, |mut header| {
                for h in headers {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for s in &report.stats {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&s.name);
                        });
                        row.col(|ui| {
                            ui.label(s.count.to_string());
                        });
                        for v in [s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max] {
                            row.col(|ui| {
                                ui.label(fmt_f64(v));
                            });
                        }
                    });
                }
            });
    });
}

fn columns_table(ui: &mut Ui, report: &SummaryReport) {
    ui.push_id("columns_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), 3)
            .header(20.0, |mut header| {
                for h in ["column", "kind", "missing"] {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for info in &report.columns {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&info.name);
                        });
                        row.col(|ui| {
                            ui.label(info.kind.to_string());
                        });
                        row.col(|ui| {
                            ui.label(info.missing.to_string());
                        });
                    });
                }
            });
    });
}

fn matrix_table(ui: &mut Ui, report: &SummaryReport) {
    let m = &report.correlation;
    ui.push_id("matrix_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), m.len() + 1)
            .header(20.0, |mut header| {
                header.col(|_| {});
                for name in m.columns() {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for i in 0..m.len() {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.strong(&m.columns()[i]);
                        });
                        for j in 0..m.len() {
                            row.col(|ui| {
                                ui.label(fmt_f64(m.get(i, j)));
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Correlation view
// ---------------------------------------------------------------------------

fn correlation_view(ui: &mut Ui, outcome: &CorrelationOutcome) {
    let report = match outcome {
        CorrelationOutcome::NoNumericColumns => {
            ui.label("No numeric columns available for visualization.");
            return;
        }
        CorrelationOutcome::Correlation(report) => report,
    };

    let p = report.matrix.len();
    let palette = color::generate_palette(p);

    ui.heading("Pairplot");
    egui::Grid::new("pairplot_grid").show(ui, |ui: &mut Ui| {
        for i in 0..p {
            for j in 0..p {
                match &report.grid[i * p + j] {
                    PairPanel::Histogram(hist) => {
                        histogram_plot(
                            ui,
                            hist,
                            palette[i],
                            format!("pair_hist_{i}_{j}"),
                            170.0,
                            150.0,
                        );
                    }
                    PairPanel::Scatter { points, .. } => {
                        scatter_panel(ui, points, palette[i], format!("pair_scatter_{i}_{j}"));
                    }
                }
            }
            ui.end_row();
        }
    });
    ui.add_space(8.0);

    ui.heading("Heatmap");
    heatmap(ui, report);
}

fn scatter_panel(ui: &mut Ui, points: &[[f64; 2]], color: egui::Color32, salt: String) {
    Plot::new(salt)
        .width(170.0)
        .height(150.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(points.to_vec()).radius(1.5).color(color));
        });
}

/// Annotated correlation heatmap, painted as a colored grid.
fn heatmap(ui: &mut Ui, report: &CorrelationReport) {
    let n = report.matrix.len();
    let cell = 56.0_f32;
    let label_w = 90.0_f32;
    let label_h = 22.0_f32;

    let size = vec2(label_w + n as f32 * cell, label_h + n as f32 * cell);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let names = report.matrix.columns();
    let text_color = ui.visuals().text_color();

    for (j, name) in names.iter().enumerate() {
        painter.text(
            origin + vec2(label_w + j as f32 * cell + cell / 2.0, label_h / 2.0),
            Align2::CENTER_CENTER,
            name,
            FontId::proportional(12.0),
            text_color,
        );
    }

    for (i, name) in names.iter().enumerate() {
        painter.text(
            origin + vec2(label_w - 6.0, label_h + i as f32 * cell + cell / 2.0),
            Align2::RIGHT_CENTER,
            name,
            FontId::proportional(12.0),
            text_color,
        );
        for j in 0..n {
            let r = report.matrix.get(i, j);
            let rect = Rect::from_min_size(
                origin + vec2(label_w + j as f32 * cell, label_h + i as f32 * cell),
                vec2(cell, cell),
            );
            painter.rect_filled(rect.shrink(1.0), 2.0, color::diverging(r));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &report.annotations[i][j],
                FontId::proportional(12.0),
                color::heatmap_text_color(r),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Anomaly view
// ---------------------------------------------------------------------------

fn anomaly_view(ui: &mut Ui, table: &Table, outcome: &AnomalyOutcome) {
    let report = match outcome {
        AnomalyOutcome::NoNumericColumns => {
            ui.label("No numeric columns available for anomaly detection.");
            return;
        }
        AnomalyOutcome::Report(report) => report,
    };

    ui.heading(format!("Detected {} anomalies", report.count()));
    ui.label(format!("contamination = {:.2}", report.contamination));
    ui.add_space(4.0);

    if !report.flagged.is_empty() {
        flagged_table(ui, table, report);
        ui.add_space(8.0);
    }

    ui.heading("Anomaly visualization");
    match &report.projection {
        AnomalyProjection::Scatter {
            x_column,
            y_column,
            normal,
            anomalous,
        } => {
            Plot::new("anomaly_projection")
                .legend(Legend::default())
                .x_axis_label(x_column)
                .y_axis_label(y_column)
                .height(360.0)
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new(normal.clone())
                            .radius(2.5)
                            .color(color::NORMAL_COLOR)
                            .name("normal"),
                    );
                    plot_ui.points(
                        Points::new(anomalous.clone())
                            .radius(3.5)
                            .color(color::ANOMALY_COLOR)
                            .name("anomaly"),
                    );
                });
        }
        AnomalyProjection::InsufficientColumns => {
            ui.label("Not enough numeric columns for anomaly visualization.");
        }
    }
}

fn flagged_table(ui: &mut Ui, table: &Table, report: &AnomalyReport) {
    // Flagged cells were captured when detection ran; the label column may
    // have been appended since, so size the header row to the cells.
    let width = report.flagged.first().map_or(0, |r| r.cells.len());
    let headers: Vec<&str> = table
        .columns()
        .iter()
        .take(width)
        .map(|c| c.name.as_str())
        .collect();

    ui.push_id("flagged_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), headers.len() + 1)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("row");
                });
                for h in &headers {
                    header.col(|ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|mut body| {
                for flagged in &report.flagged {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(flagged.index.to_string());
                        });
                        for cell in &flagged.cells {
                            row.col(|ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn histogram_plot(
    ui: &mut Ui,
    hist: &Histogram,
    color: egui::Color32,
    salt: String,
    width: f32,
    height: f32,
) {
    if hist.counts.is_empty() {
        return;
    }
    let bin_width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            Bar::new(hist.edges[i] + bin_width / 2.0, count as f64).width(bin_width * 0.95)
        })
        .collect();

    Plot::new(salt)
        .width(width)
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&hist.column));
        });
}

fn fmt_f64(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}
