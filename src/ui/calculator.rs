use eframe::egui::{self, DragValue, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::metrics::{self, CURRENCIES};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Calculator page
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Digital Marketing Calculator");
    ui.add_space(4.0);

    egui::ComboBox::from_label("Currency")
        .selected_text(state.calculator.currency.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for currency in CURRENCIES {
                ui.selectable_value(
                    &mut state.calculator.currency,
                    currency.to_string(),
                    *currency,
                );
            }
        });
    ui.add_space(8.0);

    ui.strong("Input your Ads metrics");
    let inputs = &mut state.calculator.inputs;
    egui::Grid::new("ad_inputs")
        .num_columns(4)
        .spacing([12.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Ad Spend");
            ui.add(DragValue::new(&mut inputs.ad_spend).speed(100.0).range(0.0..=f64::MAX));
            ui.label("Average Conversion Value");
            ui.add(DragValue::new(&mut inputs.conversion_value).speed(1.0).range(0.0..=f64::MAX));
            ui.end_row();

            ui.label("Clicks");
            ui.add(DragValue::new(&mut inputs.clicks).speed(100.0).range(0.0..=f64::MAX));
            ui.label("Impressions");
            ui.add(DragValue::new(&mut inputs.impressions).speed(100.0).range(0.0..=f64::MAX));
            ui.end_row();

            ui.label("Conversions");
            ui.add(DragValue::new(&mut inputs.conversions).speed(1.0).range(0.0..=f64::MAX));
            ui.end_row();
        });
    ui.add_space(8.0);

    let m = state.calculator.inputs.metrics();
    let currency = state.calculator.currency.clone();

    ui.strong("Results");
    ui.columns(4, |cols: &mut [Ui]| {
        metric_tile(&mut cols[0], "Cost Per Click (CPC)", format!("{currency} {:.2}", m.cpc));
        metric_tile(&mut cols[1], "Cost Per Acquisition (CPA)", format!("{currency} {:.2}", m.cpa));
        metric_tile(&mut cols[2], "Click-Through Rate (CTR)", format!("{:.2} %", m.ctr));
        metric_tile(&mut cols[3], "Return on Investment (ROI)", format!("{:.2} %", m.roi));
    });
    ui.add_space(8.0);

    ui.strong("Performance Graph");
    let labels = ["CPC", "CPA", "CTR", "ROI"];
    let bars: Vec<Bar> = [m.cpc, m.cpa, m.ctr, m.roi]
        .into_iter()
        .enumerate()
        .map(|(i, v)| Bar::new(i as f64, v).width(0.6).name(labels[i]))
        .collect();
    Plot::new("metrics_chart")
        .height(260.0)
        .x_axis_label("Metrics")
        .y_axis_label("Value")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || !(0.0..4.0).contains(&idx) {
                return String::new();
            }
            labels[idx as usize].to_string()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Metrics"));
        });
    ui.add_space(8.0);

    if ui.button("Download Metrics as CSV").clicked() {
        download_metrics(state);
    }
    ui.label(
        RichText::new(
            "Calculations are based on the inputs provided. Adjust the values to see how \
             your metrics change and download the results as CSV.",
        )
        .weak(),
    );
}

fn metric_tile(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.label(label);
        ui.strong(value);
    });
}

fn download_metrics(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save metrics")
        .set_file_name("digital_marketing_calculator_results.csv")
        .save_file()
    else {
        return;
    };

    let result = metrics::metrics_csv(&state.calculator.currency, &state.calculator.inputs)
        .and_then(|csv_text| {
            std::fs::write(&path, csv_text)
                .map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))
        });
    match result {
        Ok(()) => log::info!("exported metrics to {}", path.display()),
        Err(e) => {
            log::error!("metric export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
