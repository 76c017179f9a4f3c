use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{calculator, dashboard, panels, tasks};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataDashApp {
    pub state: AppState,
}

impl DataDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DataDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and filters ----
        egui::SidePanel::left("side_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the selected page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Dashboard => dashboard::central_panel(ui, &mut self.state),
            Page::Calculator => calculator::central_panel(ui, &mut self.state),
            Page::Tasks => tasks::central_panel(ui, &mut self.state),
        });
    }
}
