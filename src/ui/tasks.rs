use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;
use crate::store::{NewTask, Priority, TaskStatus};

// ---------------------------------------------------------------------------
// Tasks page
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Task Management");
    if state.store.is_none() {
        ui.label(RichText::new("Task database unavailable.").color(Color32::RED));
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            add_task_form(ui, state);
            ui.separator();
            task_list(ui, state);
            ui.separator();
            user_section(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Add-task form
// ---------------------------------------------------------------------------

fn add_task_form(ui: &mut Ui, state: &mut AppState) {
    let mut submit = false;
    let mut pick_attachment = false;

    {
        let page = &mut state.tasks;
        let user_names: Vec<String> = page.users.iter().map(|u| u.name.clone()).collect();
        let form = &mut page.form;

        egui::Grid::new("task_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui: &mut Ui| {
                ui.label("Task Name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();

                ui.label("Status");
                egui::ComboBox::from_id_salt("form_status")
                    .selected_text(form.status.as_str())
                    .show_ui(ui, |ui: &mut Ui| {
                        for status in TaskStatus::ALL {
                            ui.selectable_value(&mut form.status, status, status.as_str());
                        }
                    });
                ui.end_row();

                ui.label("Due Date");
                ui.add(DatePickerButton::new(&mut form.due_date).id_salt("form_due"));
                ui.end_row();

                ui.label("Priority");
                egui::ComboBox::from_id_salt("form_priority")
                    .selected_text(form.priority.as_str())
                    .show_ui(ui, |ui: &mut Ui| {
                        for priority in Priority::ALL {
                            ui.selectable_value(&mut form.priority, priority, priority.as_str());
                        }
                    });
                ui.end_row();

                ui.label("Attachment");
                ui.horizontal(|ui: &mut Ui| {
                    let mut clear_attachment = false;
                    match &form.attachment {
                        Some((name, _)) => {
                            ui.label(name);
                            if ui.small_button("✕").clicked() {
                                clear_attachment = true;
                            }
                        }
                        None => {
                            if ui.button("Attach file…").clicked() {
                                pick_attachment = true;
                            }
                        }
                    }
                    if clear_attachment {
                        form.attachment = None;
                    }
                });
                ui.end_row();

                ui.label("Assign To");
                user_combo(ui, "form_assigned_to", &mut form.assigned_to, &user_names);
                ui.end_row();

                ui.label("Assigned By");
                user_combo(ui, "form_assigned_by", &mut form.assigned_by, &user_names);
                ui.end_row();
            });

        if ui.button("Add Task").clicked() {
            submit = true;
        }
    }

    if pick_attachment {
        attach_file(state);
    }
    if submit {
        submit_task(state);
    }
}

fn user_combo(ui: &mut Ui, id: &str, current: &mut String, names: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                ui.selectable_value(current, name.clone(), name);
            }
        });
}

fn attach_file(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Attach file")
        .add_filter("Supported files", &["txt", "pdf", "jpg", "png"])
        .pick_file();
    let Some(path) = file else {
        return;
    };
    match std::fs::read(&path) {
        Ok(bytes) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            state.tasks.form.attachment = Some((name, bytes));
        }
        Err(e) => {
            log::error!("could not read attachment: {e}");
            state.status_message = Some(format!("Error: could not read attachment: {e}"));
        }
    }
}

fn submit_task(state: &mut AppState) {
    let form = &state.tasks.form;
    if form.name.trim().is_empty() {
        state.status_message = Some("Error: task name must not be empty".to_string());
        return;
    }
    if form.assigned_to.is_empty() || form.assigned_by.is_empty() {
        state.status_message = Some("Error: select valid users for assignment".to_string());
        return;
    }

    let (file_name, file_data) = match &form.attachment {
        Some((name, bytes)) => (Some(name.clone()), Some(bytes.clone())),
        None => (None, None),
    };
    let new_task = NewTask {
        name: form.name.trim().to_string(),
        status: form.status,
        due_date: form.due_date,
        priority: form.priority,
        file_data,
        file_name,
        assigned_to: form.assigned_to.clone(),
        assigned_by: form.assigned_by.clone(),
    };

    let result = match &state.store {
        Some(store) => store.add_task(&new_task),
        None => return,
    };
    match result {
        Ok(id) => {
            log::info!("added task {id} '{}'", new_task.name);
            state.tasks.form.name.clear();
            state.tasks.form.attachment = None;
            state.status_message = None;
            state.refresh_store_cache();
        }
        Err(e) => state.status_message = Some(format!("Error: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Task list
// ---------------------------------------------------------------------------

enum TaskAction {
    SetStatus(i64, TaskStatus),
    Delete(i64),
}

fn status_color(status: TaskStatus) -> Color32 {
    match status {
        TaskStatus::ToDo => Color32::RED,
        TaskStatus::InProgress => Color32::ORANGE,
        TaskStatus::Completed => Color32::GREEN,
    }
}

fn task_list(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Task List");
    if state.tasks.tasks.is_empty() {
        ui.label("No tasks found.");
        return;
    }

    let mut actions = Vec::new();
    let mut errors = Vec::new();

    let tasks = state.tasks.tasks.clone();
    for (i, task) in tasks.iter().enumerate() {
        egui::CollapsingHeader::new(format!("Task {}: {}", i + 1, task.name))
            .id_salt(task.id)
            .show(ui, |ui: &mut Ui| {
                ui.label(format!("Task ID: {}", task.id));
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Status:");
                    ui.label(
                        RichText::new(task.status.as_str()).color(status_color(task.status)),
                    );
                });
                ui.label(format!("Due Date: {}", task.due_date));
                ui.label(format!("Priority: {}", task.priority));
                ui.label(format!("Assigned To: {}", task.assigned_to));
                ui.label(format!("Assigned By: {}", task.assigned_by));

                if let Some(file_name) = &task.file_name {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(format!("File Name: {file_name}"));
                        match &task.file_data {
                            Some(bytes) => {
                                if ui.small_button("Download File").clicked() {
                                    if let Err(e) = save_attachment(file_name, bytes) {
                                        errors.push(format!("Error: {e:#}"));
                                    }
                                }
                            }
                            None => {
                                ui.label("No file data available.");
                            }
                        }
                    });
                }

                ui.horizontal(|ui: &mut Ui| {
                    let mut status = task.status;
                    egui::ComboBox::from_id_salt(("task_status", task.id))
                        .selected_text(status.as_str())
                        .show_ui(ui, |ui: &mut Ui| {
                            for candidate in TaskStatus::ALL {
                                ui.selectable_value(&mut status, candidate, candidate.as_str());
                            }
                        });
                    if status != task.status {
                        actions.push(TaskAction::SetStatus(task.id, status));
                    }

                    if ui.button("Delete Task").clicked() {
                        actions.push(TaskAction::Delete(task.id));
                    }
                });
            });
    }

    apply_task_actions(state, actions);
    if let Some(message) = errors.into_iter().next() {
        state.status_message = Some(message);
    }
}

fn apply_task_actions(state: &mut AppState, actions: Vec<TaskAction>) {
    if actions.is_empty() {
        return;
    }
    let mut failure = None;
    if let Some(store) = &state.store {
        for action in actions {
            let result = match action {
                TaskAction::SetStatus(id, status) => state
                    .tasks
                    .tasks
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| store.update_task(id, status, t.due_date, t.priority))
                    .unwrap_or(Ok(())),
                TaskAction::Delete(id) => store.delete_task(id),
            };
            if let Err(e) = result {
                failure = Some(format!("Error: {e}"));
            }
        }
    }
    state.status_message = failure;
    state.refresh_store_cache();
}

fn save_attachment(file_name: &str, bytes: &[u8]) -> anyhow::Result<()> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save attachment")
        .set_file_name(file_name)
        .save_file()
    else {
        return Ok(());
    };
    std::fs::write(&path, bytes)
        .map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))?;
    log::info!("saved attachment to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

enum UserAction {
    Add(String, String),
    Delete(String),
}

fn user_section(ui: &mut Ui, state: &mut AppState) {
    let mut actions = Vec::new();

    {
        let page = &mut state.tasks;
        egui::CollapsingHeader::new(RichText::new("Users").strong())
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Email");
                    ui.text_edit_singleline(&mut page.new_user_email);
                    ui.label("Name");
                    ui.text_edit_singleline(&mut page.new_user_name);
                    if ui.button("Add User").clicked() {
                        actions.push(UserAction::Add(
                            page.new_user_email.trim().to_string(),
                            page.new_user_name.trim().to_string(),
                        ));
                    }
                });
                ui.separator();

                for (i, user) in page.users.iter().enumerate() {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(format!("{}. {} ({})", i + 1, user.name, user.email));
                        if ui.small_button("Delete").clicked() {
                            actions.push(UserAction::Delete(user.email.clone()));
                        }
                    });
                }
            });
    }

    apply_user_actions(state, actions);
}

fn apply_user_actions(state: &mut AppState, actions: Vec<UserAction>) {
    if actions.is_empty() {
        return;
    }
    let mut failure = None;
    let mut clear_form = false;
    if let Some(store) = &state.store {
        for action in actions {
            match action {
                UserAction::Add(email, name) => {
                    if email.is_empty() || name.is_empty() {
                        failure = Some("Error: fill out both user fields".to_string());
                        continue;
                    }
                    match store.add_user(&email, &name) {
                        Ok(()) => {
                            log::info!("added user {name} <{email}>");
                            clear_form = true;
                        }
                        Err(e) => failure = Some(format!("Error: {e}")),
                    }
                }
                UserAction::Delete(email) => {
                    if let Err(e) = store.delete_user(&email) {
                        failure = Some(format!("Error: {e}"));
                    }
                }
            }
        }
    }
    if clear_form {
        state.tasks.new_user_email.clear();
        state.tasks.new_user_name.clear();
    }
    state.status_message = failure;
    state.refresh_store_cache();
}
