use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use crate::backend::run_backend;
use crate::config::{load_settings, save_settings, Settings};
use crate::events::process_events;
use crate::fallback::offline_reply;
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ChatState;
use crate::transcript::Role;
use crate::ui::{msg_colors, render_transcript};
use crate::validation::{sanitize_question, validate_question};

pub struct FlowChatApp {
    // Chat session state (transcript, connection, typing indicator)
    pub state: ChatState,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,

    // UI state
    pub message_input: String,
    pub settings: Settings,
    pub show_system_log: bool,
}

impl FlowChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Create channels for UI <-> Backend
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<GuiEvent>();

        // Spawn the backend thread
        thread::spawn(move || {
            run_backend(action_rx, event_tx);
        });

        // Try to load persisted settings and apply theme in creation context
        let settings = load_settings().unwrap_or_default();
        match settings.theme.as_str() {
            "light" => cc.egui_ctx.set_visuals(egui::Visuals::light()),
            _ => cc.egui_ctx.set_visuals(egui::Visuals::dark()),
        }

        let app = Self {
            state: ChatState::new(),
            action_tx,
            event_rx,
            message_input: String::new(),
            settings,
            show_system_log: false,
        };

        // Point the backend at the configured endpoint and probe it
        let _ = app.action_tx.send(BackendAction::UpdateEndpoint {
            api_host: app.settings.api_host.clone(),
            chatflow_id: app.settings.chatflow_id.clone(),
        });
        let _ = app.action_tx.send(BackendAction::CheckConnection);

        app
    }

    /// Send one user message: validate, record the turn, then either ask the
    /// completion service or answer locally when offline.
    fn send_message(&mut self, text: &str) {
        let question = sanitize_question(text);
        if let Err(e) = validate_question(&question) {
            self.state.log_system(&e);
            return;
        }

        self.state.append_turn(&question, Role::User);
        self.state.show_suggestions = false;

        if self.state.is_connected {
            self.state.awaiting_reply = true;
            // History includes the turn just appended, most recent last
            let _ = self.action_tx.send(BackendAction::AskQuestion {
                question,
                chat_id: self.state.session.chat_id.clone(),
                history: self.state.session.transcript.history_payload(),
            });
        } else {
            // No connection at send time: answer from the keyword responder
            let reply = offline_reply(&question);
            self.state.append_turn(&reply, Role::Bot);
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context, theme: &str) {
        self.settings.theme = theme.to_string();
        match theme {
            "light" => ctx.set_visuals(egui::Visuals::light()),
            _ => ctx.set_visuals(egui::Visuals::dark()),
        }
        let _ = save_settings(&self.settings);
    }
}

impl eframe::App for FlowChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process backend events
        process_events(&self.event_rx, &mut self.state);

        // Request repaint to keep checking for events
        ctx.request_repaint_after(Duration::from_millis(100));

        // Top panel: title, status line, theme and reset controls
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("FlowChat");
                ui.separator();
                let status_color = if self.state.is_connected {
                    msg_colors::STATUS_ONLINE
                } else {
                    msg_colors::STATUS_OFFLINE
                };
                ui.label(egui::RichText::new(&self.state.bot_status).color(status_color));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Reset").clicked() {
                        self.state.reset_conversation();
                        self.message_input.clear();
                    }
                    if ui
                        .selectable_label(self.settings.theme == "light", "Light")
                        .clicked()
                    {
                        self.apply_theme(ctx, "light");
                    }
                    if ui
                        .selectable_label(self.settings.theme == "dark", "Dark")
                        .clicked()
                    {
                        self.apply_theme(ctx, "dark");
                    }
                    if ui
                        .selectable_label(self.show_system_log, "Log")
                        .clicked()
                    {
                        self.show_system_log = !self.show_system_log;
                    }
                });
            });
        });

        // Bottom panel: suggestions row plus the input line
        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            if self.state.show_suggestions {
                ui.horizontal_wrapped(|ui| {
                    let suggestions = self.settings.quick_suggestions.clone();
                    for suggestion in suggestions {
                        if ui.small_button(&suggestion).clicked() {
                            self.send_message(&suggestion);
                        }
                    }
                });
            }

            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    !self.state.awaiting_reply,
                    egui::TextEdit::singleline(&mut self.message_input)
                        .desired_width(ui.available_width() - 60.0)
                        .hint_text("Type your message..."),
                );

                let can_send =
                    !self.state.awaiting_reply && !self.message_input.trim().is_empty();
                let send_clicked = ui.add_enabled(can_send, egui::Button::new("Send")).clicked();
                let enter_pressed = response.lost_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if send_clicked || (enter_pressed && can_send) {
                    let text = self.message_input.clone();
                    self.send_message(&text);
                    self.message_input.clear();
                    response.request_focus();
                }
            });
        });

        // Central panel: the transcript (or the system log when toggled)
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.show_system_log {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.state.system_log {
                            ui.label(line);
                        }
                    });
            } else {
                render_transcript(ui, &self.state);
            }
        });
    }
}

impl Drop for FlowChatApp {
    fn drop(&mut self) {
        let _ = save_settings(&self.settings);
    }
}
