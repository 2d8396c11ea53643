use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use knowledge_graph_view::{FrameBuffer, GraphData, GraphView, LayoutConfig};

use crate::source::load_graph;

mod canvas;
mod input;
mod panels;
mod style;

type LoadResult = Result<GraphData, String>;

pub struct GraphViewerApp {
    graph_path: PathBuf,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewerModel>),
    Error(String),
}

struct ViewerModel {
    view: GraphView<FrameBuffer>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    /// Bumped whenever the node set changes.
    graph_revision: u64,
    /// Last failed reload; the previous graph stays on screen.
    reload_error: Option<String>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<String>>,
}

impl GraphViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, graph_path: PathBuf, config: LayoutConfig) -> Self {
        let state = Self::start_load(graph_path.clone());
        Self {
            graph_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(&graph_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(graph_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(graph_path),
        }
    }

    fn ready_state(&self, data: &GraphData) -> AppState {
        match GraphView::initialize(data, self.config.clone(), FrameBuffer::default()) {
            Ok(view) => AppState::Ready(Box::new(ViewerModel::new(view))),
            Err(error) => {
                tracing::warn!(%error, "graph rejected");
                AppState::Error(error.to_string())
            }
        }
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => transition = Some(Ok(data)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load knowledge graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.graph_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.graph_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => model.apply_reload(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error =
                                Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.graph_path.clone());
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(data) => self.ready_state(&data),
                Err(error) => AppState::Error(error),
            };
        }
    }
}

impl ViewerModel {
    fn new(view: GraphView<FrameBuffer>) -> Self {
        Self {
            view,
            search: String::new(),
            search_match_cache: None,
            graph_revision: 0,
            reload_error: None,
        }
    }

    fn apply_reload(&mut self, result: LoadResult) {
        let outcome = result.and_then(|data| self.view.reload(&data).map_err(|e| e.to_string()));
        match outcome {
            Ok(()) => {
                self.graph_revision += 1;
                self.reload_error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "reload failed, keeping current graph");
                self.reload_error = Some(error);
            }
        }
    }

    fn show(
        &mut self,
        ctx: &Context,
        graph_path: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, graph_path, reload_requested, is_reloading));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}

impl Drop for ViewerModel {
    fn drop(&mut self) {
        self.view.destroy();
    }
}
