use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::RwLock;
use tokio::sync::mpsc;

use crate::core::types::Height;

const PORT: u16 = 3005;

#[derive(Debug)]
pub enum MonitorMessage {
    /// Height of last processed block.
    Processed(Height),
    /// Height of last chain-state snapshot.
    Snapshot(Height),
}

#[derive(Default)]
struct MonitorData {
    pub height: Option<Height>,
    pub snapshot_height: Option<Height>,
}

type SharedState = Arc<RwLock<MonitorData>>;

pub struct Monitor {
    tx: mpsc::Sender<MonitorMessage>,
    rx: mpsc::Receiver<MonitorMessage>,
}

impl Monitor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(32);
        Self { tx, rx }
    }

    pub fn sender(&self) -> mpsc::Sender<MonitorMessage> {
        self.tx.clone()
    }

    pub async fn start(&mut self) {
        let state = SharedState::default();

        self.start_server(state.clone());

        while let Some(msg) = self.rx.recv().await {
            let Ok(mut data) = state.write() else {
                tracing::error!("monitor state is poisoned");
                break;
            };
            match msg {
                MonitorMessage::Processed(h) => data.height = Some(h),
                MonitorMessage::Snapshot(h) => data.snapshot_height = Some(h),
            };
        }
    }

    fn start_server(&self, state: SharedState) {
        let app = Router::new()
            .route(
                "/",
                get(|| async { "Hey there, you're probably after /status" }),
            )
            .route("/status", get(status))
            .layer(Extension(state));

        let address = SocketAddr::from(([0, 0, 0, 0], PORT));
        tokio::spawn(async move {
            tracing::info!("listening on {}", &address);

            if let Err(e) = axum::Server::bind(&address)
                .serve(app.into_make_service())
                .await
            {
                tracing::error!("monitor server failed: {e}");
            }
        });
    }
}

async fn status(Extension(state): Extension<SharedState>) -> String {
    match state.read() {
        Ok(data) => render(&data),
        Err(_) => String::from("unavailable"),
    }
}

fn render(data: &MonitorData) -> String {
    let show = |h: Option<Height>| h.map_or(String::from("-"), |h| h.to_string());
    format!(
        "height:   {}\nsnapshot: {}",
        show(data.height),
        show(data.snapshot_height)
    )
}
