use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::api::{ApiError, ApiPredictionRequest, ApiPredictionResponse};
use crate::llm::GeminiClient;
use crate::lunarcrush::{LookupError, LunarCrushClient};
use viralcast::config::EstimatorConfig;
use viralcast::{estimate, post_fingerprint, CreatorProfile, TrendingTopic};

#[derive(Clone)]
struct AppState {
    config: Arc<EstimatorConfig>,
    llm_client: Option<GeminiClient>,
    lunarcrush: Option<LunarCrushClient>,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs) -> Result<(), String> {
    let config = EstimatorConfig::load(None)
        .map(|(config, _)| config)
        .unwrap_or_default();
    let state = AppState {
        llm_client: GeminiClient::from_env(&config.gemini, None),
        lunarcrush: LunarCrushClient::from_env(&config.lunarcrush),
        config: Arc::new(config),
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/predict", post(predict_handler))
        .route("/api/predict/stream", get(stream_handler))
        .route("/api/trending", get(trending_handler))
        .nest_service("/", static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "starting prediction server");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn trending_handler(State(state): State<AppState>) -> Json<Vec<TrendingTopic>> {
    Json(state.config.trending.topics.clone())
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiPredictionRequest>,
) -> Result<Json<ApiPredictionResponse>, (StatusCode, Json<ApiError>)> {
    let enrich = request.options.enrich_with_lunar_crush.unwrap_or(false);
    let use_ai = request.options.use_ai.unwrap_or(false);
    let request_id = request
        .options
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);

    let (input, mut creator, handle) = request.into_input().map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::invalid_input(err)),
        )
    })?;

    // Requested enrichments with no key configured are a setup problem, not an
    // upstream outage; surface them instead of silently degrading.
    if enrich && creator.is_none() && state.lunarcrush.is_none() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::configuration(
                "creator lookup not configured: set LUNARCRUSH_API_KEY",
            )),
        ));
    }
    if use_ai && state.llm_client.is_none() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::configuration(
                "AI analysis not configured: set GEMINI_API_KEY",
            )),
        ));
    }

    let channel = if enrich || use_ai {
        Some(get_or_create_channel(&state, &request_id).await)
    } else {
        None
    };
    if let Some(sender) = channel.as_ref() {
        send_event(sender, "start", "Starting prediction");
    }

    let mut warnings = Vec::new();

    if creator.is_none() && enrich {
        match handle.as_deref() {
            Some(handle) => {
                if let Some(sender) = channel.as_ref() {
                    send_event(sender, "creator", "Looking up creator profile");
                }
                creator =
                    lookup_creator(&state, input.platform.network(), handle, &mut warnings).await;
            }
            None => warnings
                .push("creator lookup skipped: postData.creatorHandle not set".to_string()),
        }
    }

    let llm_outcome = match state.llm_client.as_ref().filter(|_| use_ai) {
        Some(client) => {
            if let Some(sender) = channel.as_ref() {
                send_event(sender, "calling", "Calling Gemini");
            }
            match client
                .analyze(&input, creator.as_ref(), &state.config.trending.topics)
                .await
            {
                Ok(outcome) => {
                    if let Some(sender) = channel.as_ref() {
                        send_event(sender, "received", "Received Gemini response");
                    }
                    Some(outcome)
                }
                Err(err) => {
                    warn!(request_id = %request_id, error = %err, "AI analysis failed; using rule-based path");
                    warnings.push(format!("AI analysis failed: {}", err));
                    if let Some(sender) = channel.as_ref() {
                        send_event(sender, "error", "Gemini call failed");
                    }
                    None
                }
            }
        }
        None => None,
    };

    if let Some(sender) = channel.as_ref() {
        send_event(sender, "merge", "Merging signals");
    }

    let result = estimate(
        &input,
        creator.as_ref(),
        Some(&state.config.trending.topics),
        llm_outcome.as_ref().map(|outcome| &outcome.analysis),
        &state.config.scoring,
    );

    if let Some(sender) = channel.as_ref() {
        send_event(sender, "done", "Prediction complete");
        schedule_cleanup(state.channels.clone(), request_id.clone());
    }

    info!(
        request_id = %request_id,
        probability = result.viral_probability,
        confidence = result.confidence,
        source = result.source.label(),
        "prediction served"
    );

    let fingerprint = post_fingerprint(&input.text);
    let response = ApiPredictionResponse::from_result(
        result,
        request_id,
        fingerprint,
        creator,
        llm_outcome.map(|outcome| outcome.trace),
        warnings,
    );
    Ok(Json(response))
}

async fn lookup_creator(
    state: &AppState,
    network: &str,
    handle: &str,
    warnings: &mut Vec<String>,
) -> Option<CreatorProfile> {
    let client = state.lunarcrush.as_ref()?;
    match client.lookup(network, handle).await {
        Ok(profile) => Some(profile),
        Err(err) => {
            let detail = match &err {
                LookupError::NotFound => format!("creator @{} not found", handle),
                other => other.to_string(),
            };
            warn!(handle, error = %err, "creator lookup failed; using fallback baseline");
            warnings.push(format!("{}; using baseline estimate", detail));
            None
        }
    }
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming prediction status");
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn get_or_create_channel(
    state: &AppState,
    request_id: &str,
) -> broadcast::Sender<StreamEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
    request_id: String,
) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
