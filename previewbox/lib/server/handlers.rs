//! HTTP request handlers for the REST API.
//!
//! Spawn, stop and exec run on their own task, so a client that disconnects mid-request
//! cannot cancel them halfway through.

use std::{future::Future, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    sandbox::{LifecycleManager, SandboxInfo},
    PreviewboxResult,
};

use super::{
    data::{
        ErrorResponse, ErrorType, ExecRequest, ExecResponse, ListResponse, SpawnResponse,
        StopResponse,
    },
    state::ServerState,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Type alias for the standard API response
type ApiResponse<T> = Result<Json<T>, ErrorResponse>;

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

/// Handler for the POST /spawn endpoint
pub async fn spawn_handler(State(state): State<ServerState>) -> ApiResponse<SpawnResponse> {
    tracing::debug!("received spawn request");
    let sandbox = detached(&state, |manager| async move { manager.spawn().await }).await?;
    Ok(Json(SpawnResponse::new(&sandbox)))
}

/// Handler for the POST /stop/{id} endpoint
pub async fn stop_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResponse<StopResponse> {
    tracing::debug!("received stop request for {}", id);
    let target = id.clone();
    detached(&state, |manager| async move { manager.stop(&target).await }).await?;
    Ok(Json(StopResponse::stopped(&id)))
}

/// Handler for the POST /exec/{id} endpoint
pub async fn exec_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<ExecRequest>, JsonRejection>,
) -> ApiResponse<ExecResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            // An unknown sandbox is reported ahead of a bad body.
            state.manager().get(&id).await?;
            return Err(ErrorResponse::new(
                rejection.status().as_u16(),
                "Invalid request body".to_string(),
                ErrorType::ValidationError,
            )
            .with_details(rejection.body_text()));
        }
    };

    tracing::debug!("received exec request for {}: {:?}", id, request.command);
    let output = detached(&state, |manager| async move {
        manager.exec(&id, &request.command).await
    })
    .await?;
    Ok(Json(ExecResponse { output }))
}

/// Handler for the GET /sandboxes endpoint
pub async fn list_handler(State(state): State<ServerState>) -> Json<ListResponse> {
    Json(ListResponse {
        sandboxes: state.manager().list().await,
    })
}

/// Handler for the GET /sandboxes/{id} endpoint
pub async fn get_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResponse<SandboxInfo> {
    Ok(Json(state.manager().get(&id).await?))
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// Runs a manager operation on its own task and waits for it.
async fn detached<T, F, Fut>(state: &ServerState, operation: F) -> PreviewboxResult<T>
where
    F: FnOnce(Arc<LifecycleManager>) -> Fut,
    Fut: Future<Output = PreviewboxResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation(state.manager().clone()))
        .await
        .inspect_err(|e| tracing::error!("lifecycle task failed: {}", e))?
}
