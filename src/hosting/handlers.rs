use crate::GameId;
use crate::StackId;
use crate::battle::Action;
use crate::database::Postgres;
use crate::dto::*;
use crate::error::Refusal;
use crate::registry::Registry;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

/// Non-action refusals become plain status codes with a JSON body.
fn refuse(refusal: Refusal) -> HttpResponse {
    if let Refusal::Internal(ref detail) = refusal {
        log::error!("internal error: {}", detail);
    }
    let body = serde_json::json!({ "error": refusal.kind(), "message": refusal.message() });
    match refusal {
        Refusal::NotFound(_) => HttpResponse::NotFound().json(body),
        Refusal::Forbidden(_) => HttpResponse::Forbidden().json(body),
        Refusal::Illegal(_) => HttpResponse::BadRequest().json(body),
        Refusal::Stale(_) => HttpResponse::Conflict().json(body),
        Refusal::Busy => HttpResponse::ServiceUnavailable().json(body),
        Refusal::Conflict => HttpResponse::Conflict().json(body),
        Refusal::Internal(_) => HttpResponse::InternalServerError().json(body),
    }
}

/// Action submissions answer 200 with `success: false` on validation
/// refusals; transport and infrastructure failures keep their status codes.
fn outcome(result: Result<ActionOutcome, Refusal>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(refusal) => match refusal {
            Refusal::Forbidden(_) | Refusal::Illegal(_) | Refusal::Stale(_) => {
                HttpResponse::Ok().json(ActionOutcome::refused(&refusal))
            }
            other => refuse(other),
        },
    }
}

pub async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    const PROBE: &str = "SELECT 1";
    match client.execute(PROBE, &[]).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "engine": "up" })),
        Err(e) => {
            log::error!("health probe cannot reach the match store: {}", e);
            HttpResponse::ServiceUnavailable()
                .json(serde_json::json!({ "engine": "up", "database": "unreachable" }))
        }
    }
}

pub async fn players(gateway: web::Data<Postgres>) -> impl Responder {
    match gateway.players().await {
        Ok(roster) => HttpResponse::Ok().json(
            roster
                .into_iter()
                .map(|(id, name)| PlayerEntry { id, name })
                .collect::<Vec<_>>(),
        ),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn create(gateway: web::Data<Postgres>, body: web::Json<CreateGame>) -> impl Responder {
    match gateway
        .create(body.player1_id, &body.player2_name, &body.field_size)
        .await
    {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "game_id": id })),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn pending(
    gateway: web::Data<Postgres>,
    query: web::Query<PendingQuery>,
) -> impl Responder {
    match gateway.pending(query.player_id).await {
        Ok(challenges) => HttpResponse::Ok().json(challenges),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn accept(
    gateway: web::Data<Postgres>,
    registry: web::Data<Registry<Postgres>>,
    path: web::Path<GameId>,
    body: web::Json<AnswerChallenge>,
) -> impl Responder {
    let game = path.into_inner();
    match gateway.accept(game, body.player_id).await {
        Ok(battle) => match GameState::assemble(&battle, registry.catalog(), Vec::new()) {
            Ok(state) => HttpResponse::Ok().json(state),
            Err(refusal) => refuse(refusal),
        },
        Err(refusal) => refuse(refusal),
    }
}

pub async fn decline(
    gateway: web::Data<Postgres>,
    path: web::Path<GameId>,
    body: web::Json<AnswerChallenge>,
) -> impl Responder {
    let game = path.into_inner();
    match gateway.decline(game, body.player_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "declined" })),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn state(
    gateway: web::Data<Postgres>,
    registry: web::Data<Registry<Postgres>>,
    path: web::Path<GameId>,
    query: web::Query<StateQuery>,
) -> impl Responder {
    let game = path.into_inner();
    let state = async {
        let battle = registry.peek(game).await?;
        let events = gateway.events_after(game, query.since.unwrap_or(0)).await?;
        GameState::assemble(&battle, registry.catalog(), events)
    };
    match state.await {
        Ok(state) => HttpResponse::Ok().json(state),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn options(
    registry: web::Data<Registry<Postgres>>,
    path: web::Path<(GameId, StackId)>,
) -> impl Responder {
    let (game, stack) = path.into_inner();
    let options = async {
        let battle = registry.peek(game).await?;
        StackOptions::assemble(&battle, registry.catalog(), stack)
    };
    match options.await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(refusal) => refuse(refusal),
    }
}

pub async fn submit(
    registry: web::Data<Registry<Postgres>>,
    path: web::Path<GameId>,
    body: web::Json<SubmitAction>,
) -> impl Responder {
    let game = path.into_inner();
    let result = async {
        let action = body.action()?;
        let (battle, verdict) = registry.submit(game, body.player_id, action).await?;
        Ok(ActionOutcome::of(&battle, verdict))
    };
    outcome(result.await)
}

pub async fn surrender(
    registry: web::Data<Registry<Postgres>>,
    path: web::Path<GameId>,
    body: web::Json<Surrender>,
) -> impl Responder {
    let game = path.into_inner();
    let result = async {
        let (battle, verdict) = registry
            .submit(game, body.player_id, Action::Surrender)
            .await?;
        Ok(ActionOutcome::of(&battle, verdict))
    };
    outcome(result.await)
}
