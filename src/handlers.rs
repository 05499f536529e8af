use crate::date_stamp::DateStamp;
use crate::errors::{AppError, HabitError};
use crate::models::{
    CompleteRequest, CompletionResponse, Habit, HabitFilter, HabitView, ListQuery, NewHabit, ProgressDay,
    StatsResponse,
};
use crate::rules;
use crate::state::AppState;
use crate::stats::build_stats;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<HabitView>> {
    let today = DateStamp::today();
    let habits = match query.filter {
        HabitFilter::All => state.store.list().await,
        HabitFilter::Active => state.store.list_active(today).await,
        HabitFilter::Completed => state.store.list_completed(today).await,
    };

    Json(
        habits
            .into_iter()
            .map(|habit| HabitView {
                status: rules::status(&habit, today),
                habit,
            })
            .collect(),
    )
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<HabitView>, AppError> {
    let habit = state
        .store
        .get(&name)
        .await
        .ok_or_else(|| AppError::from(HabitError::NotFound(name)))?;
    Ok(Json(HabitView {
        status: rules::status(&habit, DateStamp::today()),
        habit,
    }))
}

pub async fn create_habit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let payload = serde_json::from_slice::<NewHabit>(&body)
        .map_err(|err| AppError::bad_request(format!("invalid habit: {err}")))?;
    let habit = state.store.create(payload).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_habit(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<CompletionResponse>, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteRequest::default()
    } else {
        serde_json::from_slice::<CompleteRequest>(&body)
            .map_err(|err| AppError::bad_request(format!("invalid completion request: {err}")))?
    };

    let completion = match request.date {
        Some(day) if day > DateStamp::today() => {
            return Err(AppError::bad_request(format!("cannot complete a habit on future date {day}")));
        }
        Some(day) => state.store.complete(&name, day).await?,
        None => state.store.complete_today(&name).await?,
    };
    Ok(Json(completion.into()))
}

pub async fn get_progress(State(state): State<AppState>) -> Json<Vec<ProgressDay>> {
    Json(state.store.progress().series().await)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let series = state.store.progress().snapshot().await;
    Json(build_stats(&series))
}
