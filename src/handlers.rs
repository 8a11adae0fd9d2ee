use crate::calendar::{export_window, render_calendar};
use crate::errors::AppError;
use crate::grid::{GridTarget, HeatmapGrid};
use crate::models::{
    CompletionResponse, Habit, HabitChanges, HabitId, HeatmapQuery, LogRequest, NewHabit,
    NewHabitRequest, Occurrence, ScheduleQuery, ScheduleResponse, TodayResponse,
    UpdateHabitRequest,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Datelike, Local, NaiveDate, Utc};

pub async fn index() -> Html<String> {
    let today = today();
    Html(render_index(today, today.iso_week().year()))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let book = state.book.lock().await;
    Json(book.list().to_vec())
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<Json<Habit>, AppError> {
    let book = state.book.lock().await;
    Ok(Json(book.get(id)?.clone()))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let new = NewHabit::try_from(payload)?;
    let habit = state.commit(|book| book.add(new).cloned()).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let changes = HabitChanges::try_from(payload)?;
    let habit = state
        .commit(|book| book.update(id, changes).cloned())
        .await?;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<StatusCode, AppError> {
    state.commit(|book| book.remove(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let book = state.book.lock().await;
    let (dates, truncated) = book.schedule(id, query.year)?;
    Ok(Json(ScheduleResponse {
        habit_id: id,
        year: query.year,
        dates,
        truncated,
    }))
}

pub async fn get_completion(
    State(state): State<AppState>,
    Path((id, date)): Path<(HabitId, NaiveDate)>,
) -> Result<Json<CompletionResponse>, AppError> {
    let book = state.book.lock().await;
    let entry = book.completion(id, date)?;
    Ok(Json(CompletionResponse {
        habit_id: id,
        date,
        value: entry.unwrap_or(0),
        logged: entry.is_some(),
    }))
}

pub async fn log_completion(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    let LogRequest { date, value } = payload;
    let value = state
        .commit(|book| {
            book.log(id, date, value)?;
            Ok(book.completion(id, date)?.unwrap_or(0))
        })
        .await?;
    Ok(Json(CompletionResponse {
        habit_id: id,
        date,
        value,
        logged: true,
    }))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let date = today();
    let book = state.book.lock().await;
    Json(TodayResponse {
        date,
        habits: book.due_on(date),
    })
}

pub async fn get_history(State(state): State<AppState>) -> Json<Vec<Occurrence>> {
    let book = state.book.lock().await;
    Json(book.history())
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapGrid>, AppError> {
    let target = match query.habit.as_deref() {
        Some(raw) => raw.parse::<GridTarget>().map_err(|_| {
            AppError::bad_request(format!("habit must be 'all' or a habit id, got '{raw}'"))
        })?,
        None => GridTarget::All,
    };
    let year = query.year.unwrap_or_else(|| today().iso_week().year());
    let book = state.book.lock().await;
    Ok(Json(book.heatmap(target, year)?))
}

pub async fn calendar_ics(State(state): State<AppState>) -> impl IntoResponse {
    let (from, to) = export_window(today());
    let book = state.book.lock().await;
    let body = render_calendar(&book.occurrences(from, to), Utc::now());
    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"habit_calendar.ics\"",
            ),
        ],
        body,
    )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
