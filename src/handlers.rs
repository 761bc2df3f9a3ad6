use crate::dates::{self, display_date, parse_date, today, today_key};
use crate::errors::AppError;
use crate::habits::{HabitDefinition, daily_quote, find_habit};
use crate::models::{
    CatalogResponse, DailyPoint, DaySnapshot, Identity, MonthCalendar, MonthQuery,
    MonthlyStatsResponse, StatusRequest, SyncResponse, TodayResponse, ToggleRequest, YearHeatmap,
    YearQuery, YearlyStatsResponse,
};
use crate::state::AppState;
use crate::stats::{daily_chart, month_calendar, monthly_stats, year_heatmap, yearly_stats};
use crate::tracker;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Redirect},
};
use chrono::Datelike;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let date = today_key();
    let store = state.store.lock().await;
    let snapshot = tracker::day_snapshot(&store, &date, state.catalog);
    let stats = monthly_stats(store.days(), today().year(), today().month0(), state.catalog);
    Html(render_index(
        &snapshot,
        &display_date(&date).unwrap_or_default(),
        daily_quote(today()),
        state.catalog,
        &stats,
    ))
}

pub async fn get_habits() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        habits: crate::habits::catalog(),
    })
}

pub async fn get_today(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TodayResponse>, AppError> {
    let date = today_key();
    let snapshot = load_reconciled(&state, identity_from_headers(&headers).as_ref(), &date).await;

    Ok(Json(TodayResponse {
        display_date: display_date(&date)?,
        quote: daily_quote(today()).to_string(),
        snapshot,
    }))
}

pub async fn get_day(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<DaySnapshot>, AppError> {
    parse_date(&date)?;
    let snapshot = load_reconciled(&state, identity_from_headers(&headers).as_ref(), &date).await;
    Ok(Json(snapshot))
}

pub async fn toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<DaySnapshot>, AppError> {
    let habit = known_habit(payload.habit_id.trim())?;
    let snapshot = apply_toggle(&state, &headers, habit).await?;
    Ok(Json(snapshot))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(habit_id): Path<String>,
) -> Result<Redirect, AppError> {
    let habit = known_habit(&habit_id)?;
    apply_toggle(&state, &headers, habit).await?;
    Ok(Redirect::to("/"))
}

pub async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<DaySnapshot>, AppError> {
    let habit = known_habit(payload.habit_id.trim())?;
    let date = today_key();
    let snapshot = {
        let mut store = state.store.lock().await;
        tracker::set_status(&mut store, &date, habit.id, payload.completed, state.catalog).await?
    };
    info!("set {} to {} for {date}", habit.id, payload.completed);
    mirror_write(&state, identity_from_headers(&headers).as_ref(), &snapshot);
    Ok(Json(snapshot))
}

pub async fn get_monthly_stats(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyStatsResponse>, AppError> {
    let (year, month) = resolve_month(&query)?;
    let store = state.store.lock().await;
    Ok(Json(MonthlyStatsResponse {
        year,
        month,
        month_name: dates::month_name(month).unwrap_or_default(),
        days_in_month: dates::days_in_month(year, month),
        stats: monthly_stats(store.days(), year, month, state.catalog),
    }))
}

pub async fn get_yearly_stats(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Json<YearlyStatsResponse> {
    let year = query.year.unwrap_or_else(|| today().year());
    let store = state.store.lock().await;
    Json(YearlyStatsResponse {
        year,
        stats: yearly_stats(store.days(), year, state.catalog),
    })
}

pub async fn get_weekly_chart(State(state): State<AppState>) -> Json<Vec<DailyPoint>> {
    let store = state.store.lock().await;
    Json(daily_chart(store.days(), today(), state.catalog))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthCalendar>, AppError> {
    let (year, month) = resolve_month(&query)?;
    let store = state.store.lock().await;
    Ok(Json(month_calendar(store.days(), year, month, state.catalog)))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Json<YearHeatmap> {
    let year = query.year.unwrap_or_else(|| today().year());
    let store = state.store.lock().await;
    Json(year_heatmap(store.days(), year, state.catalog))
}

pub async fn sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SyncResponse>, AppError> {
    let identity = identity_from_headers(&headers)
        .ok_or_else(|| AppError::bad_request("x-user-id header is required"))?;
    let remote = state
        .remote
        .as_ref()
        .ok_or_else(|| AppError::unavailable("remote store is not configured"))?;

    let remote_days = remote.load_all(&identity.id).await;
    let mut store = state.store.lock().await;
    let days_synced = tracker::sync_from_remote(&mut store, remote_days).await;
    Ok(Json(SyncResponse { days_synced }))
}

pub async fn clear_data(State(state): State<AppState>) -> StatusCode {
    let mut store = state.store.lock().await;
    store.clear_all().await;
    info!("cleared all habit data");
    StatusCode::NO_CONTENT
}

/// Identity supplied by the caller's auth layer through `x-user-*` headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    Some(Identity {
        id: header("x-user-id")?,
        display_name: header("x-user-name"),
        email: header("x-user-email"),
    })
}

fn known_habit(habit_id: &str) -> Result<&'static HabitDefinition, AppError> {
    find_habit(habit_id).ok_or_else(|| AppError::bad_request(format!("unknown habit '{habit_id}'")))
}

fn resolve_month(query: &MonthQuery) -> Result<(i32, u32), AppError> {
    let now = today();
    let month = query.month.unwrap_or_else(|| now.month0());
    if month > 11 {
        return Err(AppError::bad_request("month must be between 0 and 11"));
    }
    Ok((query.year.unwrap_or_else(|| now.year()), month))
}

async fn apply_toggle(
    state: &AppState,
    headers: &HeaderMap,
    habit: &HabitDefinition,
) -> Result<DaySnapshot, AppError> {
    let date = today_key();
    let snapshot = {
        let mut store = state.store.lock().await;
        tracker::toggle(&mut store, &date, habit.id, state.catalog).await?
    };
    info!("toggled {} for {date}", habit.name);
    mirror_write(state, identity_from_headers(headers).as_ref(), &snapshot);
    Ok(snapshot)
}

/// The remote read happens before the store lock is taken, so a slow
/// remote never holds up local writes.
async fn load_reconciled(state: &AppState, identity: Option<&Identity>, date: &str) -> DaySnapshot {
    let remote = match (&state.remote, identity) {
        (Some(remote), Some(user)) => remote.get_day(&user.id, date).await,
        _ => None,
    };

    let mut store = state.store.lock().await;
    let record = tracker::apply_remote_day(&mut store, date, remote).await;
    tracker::snapshot(date, &record, state.catalog)
}

fn mirror_write(state: &AppState, identity: Option<&Identity>, snapshot: &DaySnapshot) {
    if let (Some(remote), Some(user)) = (&state.remote, identity) {
        remote.mirror_day(&user.id, &snapshot.date, snapshot.habits.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteMirror, RemoteStore};
    use crate::remote::test_support::LaggingRemote;
    use crate::storage::CompletionStore;
    use crate::storage::test_support::unique_path;
    use axum::http::HeaderValue;
    use std::sync::Arc;
    use std::time::Duration;

    fn user(id: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static(id));
        headers
    }

    fn toggle_request(habit_id: &str) -> Json<ToggleRequest> {
        Json(ToggleRequest {
            habit_id: habit_id.to_string(),
        })
    }

    #[test]
    fn identity_requires_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-email", HeaderValue::from_static("a@example.com"));
        assert_eq!(identity_from_headers(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("alice"));
        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.id, "alice");
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
        assert_eq!(identity.display_name, None);
    }

    #[test]
    fn month_query_is_validated() {
        let query = MonthQuery {
            year: Some(2025),
            month: Some(12),
        };
        assert!(resolve_month(&query).is_err());

        let query = MonthQuery {
            year: Some(2025),
            month: Some(2),
        };
        assert_eq!(resolve_month(&query).unwrap(), (2025, 2));
    }

    #[test]
    fn unknown_habit_is_bad_request() {
        let err = known_habit("juggling").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(known_habit("gym").is_ok());
    }

    #[tokio::test]
    async fn lagging_mirror_never_reverts_local_toggles() {
        let path = unique_path("handlers_lagging");
        let remote = RemoteMirror::new(Arc::new(LaggingRemote::new(Duration::from_millis(200))));
        let state = AppState::new(CompletionStore::new(path.clone()), Some(remote));
        let headers = user("alice");

        toggle(State(state.clone()), headers.clone(), toggle_request("gym"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        toggle(State(state.clone()), headers.clone(), toggle_request("sleep"))
            .await
            .unwrap();

        let Json(today) = get_today(State(state.clone()), headers).await.unwrap();
        assert!(today.snapshot.habits["gym"]);
        assert!(today.snapshot.habits["sleep"]);
        assert_eq!(today.snapshot.completed_count, 2);

        let stored = state.store.lock().await.get_day(&today_key());
        assert_eq!(stored, today.snapshot.habits);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn remote_fills_day_not_yet_tracked() {
        let path = unique_path("handlers_fill");
        let lagging = Arc::new(LaggingRemote::new(Duration::ZERO));
        let record: crate::models::DayRecord =
            [("water".to_string(), true)].into_iter().collect();
        lagging.put_day("bob", "2020-01-15", &record).await.unwrap();
        let remote = RemoteMirror::new(lagging);
        let state = AppState::new(CompletionStore::new(path.clone()), Some(remote));

        let Json(day) = get_day(State(state.clone()), user("bob"), Path("2020-01-15".into()))
            .await
            .unwrap();
        assert!(day.habits["water"]);
        assert_eq!(day.completed_count, 1);

        let Json(day) = get_day(State(state), HeaderMap::new(), Path("2020-01-15".into()))
            .await
            .unwrap();
        assert!(day.habits["water"]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn sync_requires_identity_and_remote() {
        let path = unique_path("handlers_sync");
        let state = AppState::new(CompletionStore::new(path.clone()), None);

        let err = sync(State(state.clone()), HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let err = sync(State(state), user("alice")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn sync_keeps_days_toggled_locally() {
        let path = unique_path("handlers_sync_local");
        let lagging = Arc::new(LaggingRemote::new(Duration::ZERO));
        let stale: crate::models::DayRecord = [("boxing".to_string(), true)].into_iter().collect();
        lagging.put_day("alice", &today_key(), &stale).await.unwrap();
        lagging.put_day("alice", "2020-01-15", &stale).await.unwrap();
        let state = AppState::new(
            CompletionStore::new(path.clone()),
            Some(RemoteMirror::new(lagging)),
        );

        toggle(State(state.clone()), HeaderMap::new(), toggle_request("study"))
            .await
            .unwrap();
        let Json(synced) = sync(State(state.clone()), user("alice")).await.unwrap();
        assert_eq!(synced.days_synced, 1);

        let store = state.store.lock().await;
        assert!(store.get_day(&today_key())["study"]);
        assert!(!store.get_day(&today_key())["boxing"]);
        assert_eq!(store.get_day("2020-01-15"), stale);
        drop(store);
        let _ = std::fs::remove_file(path);
    }
}
