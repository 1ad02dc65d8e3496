use std::sync::Arc;

use ade::{
    Ade, AgenceInput, CategorieInput, CentreInput, CommuneInput, KpiInput, KpiKey, KpiMeasures,
    LoginOutcome, ObjectifInput, ObjectiveFilter, UtilisateurInput,
};
use ade_core::{Capability, RepositoryProvider};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::{TypedHeader, headers::UserAgent};
use chrono::NaiveDate;

use crate::{
    error::{ApiError, Result},
    extractors::RoleHeader,
    types::*,
};

/// Shared state handed to every handler.
pub struct AppState<R: RepositoryProvider> {
    pub ade: Arc<Ade<R>>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            ade: self.ade.clone(),
        }
    }
}

/// Build the `/api` router around an [`Ade`] instance.
pub fn create_router<R>(ade: Arc<Ade<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AppState { ade };

    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/login", post(login_handler))
        .merge(reference_routes())
        .merge(user_routes())
        .merge(objective_routes())
        .merge(kpi_routes());

    Router::new().nest("/api", api).with_state(state)
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .ade
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    ClientAddress(address): ClientAddress,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let username = payload.username.trim();
    if username.is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Nom d'utilisateur et mot de passe requis".to_string(),
        ));
    }

    let user_agent = user_agent.map(|TypedHeader(ua)| ua.to_string());

    match state.ade.login(&address, username, &payload.password).await? {
        LoginOutcome::Success(user) => Ok(Json(LoginResponse {
            message: "Connexion réussie".to_string(),
            user,
        })),
        LoginOutcome::Blocked {
            retry_after_seconds,
        } => {
            tracing::warn!(address = %address, retry_after_seconds, "Login attempt from blocked address");
            Err(ApiError::RateLimited {
                retry_after_sec: retry_after_seconds,
            })
        }
        LoginOutcome::Rejected { remaining_attempts } => {
            tracing::info!(
                address = %address,
                user_agent = user_agent.as_deref().unwrap_or("-"),
                remaining_attempts,
                "Login failed"
            );
            Err(ApiError::InvalidCredentials { remaining_attempts })
        }
    }
}

fn reference_routes<R>() -> Router<AppState<R>>
where
    R: RepositoryProvider + 'static,
{
    Router::new()
        .route("/centres", get(list_centres).post(create_centre))
        .route(
            "/centres/{id}",
            get(get_centre).put(update_centre).delete(delete_centre),
        )
        .route("/agences", get(list_agences).post(create_agence))
        .route("/agences/stats", get(agence_stats))
        .route(
            "/agences/{id}",
            get(get_agence).put(update_agence).delete(delete_agence),
        )
        .route("/agences/{id}/communes", get(agence_communes))
        .route("/communes", get(list_communes).post(create_commune))
        .route(
            "/communes/{id}",
            get(get_commune).put(update_commune).delete(delete_commune),
        )
        .route("/categories", get(list_categories).post(create_categorie))
        .route(
            "/categories/{code}",
            get(get_categorie)
                .put(update_categorie)
                .delete(delete_categorie),
        )
}

async fn list_centres<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.centres().list().await?))
}

async fn get_centre<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.centres().get(id).await?))
}

async fn create_centre<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<CentreInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    let centre = state.ade.centres().create(&input).await?;
    Ok((StatusCode::CREATED, Json(centre)))
}

async fn update_centre<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
    Json(input): Json<CentreInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    Ok(Json(state.ade.centres().update(id, &input).await?))
}

async fn delete_centre<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    state.ade.centres().delete(id).await?;
    Ok(Json(MessageResponse::new("Centre supprimé")))
}

async fn list_agences<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Query(query): Query<AgenceQuery>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.agences().list(query.centre_id).await?))
}

async fn agence_stats<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.centres().agence_counts().await?))
}

async fn get_agence<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.agences().get(id).await?))
}

async fn agence_communes<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    // 404 for an unknown agence rather than an empty list
    state.ade.agences().get(id).await?;
    Ok(Json(state.ade.communes().list(Some(id)).await?))
}

async fn create_agence<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<AgenceInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    let agence = state.ade.agences().create(&input).await?;
    Ok((StatusCode::CREATED, Json(agence)))
}

async fn update_agence<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
    Json(input): Json<AgenceInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    Ok(Json(state.ade.agences().update(id, &input).await?))
}

async fn delete_agence<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    state.ade.agences().delete(id).await?;
    Ok(Json(MessageResponse::new("Agence supprimée")))
}

async fn list_communes<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Query(query): Query<CommuneQuery>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.communes().list(query.agence_id).await?))
}

async fn get_commune<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.communes().get(id).await?))
}

async fn create_commune<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<CommuneInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    let commune = state.ade.communes().create(&input).await?;
    Ok((StatusCode::CREATED, Json(commune)))
}

async fn update_commune<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
    Json(input): Json<CommuneInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    Ok(Json(state.ade.communes().update(id, &input).await?))
}

async fn delete_commune<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    state.ade.communes().delete(id).await?;
    Ok(Json(MessageResponse::new("Commune supprimée")))
}

async fn list_categories<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.categories().list().await?))
}

async fn get_categorie<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(code): Path<String>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.categories().get(&code).await?))
}

async fn create_categorie<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<CategorieInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    let categorie = state.ade.categories().create(&input).await?;
    Ok((StatusCode::CREATED, Json(categorie)))
}

async fn update_categorie<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(code): Path<String>,
    Json(input): Json<CategorieUpdateRequest>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    Ok(Json(
        state.ade.categories().update(&code, &input.libelle).await?,
    ))
}

async fn delete_categorie<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(code): Path<String>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageReferenceData)?;
    state.ade.categories().delete(&code).await?;
    Ok(Json(MessageResponse::new("Catégorie supprimée")))
}

fn user_routes<R>() -> Router<AppState<R>>
where
    R: RepositoryProvider + 'static,
{
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageUsers)?;
    Ok(Json(state.ade.users().list().await?))
}

async fn get_user<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageUsers)?;
    Ok(Json(state.ade.users().get(id).await?))
}

async fn create_user<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<UtilisateurInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageUsers)?;
    let user = state.ade.users().create(&input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
    Json(input): Json<UtilisateurInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageUsers)?;
    Ok(Json(state.ade.users().update(id, &input).await?))
}

async fn delete_user<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageUsers)?;
    state.ade.users().delete(id).await?;
    Ok(Json(MessageResponse::new("Utilisateur supprimé")))
}

fn objective_routes<R>() -> Router<AppState<R>>
where
    R: RepositoryProvider + 'static,
{
    Router::new()
        .route("/objectives", get(list_objectives).post(create_objective))
        .route(
            "/objectives/{id}",
            get(get_objective)
                .put(update_objective)
                .delete(delete_objective),
        )
        .route("/objectives/{id}/progress", get(objective_progress))
}

async fn list_objectives<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Query(filter): Query<ObjectiveFilter>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.objectives().list(&filter).await?))
}

async fn get_objective<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.objectives().get(id).await?))
}

async fn objective_progress<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.objectives().progress(id).await?))
}

async fn create_objective<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<ObjectifInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageObjectives)?;
    let objective = state.ade.objectives().create(&input).await?;
    Ok((StatusCode::CREATED, Json(objective)))
}

async fn update_objective<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
    Json(input): Json<ObjectifInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageObjectives)?;
    Ok(Json(state.ade.objectives().update(id, &input).await?))
}

async fn delete_objective<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ManageObjectives)?;
    state.ade.objectives().delete(id).await?;
    Ok(Json(MessageResponse::new("Objectif supprimé")))
}

fn kpi_routes<R>() -> Router<AppState<R>>
where
    R: RepositoryProvider + 'static,
{
    Router::new()
        .route("/kpis", get(list_kpis).post(create_kpi))
        .route("/kpis/summary", get(kpi_summary))
        .route(
            "/kpis/{date}/{agence_id}/{code_type}",
            get(get_kpi).put(update_kpi).delete(delete_kpi),
        )
}

fn kpi_key((date_kpi, agence_id, code_type): (NaiveDate, i64, String)) -> KpiKey {
    KpiKey {
        date_kpi,
        agence_id,
        code_type,
    }
}

async fn list_kpis<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Query(query): Query<KpiQuery>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.kpis().list(&query.into()).await?))
}

async fn kpi_summary<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Query(query): Query<KpiQuery>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.kpis().summary(&query.into()).await?))
}

async fn get_kpi<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(key): Path<(NaiveDate, i64, String)>,
) -> Result<impl IntoResponse> {
    role.require(Capability::ViewData)?;
    Ok(Json(state.ade.kpis().get(&kpi_key(key)).await?))
}

async fn create_kpi<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Json(input): Json<KpiInput>,
) -> Result<impl IntoResponse> {
    role.require(Capability::RecordKpi)?;
    let record = state.ade.kpis().create(&input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_kpi<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(key): Path<(NaiveDate, i64, String)>,
    Json(measures): Json<KpiMeasures>,
) -> Result<impl IntoResponse> {
    role.require(Capability::RecordKpi)?;
    Ok(Json(
        state.ade.kpis().update(&kpi_key(key), &measures).await?,
    ))
}

async fn delete_kpi<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    role: RoleHeader,
    Path(key): Path<(NaiveDate, i64, String)>,
) -> Result<impl IntoResponse> {
    role.require(Capability::DeleteKpi)?;
    state.ade.kpis().delete(&kpi_key(key)).await?;
    Ok(Json(MessageResponse::new("Enregistrement KPI supprimé")))
}
