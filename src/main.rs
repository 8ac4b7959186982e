use std::{error::Error, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, RequestPartsExt as _, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use derive_more::From;
use jsonwebtoken::{
    decode, encode, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::{fs, net, sync::Mutex, task};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use car_workshop::{api, billing, db, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fs::read_to_string("config.toml").await?;
    let config = toml::from_str::<Config>(&config)?;

    let (db_client, db_connection) = db::connect(config.db).await?;

    task::spawn(async move {
        if let Err(e) = db_connection.await {
            panic!("database connection failed: {e}");
        }
    });

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);
    for origin in &config.http.cors.allowed_origins {
        cors = cors.allow_origin(origin.parse::<HeaderValue>()?);
    }

    let app = Router::new()
        .route("/register", post(register))
        .route("/auth", post(auth))
        .route("/worker", get(get_worker))
        .route("/worker/ticket", get(list_worker_tickets))
        .route("/ticket", get(list_tickets).post(add_ticket))
        .route(
            "/ticket/:id",
            get(get_ticket).patch(edit_ticket).delete(delete_ticket),
        )
        .route("/ticket/:id/part", post(add_part))
        .route("/ticket/:id/time-slot", post(add_time_slot))
        .route("/part/:id", put(update_part).delete(delete_part))
        .route("/time-slot/:id", delete(delete_time_slot))
        .layer(cors)
        .with_state(Arc::new(AppState {
            db_client,
            mutation_lock: Mutex::new(()),
            jwt_expiration_time: config.jwt.expiration_time,
            jwt_decoding_key: DecodingKey::from_secret(
                config.jwt.secret.as_bytes(),
            ),
            jwt_encoding_key: EncodingKey::from_secret(
                config.jwt.secret.as_bytes(),
            ),
        }));

    let listener = net::TcpListener::bind(config.http.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Deserialize)]
struct RegisterInput {
    name: String,
    login: String,
    password: String,
}

async fn register(
    State(state): State<SharedAppState>,
    Json(RegisterInput {
        name,
        login,
        password,
    }): Json<RegisterInput>,
) -> Result<Json<api::Worker>, RegisterError> {
    use RegisterError as E;

    if name.is_empty() || login.is_empty() || password.is_empty() {
        return Err(E::MissingRequiredFields);
    }
    if state.db_client.get_worker_by_login(&login).await?.is_some() {
        return Err(E::LoginAlreadyTaken);
    }

    let worker = db::Worker {
        id: db::worker::Id::new(),
        name,
        login,
        password_hash: api::worker::PasswordHash::new(&password),
        hourly_rate: db::worker::DEFAULT_HOURLY_RATE,
    };

    state.db_client.write_worker(&worker).await?;

    Ok(Json(api::Worker {
        id: worker.id,
        name: worker.name,
        hourly_rate: worker.hourly_rate,
    }))
}

#[derive(Debug, From)]
pub enum RegisterError {
    #[from]
    DbError(db::Error),
    LoginAlreadyTaken,
    MissingRequiredFields,
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            Self::LoginAlreadyTaken | Self::MissingRequiredFields => {
                StatusCode::BAD_REQUEST
            }
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Deserialize)]
struct AuthInput {
    login: String,
    password: String,
}

async fn auth(
    State(state): State<SharedAppState>,
    Json(AuthInput { login, password }): Json<AuthInput>,
) -> Result<String, AuthError> {
    use AuthError as E;

    let password_hash = api::worker::PasswordHash::new(&password);

    let worker = state
        .db_client
        .get_worker_by_login(&login)
        .await?
        .filter(|w| w.password_hash == password_hash)
        .ok_or(E::WrongLoginOrPassword)?;

    let expires_at = OffsetDateTime::now_utc() + state.jwt_expiration_time;
    encode(
        &Header::default(),
        &AuthClaims {
            worker_id: worker.id,
            exp: expires_at.unix_timestamp(),
        },
        &state.jwt_encoding_key,
    )
    .map_err(|_| E::InvalidToken)
}

#[derive(Debug, From)]
pub enum AuthError {
    #[from]
    DbError(db::Error),
    InvalidToken,
    WrongLoginOrPassword,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::WrongLoginOrPassword => StatusCode::FORBIDDEN,
        }
        .into_response()
    }
}

async fn get_worker(
    State(state): State<SharedAppState>,
    auth_claims: AuthClaims,
) -> Result<Json<api::worker::Profile>, GetWorkerError> {
    use GetWorkerError as E;

    let my = state
        .db_client
        .get_worker_by_id(auth_claims.worker_id)
        .await?
        .ok_or(E::WorkerNotFound)?;
    let slots = state.db_client.get_time_slots_by_worker(my.id).await?;

    Ok(Json(api::worker::Profile {
        id: my.id,
        name: my.name,
        hourly_rate: my.hourly_rate,
        time_slots: slots
            .into_iter()
            .map(|slot| api::TimeSlot {
                id: slot.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                ticket_id: slot.ticket_id,
                worker_id: slot.worker_id,
            })
            .collect(),
    }))
}

#[derive(Debug, From)]
pub enum GetWorkerError {
    #[from]
    DbError(db::Error),
    WorkerNotFound,
}

impl IntoResponse for GetWorkerError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(_) | Self::WorkerNotFound => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

async fn list_worker_tickets(
    State(state): State<SharedAppState>,
    auth_claims: AuthClaims,
) -> Result<Json<Vec<api::ticket::Summary>>, ListWorkerTicketsError> {
    let tickets = state
        .db_client
        .get_tickets_by_worker(auth_claims.worker_id)
        .await?;

    Ok(Json(
        tickets
            .into_iter()
            .map(|ticket| api::ticket::Summary {
                id: ticket.id,
                brand: ticket.brand,
                model: ticket.model,
                registration_id: ticket.registration_id,
                description: ticket.description,
                status: ticket.status,
                total_price: ticket.total_price,
            })
            .collect(),
    ))
}

#[derive(Debug, From)]
pub enum ListWorkerTicketsError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for ListWorkerTicketsError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Deserialize)]
struct ListTicketsInput {
    offset: usize,
    limit: usize,
}

async fn list_tickets(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Query(ListTicketsInput { offset, limit }): Query<ListTicketsInput>,
) -> Result<Json<api::ticket::List>, ListTicketsError> {
    let page_fut = state.db_client.get_tickets_page(offset, limit);
    let total_count_fut = state.db_client.get_tickets_count();
    let (page, total_count) = tokio::try_join!(page_fut, total_count_fut)?;

    let tickets = page
        .into_iter()
        .map(|ticket| api::ticket::Summary {
            id: ticket.id,
            brand: ticket.brand,
            model: ticket.model,
            registration_id: ticket.registration_id,
            description: ticket.description,
            status: ticket.status,
            total_price: ticket.total_price,
        })
        .collect();

    Ok(Json(api::ticket::List {
        tickets,
        total_count,
    }))
}

#[derive(Debug, From)]
pub enum ListTicketsError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for ListTicketsError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTicketInput {
    brand: String,
    model: String,
    registration_id: String,
    description: String,
}

async fn add_ticket(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Json(AddTicketInput {
        brand,
        model,
        registration_id,
        description,
    }): Json<AddTicketInput>,
) -> Result<Json<api::Ticket>, AddTicketError> {
    use AddTicketError as E;

    if brand.is_empty()
        || model.is_empty()
        || registration_id.is_empty()
        || description.is_empty()
    {
        return Err(E::MissingRequiredFields);
    }

    let ticket = db::Ticket {
        id: db::ticket::Id::new(),
        brand,
        model,
        registration_id,
        description,
        status: db::ticket::Status::Created,
        total_price: 0.0,
        created_at: OffsetDateTime::now_utc(),
    };

    state.db_client.write_ticket(&ticket).await?;

    Ok(Json(api::Ticket {
        id: ticket.id,
        brand: ticket.brand,
        model: ticket.model,
        registration_id: ticket.registration_id,
        description: ticket.description,
        status: ticket.status,
        total_price: ticket.total_price,
        workers: Vec::new(),
        parts: Vec::new(),
        time_slots: Vec::new(),
    }))
}

#[derive(Debug, From)]
pub enum AddTicketError {
    #[from]
    DbError(db::Error),
    MissingRequiredFields,
}

impl IntoResponse for AddTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

async fn get_ticket(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<api::Ticket>, GetTicketError> {
    use GetTicketError as E;

    let ticket = state
        .db_client
        .get_ticket_by_id(id)
        .await?
        .ok_or(E::TicketNotFound)?;

    let parts_fut = state.db_client.get_parts_by_ticket(id);
    let slots_fut = state.db_client.get_time_slots_by_ticket(id);
    let member_ids_fut = state.db_client.get_ticket_workers(id);
    let (parts, slots, member_ids) =
        tokio::try_join!(parts_fut, slots_fut, member_ids_fut)?;

    let workers = state.db_client.get_workers_by_ids(&member_ids).await?;
    let workers = member_ids
        .iter()
        .map(|worker_id| {
            workers
                .get(worker_id)
                .map(|w| api::Worker {
                    id: w.id,
                    name: w.name.clone(),
                    hourly_rate: w.hourly_rate,
                })
                .ok_or(E::WorkerNotFound(*worker_id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(api::Ticket {
        id: ticket.id,
        brand: ticket.brand,
        model: ticket.model,
        registration_id: ticket.registration_id,
        description: ticket.description,
        status: ticket.status,
        total_price: ticket.total_price,
        workers,
        parts: parts
            .into_iter()
            .map(|part| api::Part {
                id: part.id,
                name: part.name,
                price: part.price,
                quantity: part.quantity,
                total_price: part.total_price,
                ticket_id: part.ticket_id,
            })
            .collect(),
        time_slots: slots
            .into_iter()
            .map(|slot| api::TimeSlot {
                id: slot.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                ticket_id: slot.ticket_id,
                worker_id: slot.worker_id,
            })
            .collect(),
    }))
}

#[derive(Debug, From)]
pub enum GetTicketError {
    #[from]
    DbError(db::Error),
    TicketNotFound,
    WorkerNotFound(api::worker::Id),
}

impl IntoResponse for GetTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) | Self::WorkerNotFound(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditTicketInput {
    brand: String,
    model: String,
    registration_id: String,
    description: String,
    status: api::ticket::Status,
}

async fn edit_ticket(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::ticket::Id>,
    Json(EditTicketInput {
        brand,
        model,
        registration_id,
        description,
        status,
    }): Json<EditTicketInput>,
) -> Result<Json<api::Ticket>, EditTicketError> {
    use EditTicketError as E;

    if brand.is_empty()
        || model.is_empty()
        || registration_id.is_empty()
        || description.is_empty()
    {
        return Err(E::MissingRequiredFields);
    }

    let _mutation = state.mutation_lock.lock().await;

    let mut ticket = state
        .db_client
        .get_ticket_by_id(id)
        .await?
        .ok_or(E::TicketNotFound)?;

    ticket.brand = brand;
    ticket.model = model;
    ticket.registration_id = registration_id;
    ticket.description = description;
    ticket.status = status;

    state.db_client.write_ticket(&ticket).await?;
    ticket.total_price =
        billing::recalculate(&state.db_client, ticket.id).await?;

    let parts_fut = state.db_client.get_parts_by_ticket(id);
    let slots_fut = state.db_client.get_time_slots_by_ticket(id);
    let member_ids_fut = state.db_client.get_ticket_workers(id);
    let (parts, slots, member_ids) =
        tokio::try_join!(parts_fut, slots_fut, member_ids_fut)?;

    let workers = state.db_client.get_workers_by_ids(&member_ids).await?;
    let workers = member_ids
        .iter()
        .map(|worker_id| {
            workers
                .get(worker_id)
                .map(|w| api::Worker {
                    id: w.id,
                    name: w.name.clone(),
                    hourly_rate: w.hourly_rate,
                })
                .ok_or(E::WorkerNotFound(*worker_id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(api::Ticket {
        id: ticket.id,
        brand: ticket.brand,
        model: ticket.model,
        registration_id: ticket.registration_id,
        description: ticket.description,
        status: ticket.status,
        total_price: ticket.total_price,
        workers,
        parts: parts
            .into_iter()
            .map(|part| api::Part {
                id: part.id,
                name: part.name,
                price: part.price,
                quantity: part.quantity,
                total_price: part.total_price,
                ticket_id: part.ticket_id,
            })
            .collect(),
        time_slots: slots
            .into_iter()
            .map(|slot| api::TimeSlot {
                id: slot.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                ticket_id: slot.ticket_id,
                worker_id: slot.worker_id,
            })
            .collect(),
    }))
}

#[derive(Debug, From)]
pub enum EditTicketError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    MissingRequiredFields,
    TicketNotFound,
    WorkerNotFound(api::worker::Id),
}

impl IntoResponse for EditTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_)
            | Self::RecalculationFailed(_)
            | Self::WorkerNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

async fn delete_ticket(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::ticket::Id>,
) -> Result<StatusCode, DeleteTicketError> {
    use DeleteTicketError as E;

    let _mutation = state.mutation_lock.lock().await;

    let ticket = state
        .db_client
        .get_ticket_by_id(id)
        .await?
        .ok_or(E::TicketNotFound)?;

    state.db_client.delete_ticket(ticket.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, From)]
pub enum DeleteTicketError {
    #[from]
    DbError(db::Error),
    TicketNotFound,
}

impl IntoResponse for DeleteTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartInput {
    name: String,
    price: f64,
    quantity: f64,
}

async fn add_part(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(ticket_id): Path<api::ticket::Id>,
    Json(PartInput {
        name,
        price,
        quantity,
    }): Json<PartInput>,
) -> Result<Json<api::Part>, AddPartError> {
    use AddPartError as E;

    if name.is_empty() || price <= 0.0 || quantity <= 0.0 {
        return Err(E::MissingRequiredFields);
    }

    let _mutation = state.mutation_lock.lock().await;

    state
        .db_client
        .get_ticket_by_id(ticket_id)
        .await?
        .ok_or(E::TicketNotFound)?;

    let part = db::Part {
        id: db::part::Id::new(),
        name,
        price,
        quantity,
        total_price: price * quantity,
        ticket_id,
    };

    state.db_client.write_part(&part).await?;
    billing::recalculate(&state.db_client, ticket_id).await?;

    Ok(Json(api::Part {
        id: part.id,
        name: part.name,
        price: part.price,
        quantity: part.quantity,
        total_price: part.total_price,
        ticket_id: part.ticket_id,
    }))
}

#[derive(Debug, From)]
pub enum AddPartError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    MissingRequiredFields,
    TicketNotFound,
}

impl IntoResponse for AddPartError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) | Self::RecalculationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

async fn update_part(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::part::Id>,
    Json(PartInput {
        name,
        price,
        quantity,
    }): Json<PartInput>,
) -> Result<Json<api::Part>, UpdatePartError> {
    use UpdatePartError as E;

    if name.is_empty() || price <= 0.0 || quantity <= 0.0 {
        return Err(E::MissingRequiredFields);
    }

    let _mutation = state.mutation_lock.lock().await;

    let mut part = state
        .db_client
        .get_part_by_id(id)
        .await?
        .ok_or(E::PartNotFound)?;

    part.name = name;
    part.price = price;
    part.quantity = quantity;
    part.total_price = price * quantity;

    state.db_client.write_part(&part).await?;
    billing::recalculate(&state.db_client, part.ticket_id).await?;

    Ok(Json(api::Part {
        id: part.id,
        name: part.name,
        price: part.price,
        quantity: part.quantity,
        total_price: part.total_price,
        ticket_id: part.ticket_id,
    }))
}

#[derive(Debug, From)]
pub enum UpdatePartError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    MissingRequiredFields,
    PartNotFound,
}

impl IntoResponse for UpdatePartError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::PartNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) | Self::RecalculationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

async fn delete_part(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::part::Id>,
) -> Result<StatusCode, DeletePartError> {
    use DeletePartError as E;

    let _mutation = state.mutation_lock.lock().await;

    let part = state
        .db_client
        .get_part_by_id(id)
        .await?
        .ok_or(E::PartNotFound)?;

    state.db_client.delete_part(part.id).await?;
    billing::recalculate(&state.db_client, part.ticket_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, From)]
pub enum DeletePartError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    PartNotFound,
}

impl IntoResponse for DeletePartError {
    fn into_response(self) -> Response {
        match self {
            Self::PartNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) | Self::RecalculationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeSlotInput {
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_time: OffsetDateTime,
}

async fn add_time_slot(
    State(state): State<SharedAppState>,
    auth_claims: AuthClaims,
    Path(ticket_id): Path<api::ticket::Id>,
    Json(TimeSlotInput {
        start_time,
        end_time,
    }): Json<TimeSlotInput>,
) -> Result<Json<api::TimeSlot>, AddTimeSlotError> {
    use AddTimeSlotError as E;

    if end_time <= start_time {
        return Err(E::InvalidInterval);
    }

    let _mutation = state.mutation_lock.lock().await;

    state
        .db_client
        .get_ticket_by_id(ticket_id)
        .await?
        .ok_or(E::TicketNotFound)?;
    let my = state
        .db_client
        .get_worker_by_id(auth_claims.worker_id)
        .await?
        .ok_or(E::WorkerNotFound)?;

    let booked = state.db_client.get_time_slots_by_worker(my.id).await?;
    if billing::find_conflict(start_time, end_time, &booked).is_some() {
        return Err(E::OverlapsExistingSlot);
    }

    let slot = db::TimeSlot {
        id: db::time_slot::Id::new(),
        start_time,
        end_time,
        ticket_id,
        worker_id: my.id,
    };

    state.db_client.write_time_slot(&slot).await?;
    state.db_client.sync_ticket_workers(ticket_id).await?;
    billing::recalculate(&state.db_client, ticket_id).await?;

    Ok(Json(api::TimeSlot {
        id: slot.id,
        start_time: slot.start_time,
        end_time: slot.end_time,
        ticket_id: slot.ticket_id,
        worker_id: slot.worker_id,
    }))
}

#[derive(Debug, From)]
pub enum AddTimeSlotError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    InvalidInterval,
    OverlapsExistingSlot,
    TicketNotFound,
    WorkerNotFound,
}

impl IntoResponse for AddTimeSlotError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidInterval => StatusCode::BAD_REQUEST,
            Self::OverlapsExistingSlot => StatusCode::CONFLICT,
            Self::TicketNotFound | Self::WorkerNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::DbError(_) | Self::RecalculationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

async fn delete_time_slot(
    State(state): State<SharedAppState>,
    _: AuthClaims,
    Path(id): Path<api::time_slot::Id>,
) -> Result<StatusCode, DeleteTimeSlotError> {
    use DeleteTimeSlotError as E;

    let _mutation = state.mutation_lock.lock().await;

    let slot = state
        .db_client
        .get_time_slot_by_id(id)
        .await?
        .ok_or(E::TimeSlotNotFound)?;

    state.db_client.delete_time_slot(slot.id).await?;
    state.db_client.sync_ticket_workers(slot.ticket_id).await?;
    billing::recalculate(&state.db_client, slot.ticket_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, From)]
pub enum DeleteTimeSlotError {
    #[from]
    DbError(db::Error),
    #[from]
    RecalculationFailed(billing::Error),
    TimeSlotNotFound,
}

impl IntoResponse for DeleteTimeSlotError {
    fn into_response(self) -> Response {
        match self {
            Self::TimeSlotNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) | Self::RecalculationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

type SharedAppState = Arc<AppState>;

struct AppState {
    db_client: db::Client,

    /// Serializes write-then-recalculate sequences: the total price
    /// update is a read-modify-write over several rows.
    mutation_lock: Mutex<()>,

    jwt_expiration_time: Duration,

    jwt_decoding_key: DecodingKey,

    jwt_encoding_key: EncodingKey,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct AuthClaims {
    worker_id: api::worker::Id,
    exp: i64,
}

#[async_trait]
impl FromRequestParts<SharedAppState> for AuthClaims {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut request::Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;
        let token_data = decode::<Self>(
            bearer.token(),
            &state.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }
}
