//! Admin console route handlers.
//!
//! One page carries everything: stats, the create dialog, all readings with
//! their owners, and the registered users. Editing opens the same page with
//! the edit dialog on a copy of the reading; cancelling just links back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use eyeopener_core::types::content::{parse_document, to_editable_text};
use eyeopener_core::{ContentInput, ReadingId, ReadingType, UserId, ValidationError, validation};

use crate::db::{ProfileRepository, ReadingRepository, RepositoryError};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{AuthContext, RequireAdmin, SignedIn};
use crate::models::{NewReading, Profile, Reading, ReadingUpdate};
use crate::routes::{MessageQuery, NavView, Notice, ReadingCard};
use crate::state::AppState;

/// Content of a fresh create draft.
const EMPTY_CONTENT: &str = "{}";

// =============================================================================
// Form Types
// =============================================================================

/// Create and edit form data. The edit form has no owner field.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingForm {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub reading_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Per-field validation messages.
#[derive(Debug, Default)]
pub struct FieldErrors {
    pub user_id: Option<String>,
    pub reading_type: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl FieldErrors {
    const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.reading_type.is_none()
            && self.title.is_none()
            && self.content.is_none()
    }
}

/// Take the value or record the message in `slot`.
fn check<T>(result: Result<T, ValidationError>, slot: &mut Option<String>) -> Option<T> {
    result.map_err(|e| *slot = Some(e.to_string())).ok()
}

/// Validate a create form into a new reading.
///
/// Content is parsed here, so malformed JSON never leaves the portal.
fn parse_create(form: &ReadingForm) -> Result<NewReading, FieldErrors> {
    let mut errors = FieldErrors::default();

    let user_id = check(
        form.user_id
            .parse::<UserId>()
            .map_err(|_| ValidationError::MissingOwner),
        &mut errors.user_id,
    );
    let reading_type = check(
        form.reading_type
            .parse::<ReadingType>()
            .map_err(ValidationError::from),
        &mut errors.reading_type,
    );
    let title = check(validation::validate_title(&form.title), &mut errors.title);
    let content = check(
        parse_document(&form.content).map_err(ValidationError::from),
        &mut errors.content,
    );

    match (user_id, reading_type, title, content) {
        (Some(user_id), Some(reading_type), Some(title), Some(content)) => Ok(NewReading {
            user_id,
            reading_type,
            title,
            content: ContentInput::Document(content),
        }),
        _ => Err(errors),
    }
}

/// Validate an edit form into a full update of the mutable fields.
fn parse_update(form: &ReadingForm) -> Result<ReadingUpdate, FieldErrors> {
    let mut errors = FieldErrors::default();

    let reading_type = check(
        form.reading_type
            .parse::<ReadingType>()
            .map_err(ValidationError::from),
        &mut errors.reading_type,
    );
    let title = check(validation::validate_title(&form.title), &mut errors.title);
    let content = check(
        parse_document(&form.content).map_err(ValidationError::from),
        &mut errors.content,
    );

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ReadingUpdate {
        title,
        reading_type,
        content: content.map(ContentInput::Document),
    })
}

// =============================================================================
// View Types
// =============================================================================

/// The create dialog's draft.
#[derive(Debug)]
pub struct CreateDraft {
    pub user_id: String,
    pub reading_type: String,
    pub title: String,
    pub content: String,
    pub errors: FieldErrors,
    /// Render the dialog open (after a failed submit).
    pub open: bool,
}

impl Default for CreateDraft {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            reading_type: String::new(),
            title: String::new(),
            content: EMPTY_CONTENT.to_string(),
            errors: FieldErrors::default(),
            open: false,
        }
    }
}

impl CreateDraft {
    fn reopen(form: ReadingForm, errors: FieldErrors) -> Self {
        Self {
            user_id: form.user_id,
            reading_type: form.reading_type,
            title: form.title,
            content: form.content,
            errors,
            open: true,
        }
    }
}

/// The edit dialog's transient copy of a reading.
#[derive(Debug)]
pub struct EditDraft {
    pub id: String,
    pub title: String,
    pub reading_type: String,
    pub content: String,
    pub errors: FieldErrors,
}

impl EditDraft {
    fn of(reading: &Reading) -> Self {
        Self {
            id: reading.id.to_string(),
            title: reading.title.clone(),
            reading_type: reading.reading_type.as_str().to_string(),
            content: to_editable_text(&reading.content),
            errors: FieldErrors::default(),
        }
    }

    fn reopen(id: ReadingId, form: ReadingForm, errors: FieldErrors) -> Self {
        Self {
            id: id.to_string(),
            title: form.title,
            reading_type: form.reading_type,
            content: form.content,
            errors,
        }
    }
}

/// An entry of the client picker.
#[derive(Debug)]
pub struct ClientOption {
    pub id: String,
    pub label: String,
}

/// A row of the registered users table.
#[derive(Debug)]
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub joined: String,
}

impl From<&Profile> for UserRow {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.full_name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            is_admin: profile.is_admin(),
            joined: profile.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// An entry of the reading type picker.
#[derive(Debug)]
pub struct TypeOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Admin console template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub readings: Vec<ReadingCard>,
    pub users: Vec<UserRow>,
    pub clients: Vec<ClientOption>,
    pub reading_types: Vec<TypeOption>,
    pub create: CreateDraft,
    pub edit: Option<EditDraft>,
}

/// Fetch readings and users concurrently and build the page.
///
/// A failed fetch is logged and the affected list renders empty.
async fn load_page(
    state: &AppState,
    admin: SignedIn,
    mut notice: Option<Notice>,
    create: CreateDraft,
    edit: Option<EditDraft>,
) -> AdminTemplate {
    let principal = admin.principal();
    let reading_repo = ReadingRepository::new(state.supabase(), &principal);
    let profile_repo = ProfileRepository::new(state.supabase(), &principal.access_token);

    let (readings, profiles) = tokio::join!(reading_repo.list_all(), profile_repo.list_all());

    let readings = readings.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to fetch readings");
        notice.get_or_insert_with(|| Notice::error("Failed to load readings"));
        Vec::new()
    });
    let profiles = profiles.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to fetch users");
        Vec::new()
    });

    AdminTemplate {
        nav: NavView::from(&AuthContext(Some(admin))),
        notice,
        readings: readings.iter().map(ReadingCard::for_admin).collect(),
        users: profiles.iter().map(UserRow::from).collect(),
        clients: profiles
            .iter()
            .map(|p| ClientOption {
                id: p.user_id.to_string(),
                label: p.display_name().to_string(),
            })
            .collect(),
        reading_types: ReadingType::ALL
            .iter()
            .map(|t| TypeOption {
                value: t.as_str(),
                label: t.label(),
            })
            .collect(),
        create,
        edit,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin console.
#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    load_page(
        &state,
        admin,
        Notice::from_query(&query),
        CreateDraft::default(),
        None,
    )
    .await
}

/// Handle the create dialog.
#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn create_reading(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ReadingForm>,
) -> Response {
    let new = match parse_create(&form) {
        Ok(new) => new,
        Err(errors) => {
            let page = load_page(&state, admin, None, CreateDraft::reopen(form, errors), None).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    let principal = admin.principal();
    match ReadingRepository::new(state.supabase(), &principal)
        .create(new)
        .await
    {
        Ok(reading) => {
            tracing::info!(reading_id = %reading.id, owner = %reading.user_id, "Reading created");
            let (reading_id, owner) = (reading.id.to_string(), reading.user_id.to_string());
            add_breadcrumb(
                "admin",
                "Reading created",
                Some(&[("reading_id", reading_id.as_str()), ("owner", owner.as_str())]),
            );
            Redirect::to("/admin?success=created").into_response()
        }
        Err(e) => {
            log_mutation_failure("create", &e);
            let notice = Some(Notice::error("Failed to create reading"));
            let draft = CreateDraft::reopen(form, FieldErrors::default());
            load_page(&state, admin, notice, draft, None)
                .await
                .into_response()
        }
    }
}

/// Open the edit dialog on a copy of the reading.
#[instrument(skip_all, fields(admin_id = %admin.user.id, reading_id = %id))]
pub async fn edit_reading(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ReadingId>,
) -> Response {
    let principal = admin.principal();
    match ReadingRepository::new(state.supabase(), &principal)
        .get(id)
        .await
    {
        Ok(Some(reading)) => {
            let draft = EditDraft::of(&reading);
            load_page(&state, admin, None, CreateDraft::default(), Some(draft))
                .await
                .into_response()
        }
        Ok(None) => Redirect::to("/admin?error=missing").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch reading");
            Redirect::to("/admin?error=load_failed").into_response()
        }
    }
}

/// Save the edit dialog.
#[instrument(skip_all, fields(admin_id = %admin.user.id, reading_id = %id))]
pub async fn update_reading(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ReadingId>,
    Form(form): Form<ReadingForm>,
) -> Response {
    let update = match parse_update(&form) {
        Ok(update) => update,
        Err(errors) => {
            let draft = EditDraft::reopen(id, form, errors);
            let page = load_page(&state, admin, None, CreateDraft::default(), Some(draft)).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    let principal = admin.principal();
    match ReadingRepository::new(state.supabase(), &principal)
        .update(id, update)
        .await
    {
        Ok(_) => {
            tracing::info!("Reading updated");
            let reading_id = id.to_string();
            add_breadcrumb("admin", "Reading updated", Some(&[("reading_id", reading_id.as_str())]));
            Redirect::to("/admin?success=updated").into_response()
        }
        Err(e) => {
            log_mutation_failure("update", &e);
            let notice = Some(Notice::error("Failed to update reading"));
            let draft = EditDraft::reopen(id, form, FieldErrors::default());
            load_page(&state, admin, notice, CreateDraft::default(), Some(draft))
                .await
                .into_response()
        }
    }
}

/// Delete a reading.
#[instrument(skip_all, fields(admin_id = %admin.user.id, reading_id = %id))]
pub async fn delete_reading(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ReadingId>,
) -> Redirect {
    let principal = admin.principal();
    match ReadingRepository::new(state.supabase(), &principal)
        .delete(id)
        .await
    {
        Ok(()) => {
            tracing::info!("Reading deleted");
            let reading_id = id.to_string();
            add_breadcrumb("admin", "Reading deleted", Some(&[("reading_id", reading_id.as_str())]));
            Redirect::to("/admin?success=deleted")
        }
        Err(e) => {
            log_mutation_failure("delete", &e);
            Redirect::to("/admin?error=delete_failed")
        }
    }
}

fn log_mutation_failure(action: &str, err: &RepositoryError) {
    match err {
        RepositoryError::NotFound | RepositoryError::Forbidden => {
            tracing::warn!(error = %err, "Reading {action} refused");
        }
        _ => tracing::error!(error = %err, "Reading {action} failed"),
    }
}
