use actix_multipart::form::MultipartForm;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::{
        draft::{CoverChange, PageId, ProjectField},
        draft_request::{
            read_upload, CoverUpload, DraftFieldsUpdate, NewTechnology, PageForm, PageSaved,
            TechnologyAdded,
        },
    },
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[post("/drafts")]
pub async fn create_draft(_admin: AdminSession, state: web::Data<AppState>) -> HttpResponse {
    let draft = state.drafts.open_new();
    tracing::debug!(draft_id = %draft.id(), "Opened new draft");
    HttpResponse::Created().json(draft)
}

#[post("/projects/{project_id}/draft")]
#[instrument(skip(_admin, state))]
pub async fn open_project_draft(
    _admin: AdminSession,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let draft = state
        .drafts
        .open_from_project(&state.project_handler.project_repo, &project_id)
        .await?;
    Ok(HttpResponse::Created().json(draft))
}

#[get("/drafts/{draft_id}")]
pub async fn get_draft(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.drafts.get(&draft_id)?))
}

#[patch("/drafts/{draft_id}")]
#[instrument(skip(_admin, state, update))]
pub async fn update_fields(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
    update: web::Json<DraftFieldsUpdate>,
) -> Result<HttpResponse, AppError> {
    let fields = update.into_inner().into_fields();
    let (_, draft) = state.drafts.mutate(&draft_id, |draft| {
        fields.into_iter().for_each(|field| draft.set_field(field));
        Ok(())
    })?;
    Ok(HttpResponse::Ok().json(draft))
}

#[delete("/drafts/{draft_id}")]
pub async fn discard_draft(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.drafts.discard(&draft_id)?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/drafts/{draft_id}/cover")]
#[instrument(skip(_admin, state, form))]
pub async fn set_cover(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
    MultipartForm(form): MultipartForm<CoverUpload>,
) -> Result<HttpResponse, AppError> {
    let upload = read_upload(form.image).await?;
    let (_, draft) = state.drafts.mutate(&draft_id, |draft| {
        draft.set_field(ProjectField::Cover(CoverChange::Upload(upload)));
        Ok(())
    })?;
    Ok(HttpResponse::Ok().json(draft))
}

#[delete("/drafts/{draft_id}/cover")]
pub async fn clear_cover(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (_, draft) = state.drafts.mutate(&draft_id, |draft| {
        draft.set_field(ProjectField::Cover(CoverChange::Clear));
        Ok(())
    })?;
    Ok(HttpResponse::Ok().json(draft))
}

#[post("/drafts/{draft_id}/technologies")]
pub async fn add_technology(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
    body: web::Json<NewTechnology>,
) -> Result<HttpResponse, AppError> {
    let (added, draft) = state
        .drafts
        .mutate(&draft_id, |draft| Ok(draft.add_technology(&body.name)))?;
    Ok(HttpResponse::Ok().json(TechnologyAdded { added, draft }))
}

#[delete("/drafts/{draft_id}/technologies/{index}")]
pub async fn remove_technology(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
) -> Result<HttpResponse, AppError> {
    let (draft_id, index) = path.into_inner();
    let (_, draft) = state
        .drafts
        .mutate(&draft_id, |draft| draft.remove_technology(index))?;
    Ok(HttpResponse::Ok().json(draft))
}

#[post("/drafts/{draft_id}/pages")]
#[instrument(skip(_admin, state, form))]
pub async fn add_page(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
    MultipartForm(form): MultipartForm<PageForm>,
) -> Result<HttpResponse, AppError> {
    let input = form.into_input().await?;
    let (page_id, draft) = state.drafts.mutate(&draft_id, |draft| draft.add_page(input))?;
    Ok(HttpResponse::Created().json(PageSaved::new(page_id, draft)))
}

#[put("/drafts/{draft_id}/pages/{page_id}")]
#[instrument(skip(_admin, state, form))]
pub async fn edit_page(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    MultipartForm(form): MultipartForm<PageForm>,
) -> Result<HttpResponse, AppError> {
    let (draft_id, page_id) = path.into_inner();
    let page_id: PageId = page_id.parse()?;
    let input = form.into_input().await?;

    let (_, draft) = state
        .drafts
        .mutate(&draft_id, |draft| draft.edit_page(page_id, input))?;
    Ok(HttpResponse::Ok().json(PageSaved::new(page_id, draft)))
}

#[delete("/drafts/{draft_id}/pages/{page_id}")]
pub async fn remove_page(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (draft_id, page_id) = path.into_inner();
    let page_id: PageId = page_id.parse()?;

    let (_, draft) = state
        .drafts
        .mutate(&draft_id, |draft| draft.remove_page(page_id))?;
    Ok(HttpResponse::Ok().json(draft))
}

#[post("/drafts/{draft_id}/submit")]
#[instrument(skip(admin, state), fields(admin = %admin.0.email))]
pub async fn submit_draft(
    admin: AdminSession,
    state: web::Data<AppState>,
    draft_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let saved = state.drafts.submit(&draft_id, &state.editor).await?;

    if saved.created {
        Ok(HttpResponse::Created().json(saved))
    } else {
        Ok(HttpResponse::Ok().json(saved))
    }
}
